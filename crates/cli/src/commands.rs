use clap::{Subcommand, ValueEnum};
use engine_config::settings::account::{ConnectionMode, Protocol};
use engine_core::{render::ResultFormat, tree::menu::DEFAULT_QUERY};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a query against a feed, page by page
    Query {
        #[arg(long, help = "Account data file (JSON seed)")]
        data: PathBuf,

        #[arg(long, help = "Feed link, e.g. dbs/db1/colls/c1/docs")]
        feed: String,

        #[arg(long, default_value = DEFAULT_QUERY)]
        query: String,

        #[arg(long, help = "Items per page, overrides the configured max item count")]
        page_size: Option<i32>,

        #[arg(long, help = "Stop after this many pages instead of draining the feed")]
        pages: Option<usize>,

        #[arg(long, value_enum, help = "Result format, overrides the settings file")]
        format: Option<FormatArg>,

        #[arg(long, help = "Print response headers after each page")]
        headers: bool,
    },

    /// Print the resource tree of an account
    Tree {
        #[arg(long, help = "Account data file (JSON seed)")]
        data: PathBuf,

        #[arg(long, default_value_t = 3, help = "How many levels to load")]
        depth: usize,

        #[arg(long, help = "Print the context menu of the node at this link")]
        menu: Option<String>,
    },

    /// Read a single resource
    Read {
        #[arg(long, help = "Account data file (JSON seed)")]
        data: PathBuf,

        #[arg(long, help = "Resource link, e.g. dbs/db1/colls/c1/docs/a")]
        link: String,

        #[arg(long, help = "Print response headers")]
        headers: bool,
    },

    /// Execute a stored procedure
    Exec {
        #[arg(long, help = "Account data file (JSON seed)")]
        data: PathBuf,

        #[arg(long, help = "Stored procedure link, e.g. dbs/db1/colls/c1/sprocs/sp1")]
        link: String,

        #[arg(long, help = "File with one JSON parameter per line")]
        params: Option<PathBuf>,

        #[arg(long, help = "Print response headers")]
        headers: bool,
    },

    /// Create one document per JSON file of a folder
    Import {
        #[arg(long, help = "Account data file (JSON seed)")]
        data: PathBuf,

        #[arg(long, help = "Target feed link, e.g. dbs/db1/colls/c1/docs")]
        feed: String,

        #[arg(long, help = "Folder holding the JSON files")]
        dir: PathBuf,
    },

    /// Manage the saved account settings
    Accounts {
        #[command(subcommand)]
        command: AccountCommand,
    },
}

#[derive(Subcommand)]
pub enum AccountCommand {
    List,
    Add {
        #[arg(long)]
        endpoint: String,

        #[arg(long)]
        master_key: String,

        #[arg(long, value_enum, default_value_t = ModeArg::Gateway)]
        mode: ModeArg,

        #[arg(long, value_enum, default_value_t = ProtocolArg::Https)]
        protocol: ProtocolArg,
    },
    Remove {
        #[arg(long)]
        endpoint: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Standard,
    Legacy,
}

impl From<FormatArg> for ResultFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Standard => ResultFormat::Standard,
            FormatArg::Legacy => ResultFormat::Legacy,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Gateway,
    Direct,
}

impl From<ModeArg> for ConnectionMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Gateway => ConnectionMode::Gateway,
            ModeArg::Direct => ConnectionMode::Direct,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ProtocolArg {
    Https,
    Tcp,
}

impl From<ProtocolArg> for Protocol {
    fn from(arg: ProtocolArg) -> Self {
        match arg {
            ProtocolArg::Https => Protocol::Https,
            ProtocolArg::Tcp => Protocol::Tcp,
        }
    }
}
