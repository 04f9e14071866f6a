use crate::{
    commands::{AccountCommand, Commands},
    error::CliError,
    output::ConsoleSink,
    shutdown::ShutdownCoordinator,
};
use clap::Parser;
use connectors::memory::client::MemoryFeedClient;
use engine_config::settings::{ExplorerSettings, account::AccountSettings};
use engine_core::{
    commands::ResourceCommands,
    error::ControllerError,
    pagination::controller::PaginationController,
    render::ResultFormat,
    tree::node::{ExplorerNode, NodeCapabilities},
};
use model::resource::link::ResourceLink;
use serde_json::Value;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;
mod shutdown;

const LOCAL_ENDPOINT: &str = "memory://local";

#[derive(Parser)]
#[command(
    name = "docdb-studio",
    version = "0.1.0",
    about = "Document database explorer"
)]
struct Cli {
    #[arg(long, global = true, help = "Settings file, defaults to ~/.docdb-studio/settings.json")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings_path = match cli.settings {
        Some(path) => path,
        None => default_settings_path()?,
    };
    let settings = ExplorerSettings::load_or_default(&settings_path).await?;

    match cli.command {
        Commands::Query {
            data,
            feed,
            query,
            page_size,
            pages,
            format,
            headers,
        } => {
            let client = load_account(&data).await?;
            let sink = Arc::new(ConsoleSink::new(headers));
            let format = format.map(ResultFormat::from).unwrap_or(settings.result_format);

            let controller = PaginationController::new(client, sink.clone(), feed.parse()?)?
                .with_defaults(settings.feed_options())
                .with_format(format);

            let shutdown = ShutdownCoordinator::new(CancellationToken::new());
            shutdown.register_handlers();

            run_query(&controller, &sink, &query, page_size, pages, &shutdown).await?;
        }
        Commands::Tree { data, depth, menu } => {
            let client = load_account(&data).await?;
            let endpoint = settings
                .accounts
                .first()
                .map(|account| account.endpoint.clone())
                .unwrap_or_else(|| LOCAL_ENDPOINT.to_string());

            let mut root = ExplorerNode::account(endpoint);
            let loaded = root.refresh_depth(client.as_ref(), depth).await?;
            info!(loaded, depth, "Tree loaded");

            match menu {
                Some(link) => {
                    let link: ResourceLink = link.parse()?;
                    let node = root.find(&link).ok_or_else(|| {
                        CliError::Unexpected(format!("No node at '{link}' within {depth} levels"))
                    })?;
                    for item in node.context_menu() {
                        println!("{}", item.label);
                    }
                }
                None => {
                    for line in root.render_lines() {
                        println!("{line}");
                    }
                }
            }
        }
        Commands::Read {
            data,
            link,
            headers,
        } => {
            let client = load_account(&data).await?;
            let commands = ResourceCommands::new(client, Arc::new(ConsoleSink::new(headers)))
                .with_defaults(settings.request_options());
            commands.read(&link.parse()?).await?;
        }
        Commands::Exec {
            data,
            link,
            params,
            headers,
        } => {
            let client = load_account(&data).await?;
            let commands = ResourceCommands::new(client, Arc::new(ConsoleSink::new(headers)))
                .with_defaults(settings.request_options());
            let text = match params {
                Some(path) => tokio::fs::read_to_string(path).await?,
                None => String::new(),
            };
            commands
                .execute_stored_procedure_from_text(&link.parse()?, &text)
                .await?;
        }
        Commands::Import { data, feed, dir } => {
            let client = load_account(&data).await?;
            let commands = ResourceCommands::new(client, Arc::new(ConsoleSink::new(false)))
                .with_defaults(settings.request_options());
            let items = read_json_folder(&dir).await?;
            let report = commands.create_many(&feed.parse()?, items).await?;
            info!(
                succeeded = report.succeeded,
                failed = report.failed,
                "Import finished"
            );
        }
        Commands::Accounts { command } => {
            manage_accounts(settings, &settings_path, command).await?;
        }
    }

    Ok(())
}

async fn run_query(
    controller: &PaginationController,
    sink: &ConsoleSink,
    query: &str,
    page_size: Option<i32>,
    pages: Option<usize>,
    shutdown: &ShutdownCoordinator,
) -> Result<(), CliError> {
    let cancel = shutdown.cancel_token();
    let mut ctx = controller.start_query(query);
    let mut fetched = 0;

    while sink.next_page_enabled() && pages.is_none_or(|max| fetched < max) {
        match controller
            .fetch_next_page_with_cancel(query, &mut ctx, page_size, &cancel)
            .await
        {
            Ok(_) => fetched += 1,
            Err(ControllerError::Cancelled) if shutdown.is_shutdown_requested() => {
                return Err(CliError::ShutdownRequested);
            }
            Err(err) => return Err(err.into()),
        }
    }

    info!(pages = fetched, state = %ctx.state(), "Query finished");
    Ok(())
}

async fn manage_accounts(
    mut settings: ExplorerSettings,
    path: &Path,
    command: AccountCommand,
) -> Result<(), CliError> {
    match command {
        AccountCommand::List => {
            for account in &settings.accounts {
                println!(
                    "{:<40} {:?}/{:?} key={}",
                    account.endpoint,
                    account.connection_mode,
                    account.protocol,
                    account.masked_key()
                );
            }
            return Ok(());
        }
        AccountCommand::Add {
            endpoint,
            master_key,
            mode,
            protocol,
        } => {
            let mut account = AccountSettings::new(endpoint, master_key);
            account.connection_mode = mode.into();
            account.protocol = protocol.into();
            settings.add_account(account)?;
        }
        AccountCommand::Remove { endpoint } => {
            settings.remove_account(&endpoint)?;
        }
    }

    settings.save(path).await?;
    Ok(())
}

async fn load_account(path: &Path) -> Result<Arc<MemoryFeedClient>, CliError> {
    let text = tokio::fs::read_to_string(path).await?;
    Ok(Arc::new(MemoryFeedClient::from_seed_json(&text)?))
}

/// `(file name, body)` for every `.json` file of `dir`, in name order.
async fn read_json_folder(dir: &Path) -> Result<Vec<(String, Value)>, CliError> {
    let mut paths = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut items = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let text = tokio::fs::read_to_string(&path).await?;
        match serde_json::from_str(&text) {
            Ok(body) => items.push((name, body)),
            Err(err) => warn!(file = %name, error = %err, "Skipping file that is not valid JSON"),
        }
    }
    Ok(items)
}

fn default_settings_path() -> Result<PathBuf, CliError> {
    let home = dirs::home_dir()
        .ok_or_else(|| CliError::Unexpected("Could not determine home directory".into()))?;
    Ok(home.join(".docdb-studio").join("settings.json"))
}
