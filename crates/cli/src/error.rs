use connectors::error::FeedError;
use engine_config::error::SettingsError;
use engine_core::error::ControllerError;
use model::resource::link::LinkError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Failed to load the account data: {0}")]
    Data(#[from] FeedError),

    #[error("{0}")]
    Controller(#[from] ControllerError),

    #[error("Invalid resource link: {0}")]
    Link(#[from] LinkError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),

    #[error("Shutdown requested")]
    ShutdownRequested,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_failures_surface_through_the_engine() {
        let json = serde_json::from_str::<serde_json::Value>("{ broken").unwrap_err();
        let err = CliError::from(ControllerError::from(json));
        assert!(matches!(err, CliError::Controller(ControllerError::Json(_))));
        assert!(err.to_string().starts_with("Invalid JSON: "));
    }
}
