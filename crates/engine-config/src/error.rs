use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, validating or saving explorer settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// One entry per rule the settings break.
    #[error("Settings validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    #[error("An account for endpoint '{0}' already exists")]
    DuplicateAccount(String),

    #[error("No account for endpoint '{0}'")]
    AccountNotFound(String),
}

impl SettingsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SettingsError::Io {
            path: path.into(),
            source,
        }
    }
}
