use crate::{
    error::SettingsError,
    settings::{
        account::AccountSettings,
        defaults::{FeedSettings, RequestSettings},
        validator::SettingsValidator,
    },
};
use engine_core::render::ResultFormat;
use model::options::{feed::FeedOptions, request::RequestOptions};
use serde::{Deserialize, Serialize};
use std::{io::ErrorKind, path::Path, str::FromStr};
use tracing::{debug, info};

pub mod account;
pub mod defaults;
pub mod validator;

/// Everything the explorer persists between runs.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ExplorerSettings {
    pub accounts: Vec<AccountSettings>,
    pub feed: FeedSettings,
    pub request: RequestSettings,
    pub result_format: ResultFormat,
}

impl ExplorerSettings {
    /// Reads and validates the settings file at `path`.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SettingsError::io(path, e))?;
        let settings: ExplorerSettings = text.parse()?;
        debug!(path = %path.display(), accounts = settings.accounts.len(), "Loaded settings");
        Ok(settings)
    }

    /// Like [`load`](Self::load), falling back to defaults when the file does
    /// not exist yet.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        match tokio::fs::try_exists(path).await {
            Ok(true) => Self::load(path).await,
            Ok(false) => {
                info!(path = %path.display(), "No settings file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(SettingsError::io(path, e)),
        }
    }

    /// Validates, then writes the settings to `path`, creating parent
    /// directories as needed.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        self.validate()?;

        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SettingsError::io(parent, e))?;
        }

        let text = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, text)
            .await
            .map_err(|e| SettingsError::io(path, e))?;
        info!(path = %path.display(), "Settings saved");
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        SettingsValidator::new(self).validate()
    }

    pub fn account(&self, endpoint: &str) -> Option<&AccountSettings> {
        self.position(endpoint).map(|i| &self.accounts[i])
    }

    pub fn add_account(&mut self, account: AccountSettings) -> Result<(), SettingsError> {
        if self.position(&account.endpoint).is_some() {
            return Err(SettingsError::DuplicateAccount(account.endpoint));
        }
        reject_problems(&account)?;
        self.accounts.push(account);
        Ok(())
    }

    /// Swaps the account registered for `endpoint`, returning the old one.
    pub fn replace_account(
        &mut self,
        endpoint: &str,
        account: AccountSettings,
    ) -> Result<AccountSettings, SettingsError> {
        let index = self
            .position(endpoint)
            .ok_or_else(|| SettingsError::AccountNotFound(endpoint.to_string()))?;
        if let Some(other) = self.position(&account.endpoint)
            && other != index
        {
            return Err(SettingsError::DuplicateAccount(account.endpoint));
        }
        reject_problems(&account)?;
        Ok(std::mem::replace(&mut self.accounts[index], account))
    }

    pub fn remove_account(&mut self, endpoint: &str) -> Result<AccountSettings, SettingsError> {
        let index = self
            .position(endpoint)
            .ok_or_else(|| SettingsError::AccountNotFound(endpoint.to_string()))?;
        Ok(self.accounts.remove(index))
    }

    pub fn feed_options(&self) -> FeedOptions {
        self.feed.feed_options()
    }

    pub fn request_options(&self) -> RequestOptions {
        self.request.request_options()
    }

    fn position(&self, endpoint: &str) -> Option<usize> {
        let wanted = endpoint.trim();
        self.accounts
            .iter()
            .position(|a| a.endpoint.trim().eq_ignore_ascii_case(wanted))
    }
}

impl FromStr for ExplorerSettings {
    type Err = SettingsError;

    /// Parses and validates a settings document.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let settings: ExplorerSettings = serde_json::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }
}

fn reject_problems(account: &AccountSettings) -> Result<(), SettingsError> {
    let problems = account.problems();
    if problems.is_empty() {
        Ok(())
    } else {
        Err(SettingsError::ValidationFailed(problems))
    }
}

/// Whether `err` means the settings file does not exist.
pub fn is_not_found(err: &SettingsError) -> bool {
    matches!(err, SettingsError::Io { source, .. } if source.kind() == ErrorKind::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::account::ConnectionMode;

    fn account(endpoint: &str) -> AccountSettings {
        AccountSettings::new(endpoint, "secret-key")
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = ExplorerSettings::default();
        settings.add_account(account("https://localhost:8081")).unwrap();
        settings.result_format = ResultFormat::Legacy;
        settings.request.post_triggers = "audit".into();
        settings.save(&path).await.unwrap();

        let loaded = ExplorerSettings::load(&path).await.unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.request_options().post_trigger_include, vec!["audit"]);
    }

    #[tokio::test]
    async fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let settings = ExplorerSettings::load_or_default(&path).await.unwrap();
        assert!(settings.accounts.is_empty());
        assert_eq!(settings.result_format, ResultFormat::Standard);

        let err = ExplorerSettings::load(&path).await.unwrap_err();
        assert!(is_not_found(&err));
    }

    #[test]
    fn parsing_validates() {
        let err = r#"{"feed": {"max_item_count": -5}}"#
            .parse::<ExplorerSettings>()
            .unwrap_err();
        assert!(matches!(err, SettingsError::ValidationFailed(_)));

        let err = "{ nope".parse::<ExplorerSettings>().unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));

        let settings: ExplorerSettings = r#"{"result_format": "legacy"}"#.parse().unwrap();
        assert_eq!(settings.result_format, ResultFormat::Legacy);
    }

    #[test]
    fn account_management() {
        let mut settings = ExplorerSettings::default();
        settings.add_account(account("https://a")).unwrap();
        settings.add_account(account("https://b")).unwrap();

        assert!(matches!(
            settings.add_account(account("HTTPS://A")),
            Err(SettingsError::DuplicateAccount(_))
        ));
        assert!(matches!(
            settings.replace_account("https://a", account("https://b")),
            Err(SettingsError::DuplicateAccount(_))
        ));

        let mut direct = account("https://a");
        direct.connection_mode = ConnectionMode::Direct;
        let old = settings.replace_account("https://a", direct).unwrap();
        assert_eq!(old.connection_mode, ConnectionMode::Gateway);
        assert_eq!(
            settings.account("https://a").unwrap().connection_mode,
            ConnectionMode::Direct
        );

        settings.remove_account("https://b").unwrap();
        assert!(matches!(
            settings.remove_account("https://b"),
            Err(SettingsError::AccountNotFound(_))
        ));
        assert_eq!(settings.accounts.len(), 1);
    }
}
