use crate::{error::SettingsError, settings::ExplorerSettings};
use std::collections::HashSet;
use tracing::{info, warn};

/// Checks explorer settings before they are used or saved.
pub struct SettingsValidator<'a> {
    settings: &'a ExplorerSettings,
}

impl<'a> SettingsValidator<'a> {
    pub fn new(settings: &'a ExplorerSettings) -> Self {
        Self { settings }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let mut errors: Vec<String> = Vec::new();

        self.validate_accounts(&mut errors);
        self.validate_feed(&mut errors);

        if !errors.is_empty() {
            return Err(SettingsError::ValidationFailed(errors));
        }

        info!(
            accounts = self.settings.accounts.len(),
            "Settings validation completed successfully"
        );
        Ok(())
    }

    fn validate_accounts(&self, errors: &mut Vec<String>) {
        let mut seen = HashSet::new();
        for account in &self.settings.accounts {
            errors.extend(account.problems());
            if !seen.insert(account.endpoint.trim().to_ascii_lowercase()) {
                errors.push(format!("duplicate account endpoint '{}'", account.endpoint));
            }
        }
    }

    fn validate_feed(&self, errors: &mut Vec<String>) {
        let max_item_count = self.settings.feed.max_item_count;
        if max_item_count == 0 || max_item_count < -1 {
            errors.push(format!(
                "max_item_count must be -1 or positive, got {max_item_count}"
            ));
        } else if max_item_count > 1000 {
            warn!(max_item_count, "Very large page size, responses may be throttled");
        }
    }
}
