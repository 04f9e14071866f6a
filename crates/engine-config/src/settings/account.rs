use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionMode {
    #[default]
    Gateway,
    Direct,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Protocol {
    #[default]
    Https,
    Tcp,
}

/// Connection settings of one database account.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AccountSettings {
    pub endpoint: String,
    pub master_key: String,
    #[serde(default)]
    pub connection_mode: ConnectionMode,
    #[serde(default)]
    pub protocol: Protocol,
    #[serde(default = "name_based_default")]
    pub is_name_based: bool,
}

fn name_based_default() -> bool {
    true
}

impl AccountSettings {
    pub fn new(endpoint: impl Into<String>, master_key: impl Into<String>) -> Self {
        AccountSettings {
            endpoint: endpoint.into(),
            master_key: master_key.into(),
            connection_mode: ConnectionMode::default(),
            protocol: Protocol::default(),
            is_name_based: name_based_default(),
        }
    }

    /// Master key with everything but the last four characters hidden.
    pub fn masked_key(&self) -> String {
        let chars: Vec<char> = self.master_key.chars().collect();
        let visible = chars.len().saturating_sub(4);
        chars
            .iter()
            .enumerate()
            .map(|(i, c)| if i < visible { '*' } else { *c })
            .collect()
    }

    /// Rules this account breaks, empty when it is usable.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.endpoint.trim().is_empty() {
            problems.push("account endpoint must not be empty".to_string());
        }
        if self.master_key.trim().is_empty() {
            problems.push(format!(
                "account '{}' has an empty master key",
                self.endpoint
            ));
        }
        if self.connection_mode == ConnectionMode::Gateway && self.protocol != Protocol::Https {
            problems.push(format!(
                "account '{}' uses Gateway mode, which only supports Https",
                self.endpoint
            ));
        }
        problems
    }
}

// Keeps the master key out of logs.
impl fmt::Debug for AccountSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountSettings")
            .field("endpoint", &self.endpoint)
            .field("master_key", &self.masked_key())
            .field("connection_mode", &self.connection_mode)
            .field("protocol", &self.protocol)
            .field("is_name_based", &self.is_name_based)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_all_but_last_four() {
        let account = AccountSettings::new("https://localhost:8081", "C2y6yDjf5R+ob0N8A7Cgv30VRDJI");
        assert_eq!(account.masked_key(), format!("{}RDJI", "*".repeat(24)));
        assert!(!format!("{account:?}").contains("C2y6"));

        let short = AccountSettings::new("e", "abc");
        assert_eq!(short.masked_key(), "abc");
    }

    #[test]
    fn gateway_requires_https() {
        let mut account = AccountSettings::new("https://localhost:8081", "key");
        assert!(account.problems().is_empty());

        account.protocol = Protocol::Tcp;
        assert_eq!(account.problems().len(), 1);

        account.connection_mode = ConnectionMode::Direct;
        assert!(account.problems().is_empty());
    }

    #[test]
    fn defaults_when_fields_are_missing() {
        let account: AccountSettings =
            serde_json::from_str(r#"{"endpoint": "https://a", "master_key": "k"}"#).unwrap();
        assert_eq!(account.connection_mode, ConnectionMode::Gateway);
        assert_eq!(account.protocol, Protocol::Https);
        assert!(account.is_name_based);
    }
}
