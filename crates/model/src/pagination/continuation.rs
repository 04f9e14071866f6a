use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, backend-issued cursor telling the backend where the next page of a
/// feed query resumes.
///
/// A token is never empty: the backend signals end-of-feed with an empty or
/// missing token, and both are represented as `None` on the Rust side. Any
/// other value, whitespace included, is kept verbatim.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    /// Wraps a raw token. Returns `None` for empty input.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            None
        } else {
            Some(ContinuationToken(raw))
        }
    }

    /// Normalises the optional token found on a backend response.
    pub fn from_response(raw: Option<String>) -> Option<Self> {
        raw.and_then(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContinuationToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
