use serde::{Deserialize, Serialize};
use std::fmt;

/// Freeform display name.
///
/// Used both as the uploader tag and as the favorites lookup key. It is not
/// authenticated: anyone can claim any name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn blank() -> Self {
        Self::default()
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// The name as sent to the endpoint
    pub fn as_str(&self) -> &str {
        self.0.trim()
    }

    /// The name exactly as the user typed it
    pub fn raw(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
