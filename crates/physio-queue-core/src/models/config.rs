//! Board configuration.

use serde::{Deserialize, Serialize};

/// Backend selection for a board session.
///
/// Remote mode is selected only when the flag is set and both the endpoint
/// and the credential are present; anything else runs against the local
/// store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BoardConfig {
    /// Prefer the remote realtime backend
    pub use_remote: bool,
    /// Remote endpoint URL
    pub remote_url: Option<String>,
    /// Remote credential
    pub remote_key: Option<String>,
}

impl BoardConfig {
    /// Local-only configuration.
    pub fn local() -> Self {
        Self::default()
    }

    /// Remote configuration with endpoint and credential.
    pub fn remote(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            use_remote: true,
            remote_url: Some(url.into()),
            remote_key: Some(key.into()),
        }
    }

    /// Endpoint and credential, when remote mode is fully configured.
    pub fn remote_endpoint(&self) -> Option<(&str, &str)> {
        if !self.use_remote {
            return None;
        }
        match (self.remote_url.as_deref(), self.remote_key.as_deref()) {
            (Some(url), Some(key)) => Some((url, key)),
            _ => None,
        }
    }
}
