use std::time::Duration;

use crate::constants::{DEFAULT_BASE_URL, DEFAULT_MESSAGE_PATH, DEFAULT_TIMEOUT};

/// Where the client sends messages and how long it waits.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    pub base_url: String,
    pub message_path: String,
    pub timeout: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            message_path: DEFAULT_MESSAGE_PATH.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ChatConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_message_path(mut self, path: impl Into<String>) -> Self {
        self.message_path = path.into();
        self
    }

    /// Full URL of the message endpoint, joined without doubling or dropping slashes.
    pub fn endpoint_url(&self) -> String {
        let base = self.base_url.trim().trim_end_matches('/');
        let path = self.message_path.trim().trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, path)
        }
    }
}
