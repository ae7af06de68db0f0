use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::PanelError;

/// Value a fresh install ships with. Starting the panel without replacing it
/// is a configuration error, caught before anything touches the network.
pub const PLACEHOLDER_BASE_URL: &str = "YOUR_ROBOT_URL_HERE";

pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// ```rust,ignore
/// let config = DriverConfig::new("http://192.168.4.21:8000");
///
/// if let Err(e) = config.validate() {
///     eprintln!("Configuration error: {}", e);
///     return;
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DriverConfig {
    pub base_url: String,
    pub command_timeout: Duration,
    pub status_timeout: Duration,
}

impl DriverConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            status_timeout: DEFAULT_STATUS_TIMEOUT,
        }
    }

    /// Shorter timeouts for tests and local simulators.
    pub fn with_timeouts(mut self, command: Duration, status: Duration) -> Self {
        self.command_timeout = command;
        self.status_timeout = status;
        self
    }

    pub fn validate(&self) -> Result<(), PanelError> {
        if self.base_url.is_empty() {
            return Err(PanelError::InvalidConfig(
                "backend URL is not set; pass --backend-url or set SCARA_BACKEND_URL".to_string(),
            ));
        }
        if self.base_url == PLACEHOLDER_BASE_URL {
            return Err(PanelError::InvalidConfig(format!(
                "backend URL is still the placeholder {}; pass --backend-url or set SCARA_BACKEND_URL",
                PLACEHOLDER_BASE_URL
            )));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(PanelError::InvalidConfig(format!(
                "backend URL {} must start with http:// or https://",
                self.base_url
            )));
        }
        if self.command_timeout.is_zero() || self.status_timeout.is_zero() {
            return Err(PanelError::InvalidConfig(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn command_url(&self) -> String {
        format!("{}/command", self.base_url)
    }

    pub fn status_url(&self) -> String {
        format!("{}/status", self.base_url)
    }

    /// Camera endpoint without the cache-busting parameter; the driver
    /// appends a fresh `_t` per fetch.
    pub fn video_url(&self) -> String {
        format!("{}/video_feed", self.base_url)
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig::new("http://127.0.0.1:8000")
    }
}
