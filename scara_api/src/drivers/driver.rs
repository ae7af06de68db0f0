use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use super::{DriverConfig, VideoFrame};
use crate::commands::Command;
use crate::errors::PanelError;
use crate::RobotStatus;

/// HTTP driver for the robot controller.
///
/// The panel issues requests one at a time through this driver; each call
/// blocks only up to its own timeout and is never retried here. Delivery is
/// at most once, the operator re-issues a failed command manually.
#[derive(Debug, Clone)]
pub struct PanelDriver {
    client: reqwest::Client,
    config: DriverConfig,
}

impl PanelDriver {
    /// Validates the configuration and builds the HTTP client.
    pub fn new(config: DriverConfig) -> Result<Self, PanelError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| PanelError::InvalidConfig(format!("could not build HTTP client: {}", e)))?;
        Ok(PanelDriver { client, config })
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// POST one command and return the status the controller echoes back.
    ///
    /// The echoed status is informational; the cached snapshot is only ever
    /// updated from [`PanelDriver::poll_status`].
    pub async fn send_command(&self, command: &Command) -> Result<RobotStatus, PanelError> {
        let url = self.config.command_url();
        let body = serde_json::to_string(command)
            .map_err(|e| PanelError::Serialization(e.to_string()))?;
        debug!(command = command.name(), url = %url, "sending command");

        let response = self
            .client
            .post(&url)
            .timeout(self.config.command_timeout)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| transport_error(e, command.name()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                command = command.name(),
                status = status.as_u16(),
                "controller rejected command"
            );
            return Err(PanelError::HttpStatus(status.as_u16()));
        }
        parse_status_body(response, command.name()).await
    }

    /// GET the current status snapshot. Idempotent and side-effect-free on
    /// the controller, so a failure is safe to ignore and try again on the
    /// next cycle.
    pub async fn poll_status(&self) -> Result<RobotStatus, PanelError> {
        let response = self
            .client
            .get(self.config.status_url())
            .timeout(self.config.status_timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, "status poll"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PanelError::HttpStatus(status.as_u16()));
        }
        parse_status_body(response, "status poll").await
    }

    /// Fetch one camera frame through a fresh cache-busted URL.
    pub async fn fetch_frame(&self) -> Result<VideoFrame, PanelError> {
        let url = self.frame_url();
        let response = self
            .client
            .get(&url)
            .timeout(self.config.status_timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, "video frame"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PanelError::HttpStatus(status.as_u16()));
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = response
            .bytes()
            .await
            .map_err(|e| PanelError::FailedToReceive(format!("video frame: {}", e)))?;
        Ok(VideoFrame {
            content_type,
            data: data.to_vec(),
        })
    }

    /// The `/video_feed` URL with a fresh `_t` query parameter so nothing
    /// between panel and camera serves a stale frame.
    pub fn frame_url(&self) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        format!("{}?_t={}", self.config.video_url(), millis)
    }
}

async fn parse_status_body(response: reqwest::Response, op: &str) -> Result<RobotStatus, PanelError> {
    let text = response
        .text()
        .await
        .map_err(|e| PanelError::FailedToReceive(format!("{}: {}", op, e)))?;
    serde_json::from_str::<RobotStatus>(&text)
        .map_err(|e| PanelError::UnparsableResponse(format!("{}: {}", op, e)))
}

fn transport_error(err: reqwest::Error, op: &str) -> PanelError {
    if err.is_timeout() {
        PanelError::Timeout(op.to_string())
    } else {
        PanelError::FailedToSend(format!("{}: {}", op, err))
    }
}
