use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Everything that can go wrong between the panel and the controller.
///
/// Only `InvalidConfig` is fatal, and only at startup; the rest are
/// per-operation failures the panel reports or absorbs and moves on from.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum PanelError {
    InvalidConfig(String),
    InvalidParameter(String),
    FailedToSend(String),
    FailedToReceive(String),
    Timeout(String),
    HttpStatus(u16),
    Serialization(String),
    UnparsableResponse(String),
}

impl Error for PanelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

impl fmt::Display for PanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PanelError::InvalidConfig(ref msg) => write!(f, "Configuration error: {}", msg),
            PanelError::InvalidParameter(ref msg) => write!(f, "Invalid parameter: {}", msg),
            PanelError::FailedToSend(ref msg) => write!(f, "Connection error: {}", msg),
            PanelError::FailedToReceive(ref msg) => write!(f, "Receive error: {}", msg),
            PanelError::Timeout(ref op) => write!(f, "Timed out waiting for {}", op),
            PanelError::HttpStatus(code) => write!(f, "Controller returned HTTP {}", code),
            PanelError::Serialization(ref msg) => write!(f, "Serialization error: {}", msg),
            PanelError::UnparsableResponse(ref msg) => {
                write!(f, "Unparsable controller response: {}", msg)
            }
        }
    }
}
