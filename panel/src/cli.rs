//! CLI argument parsing.
//!
//! Every flag has an environment fallback so the panel works both as
//! `panel --backend-url ...` and from a service file exporting
//! `SCARA_BACKEND_URL`.

use std::path::PathBuf;

use clap::Parser;
use scara_api::PLACEHOLDER_BASE_URL;

/// Terminal control panel for a SCARA robot arm.
#[derive(Parser, Debug)]
#[command(name = "panel")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the robot controller, e.g. http://192.168.4.21:8000
    #[arg(long, env = "SCARA_BACKEND_URL", default_value = PLACEHOLDER_BASE_URL)]
    pub backend_url: String,

    /// Seconds between status polls (each cycle also refreshes the camera frame)
    #[arg(long, env = "SCARA_POLL_INTERVAL", default_value_t = 1.0)]
    pub poll_interval: f64,

    /// Directory for panel log files (stdout belongs to the UI)
    #[arg(long, env = "SCARA_LOG_DIR", default_value = "logs")]
    pub log_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}
