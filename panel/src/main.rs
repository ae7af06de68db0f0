mod app;
mod cli;
mod tui;
mod ui;

use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scara_api::{DriverConfig, PanelDriver};

use crate::app::App;
use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Configuration problems are fatal and reported on stderr before the
    // alternate screen takes over.
    let driver = match PanelDriver::new(DriverConfig::new(&cli.backend_url)) {
        Ok(driver) => driver,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };
    if !cli.poll_interval.is_finite() || cli.poll_interval <= 0.0 {
        eprintln!("poll interval must be a positive number of seconds");
        std::process::exit(1);
    }
    let poll_period = Duration::from_secs_f64(cli.poll_interval);

    // Logs go to a rolling file; stdout belongs to the UI.
    if let Err(err) = std::fs::create_dir_all(&cli.log_dir) {
        eprintln!(
            "could not create log directory {}: {}",
            cli.log_dir.display(),
            err
        );
        std::process::exit(1);
    }
    let file_appender = tracing_appender::rolling::daily(&cli.log_dir, "panel.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(EnvFilter::new(&cli.log_level))
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .init();
    info!(
        backend = %driver.config().base_url,
        poll_interval = cli.poll_interval,
        "panel starting"
    );

    let mut terminal = match tui::init() {
        Ok(terminal) => terminal,
        Err(err) => {
            eprintln!("could not initialize terminal: {}", err);
            std::process::exit(1);
        }
    };

    let result = App::new().run(&mut terminal, &driver, poll_period).await;

    if let Err(err) = tui::restore() {
        eprintln!("could not restore terminal: {}", err);
    }
    if let Err(err) = result {
        eprintln!("panel exited with error: {}", err);
        std::process::exit(1);
    }
    info!("panel stopped");
}
