// HTTP stand-in for the robot controller.
// Run with: cargo run -p sim
// Point the panel at it: panel --backend-url http://127.0.0.1:8000

use std::error::Error;

use clap::Parser;
use tracing::info;

/// Development stand-in for the SCARA robot controller.
#[derive(Parser, Debug)]
#[command(name = "sim")]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "SIM_BIND_ADDR", default_value = "127.0.0.1:8000")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let app = sim::router(sim::shared());
    let listener = tokio::net::TcpListener::bind(&cli.bind).await?;
    info!("controller sim listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
