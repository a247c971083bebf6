use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ytmp::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries titles, logs go to stderr
    let filter = if cli.verbose {
        EnvFilter::new("warn,ytmp=info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting ytmp v{}", env!("CARGO_PKG_VERSION"));

    cli.run().await?;

    Ok(())
}
