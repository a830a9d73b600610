use anyhow::Result;
use clap::Parser;
use tracing::info;

use classdot::cli::{log_filter, Cli};
use classdot::core::Engine;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_directives = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(env_directives.as_deref(), cli.verbose))
        .init();

    if cli.source_root.is_none() {
        eprintln!("Please provide the path to the source tree as an input argument.");
        std::process::exit(1);
    }

    info!("Starting classdot v{}", env!("CARGO_PKG_VERSION"));

    let engine = Engine::new(cli.config.as_deref())?;

    cli.execute(engine).await
}
