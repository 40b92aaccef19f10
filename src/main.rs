use clap::Parser;

use rgdesk::cli::Cli;
use rgdesk::core::telemetry::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.config.log_level.as_deref());
    cli.run().await
}
