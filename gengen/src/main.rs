mod cli;
mod generators;
mod reports;

use eyre::Result;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    Cli::parse_or_exit().run()
}

/// Log to stderr so stdout only carries the build report.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("GENGEN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
