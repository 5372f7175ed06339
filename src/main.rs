use std::process::ExitCode;

use clap::Parser;
use dpm_taxgen::cli::{run, Cli};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    std::panic::set_hook(Box::new(|panic_info| {
        tracing::error!(%panic_info, "Internal error");
    }));

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(stop) => {
            tracing::error!("Run failed: {stop}");
            ExitCode::FAILURE
        }
    }
}
