//! xray-runner entrypoint
//! - CLI parse, logging init
//! - dispatch: run (default) / generate / link / version
//! - fatal startup errors: cause chain on stderr, exit 1

use app::cli::{self, Commands};
use app::logging::{init_logging, LoggingConfig};
use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::Args::parse();

    if let Err(e) = init_logging(&LoggingConfig::from_env()) {
        eprintln!("error: {e:#}");
        return ExitCode::FAILURE;
    }

    let result = match args.into_command() {
        Commands::Run(a) => cli::run::run(a).await,
        Commands::Generate(a) => {
            cli::generate::run(a);
            Ok(())
        }
        Commands::Link(a) => cli::link::run(a),
        Commands::Version => {
            cli::version::run();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "fatal");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
