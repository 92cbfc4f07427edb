#![deny(warnings)]

use genie_app::cli;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();

    let result = match cli::run_cli() {
        Ok(cli::CliOutcome::Handled) => Ok(()),
        Ok(cli::CliOutcome::NotHandled) => cli::play_interactive(),
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("genie: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr, and only when `GENIE_LOG` holds a filter such as `debug`.
fn init_tracing() {
    let Ok(directives) = std::env::var("GENIE_LOG") else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directives))
        .with_writer(std::io::stderr)
        .try_init();
}
