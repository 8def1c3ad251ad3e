use std::io;
use std::process::ExitCode;

use clap::Parser;
use crucible_cli::{Cli, Outcome};
use log::{error, warn};

fn main() -> ExitCode {
    // Defaults to RUST_LOG if set, otherwise warnings and errors only.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init();

    let cli = Cli::parse();
    let mut out = io::stdout().lock();
    match crucible_cli::run(&cli, &mut out) {
        Ok(Outcome::Found(_)) => ExitCode::SUCCESS,
        Ok(Outcome::NoPath) => {
            warn!("no path satisfies runs {}", cli.runs());
            ExitCode::from(2)
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
