//! `homedash` binary entry point.

mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Map `-v` counts to a default filter, letting `RUST_LOG` win when set.
fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("homedash={default_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let global = cli.global;
    match cli.command {
        Command::Status => {
            let engine = commands::build_engine(&global)?;
            commands::status::handle(&engine, &global).await
        }
        Command::Show(args) => {
            let engine = commands::build_engine(&global)?;
            commands::show::handle(&engine, args, &global).await
        }
        Command::Watch(args) => {
            let engine = commands::build_engine(&global)?;
            commands::watch::handle(&engine, args, &global).await
        }
        Command::Config(command) => commands::config_cmd::handle(command, &global),
    }
}
