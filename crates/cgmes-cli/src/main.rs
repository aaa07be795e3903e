use std::io;
use std::process::ExitCode;

use cgmes_cli::cli::{Cli, Commands};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::FmtSubscriber;

mod commands;

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Scan { path, format } => commands::scan::handle(path, *format),
        Commands::Archive {
            path,
            strict,
            format,
        } => commands::archive::handle(path, *strict, *format),
        Commands::Metadata { path, format } => commands::metadata::handle(path, *format),
        Commands::Completions { shell, out } => {
            commands::completions::handle(*shell, out.as_deref())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: logging unavailable: {err}");
    }
    debug!(command = ?cli.command, "starting");

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
