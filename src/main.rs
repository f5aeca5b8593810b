use clap::Parser;
use std::process::ExitCode;

use etu::cli::Cli;
use etu::config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    etu::logging::init();
    let cli = Cli::parse();

    if cli.command.needs_config_file() {
        match Config::ensure_exists() {
            Ok(Some(path)) => eprintln!("Created config file at {}", path.display()),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "could not create config file"),
        }
    }

    match cli.command.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
