//! keyrelay - credential-rotating completion gateway

use clap::Parser;
use keyrelay::server;
use keyrelay::utils::logging::{self, LogFormat};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "gateway", version, about = "Credential-rotating completion gateway")]
struct Cli {
    /// Path to the gateway configuration file
    #[arg(
        short,
        long,
        env = "KEYRELAY_CONFIG",
        default_value = server::builder::DEFAULT_CONFIG_PATH
    )]
    config: PathBuf,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, env = "KEYRELAY_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logging::init(&cli.log_level, LogFormat::from_env());

    match server::run_server(&cli.config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Display keeps multi-line config errors readable
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
