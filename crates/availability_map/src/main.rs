//! Main entry point for the campsite availability map.
//! Enriches the campground list with today's availability and writes an interactive map.

use std::process::ExitCode;

use clap::Parser;
use validator::Validate;

mod config;
mod pipeline;

use config::AppConfig;

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::parse();

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    if !config.input.exists() {
        eprintln!("Missing file: {}", config.input.display());
        return ExitCode::from(1);
    }

    log::info!("🚀 Building campsite availability map...");

    match pipeline::run(&config).await {
        Ok(placed) => {
            log::info!("🗺️ Placed {} markers", placed);
            println!("Wrote map to {}", config.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
