// EduGuide
// Main entry point for the eduguide binary

use clap::Parser;
use eduguide_engine::cli::{Cli, Command};
use eduguide_engine::config::Config;
use eduguide_engine::handlers::{
    handle_bot, handle_browse, handle_build_pages, handle_doctor, handle_estimate,
    handle_recommend, handle_results, handle_serve, EstimateArgs, OutputFormat,
};
use eduguide_engine::telemetry::{init_telemetry, init_telemetry_with_level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration (or use custom path if provided)
    let loaded = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)
    } else {
        Config::load_or_create()
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            init_telemetry();
            tracing::error!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    // --log wins over the configured level; RUST_LOG wins over both
    init_telemetry_with_level(cli.log.as_deref().unwrap_or(&config.core.log_level));

    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    let timestamp = env!("BUILD_TIMESTAMP");

    tracing::info!("EduGuide v{} ({} - {})", version, commit, timestamp);

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Handle commands
    match cli.command {
        Command::BuildPages => {
            tracing::info!("Building pages...");
            handle_build_pages(&config, format).await
        }

        Command::Browse {
            search,
            location,
            details,
        } => handle_browse(&search, &location, details, &config, format).await,

        Command::Estimate {
            institution,
            scholarship,
            living,
            years,
            category,
            share,
        } => {
            let args = EstimateArgs {
                institution,
                scholarship,
                living,
                years,
                category,
                share,
            };
            handle_estimate(args, &config, format).await
        }

        Command::Recommend { profile, id } => {
            tracing::info!("Scoring institutions...");
            handle_recommend(&profile, id, &config, format).await
        }

        Command::Results { id, remote } => handle_results(id, remote, &config, format).await,

        Command::Serve { bind } => {
            tracing::info!("Starting HTTP server...");
            handle_serve(bind, &config).await
        }

        Command::Bot => {
            tracing::info!("Starting Telegram bot...");
            handle_bot(&config).await
        }

        Command::Doctor => {
            tracing::info!("Running diagnostics...");
            handle_doctor(&config, format).await
        }
    }
}
