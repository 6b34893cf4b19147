//! Sobel Ranker - Application Entry Point
//!
//! Parses the command line, runs one ranking pass and exits non-zero on any
//! unrecovered error.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sobel_ranker::{Cli, Config, RankingService};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let json_layer = cli
        .json_logs
        .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!cli.json_logs)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_filter().into()),
        )
        .with(json_layer)
        .with(text_layer)
        .init();

    let config = Config::from_cli(&cli).inspect_err(|e| {
        tracing::error!(code = e.error_code(), "{}", e);
    })?;

    let service = RankingService::new(config);
    match service.run().await {
        Ok(reports) => {
            for report in &reports {
                tracing::info!(
                    "{}: {} of {} submissions valid",
                    report.category,
                    report.valid_rows,
                    report.total_rows
                );
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!(code = e.error_code(), "Ranking failed: {}", e);
            Err(e.into())
        }
    }
}
