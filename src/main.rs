//! Plumage - Main Entry Point
//!
//! Serves the upload API by default; `predict` and `labels` work offline.

use clap::Parser;
use plumage::cli::{cmd_labels, cmd_predict, cmd_serve, Cli, Commands};
use plumage::server::ServerConfig;

fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "plumage=debug,tower_http=debug"
    } else {
        "plumage=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let defaults = ServerConfig::default();
    init_tracing(defaults.debug);

    match cli.command {
        Some(Commands::Serve { host, port, model, labels }) => {
            let config = ServerConfig {
                host,
                port,
                model_path: model.unwrap_or(defaults.model_path.clone()),
                labels_path: labels.unwrap_or(defaults.labels_path.clone()),
                ..defaults
            };
            cmd_serve(config).await?;
        }
        Some(Commands::Predict { image, model, labels }) => {
            cmd_predict(&image, &model, &labels)?;
        }
        Some(Commands::Labels { labels }) => {
            cmd_labels(&labels)?;
        }
        None => {
            cmd_serve(defaults).await?;
        }
    }

    Ok(())
}
