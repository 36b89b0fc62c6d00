//! questbusd - console driver for the quest bus.
//!
//! Reads `<sender-id> <text>` lines from stdin and writes role output to
//! stdout.

use questbus::config::{self, Config};
use questbus::console::{ConsoleDriver, OutputFactory};
use questbus::metrics;
use questbus::output::{ConsoleOutput, Output};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "questbus.toml".to_string());

    let config = Config::load_or_default(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        return Err(anyhow::anyhow!(
            "{} configuration error(s), see messages above",
            errors.len()
        ));
    }

    metrics::init();
    info!(
        quest = %config.player.quest_path,
        delivery_timeout_ms = config.bus.delivery_timeout_ms,
        "Starting questbusd"
    );

    let outputs: OutputFactory =
        Arc::new(|recipient: &str| Arc::new(ConsoleOutput::new(recipient)) as Arc<dyn Output>);
    let mut driver = ConsoleDriver::new(config, outputs);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            line = lines.next_line() => line,
        };

        match line {
            Ok(Some(line)) => {
                if let Err(e) = driver.handle_line(&line).await {
                    warn!(error = %e, code = e.error_code(), "Could not start player");
                }
            }
            Ok(None) => {
                info!("Input closed");
                break;
            }
            Err(e) => {
                error!(error = %e, "Failed to read input");
                break;
            }
        }
    }

    driver.shutdown();
    debug!(metrics = %metrics::gather_metrics(), "Metrics snapshot");
    info!("questbusd stopped");
    Ok(())
}
