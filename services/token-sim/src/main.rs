//! Token pool simulator
//!
//! Operator front end for the least-used token pool:
//! 1. Loads optional configuration (pool size, reset interval, output)
//! 2. Prompts for the number of operations to simulate
//! 3. Runs the simulation against a fresh pool
//! 4. Prints per-token usage and the least-used set

mod config;
mod error;
mod metrics;
mod output;
mod prompt;

use anyhow::{Context, Result};
use token_pool::{SharedTokenPool, TokenPool};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, OutputFormat};

#[tokio::main]
async fn main() -> Result<()> {
    // JSON logs on stderr keep stdout for the prompt and report
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

    info!("starting token-sim");

    let prometheus_handle = metrics::install_recorder()?;

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let source = Config::resolve_path(cli_config_path);
    let config = Config::from_source(&source)
        .with_context(|| format!("failed to load config from {source:?}"))?;

    info!(
        pool_size = config.pool.size,
        reset_interval_secs = config.pool.reset_interval_secs,
        caller_increment = config.simulation.caller_increment,
        format = ?config.output.format,
        "configuration loaded"
    );

    let pool = SharedTokenPool::new(
        TokenPool::with_reset_interval(config.pool.size, config.reset_interval())
            .context("failed to create token pool")?,
    );

    let operations = {
        let mut input = std::io::stdin().lock();
        let mut out = std::io::stdout();
        match prompt::read_operation_count(&mut input, &mut out) {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "no usable operation count, simulating none");
                0
            }
        }
    };

    if config.output.format == OutputFormat::Text {
        println!("{}", output::simulation_banner(operations));
    }

    let performed = pool
        .simulate(operations, config.simulation.mode())
        .await
        .context("simulation failed")?;
    info!(requested = operations, performed, "simulation finished");

    let report = pool.stats_report().await;
    print!(
        "{}",
        output::render(&report, config.output.format).context("failed to render report")?
    );

    if config.output.metrics {
        print!("{}", prometheus_handle.render());
    }

    Ok(())
}
