//! Headless sync driver.
//!
//! Runs one sync cycle against the configured endpoints and prints the
//! outcome. Useful for smoke-testing the core without a GUI in front of
//! it; takes no arguments.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use countrycache::sync::ProgressFn;
use countrycache::{CancelToken, Config, SyncOrchestrator, SyncOutcome};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    info!("countrycache starting");

    let config = Config::new()?;
    let orchestrator = SyncOrchestrator::new(config)?;

    let progress: ProgressFn = Arc::new(|pct| {
        eprint!("\rsyncing... {pct:3}%");
        let _ = io::stderr().flush();
    });

    match orchestrator.run(progress, CancelToken::new()).await? {
        SyncOutcome::Ready {
            countries,
            source,
            synced_at,
            flag_task,
        } => {
            eprintln!();
            println!(
                "{} countries loaded from {} at {}",
                countries.len(),
                source,
                synced_at.format("%Y-%m-%d %H:%M:%S")
            );
            for country in countries.iter().take(10) {
                println!(
                    "  {:30} {:15} capital: {}",
                    country.name,
                    country.region_display(),
                    country.capital_display()
                );
            }
            if countries.len() > 10 {
                println!("  ... and {} more", countries.len() - 10);
            }
            let rows = orchestrator.store().count()?;
            info!(rows, "local store populated");

            // Let in-flight flag downloads finish before the runtime goes
            // away; readiness was already reported above.
            if let Some(task) = flag_task {
                info!("waiting for flag downloads to finish");
                let _ = task.await;
            }
        }
        SyncOutcome::Empty => {
            eprintln!();
            println!("No internet connection and no countries were previously loaded.");
            println!("Try again later!");
        }
    }

    info!("countrycache shutting down");
    Ok(())
}
