//! # Highrise Sim
//!
//! Headless runner for the Highrise gameplay core.
//!
//! Plays the configured floors with a scripted pilot and logs every event the
//! core publishes. Useful for soak runs and for eyeballing balance changes
//! without a renderer.
//!
//! Usage: `highrise-sim [--config <path>] [--levels <path>] [--ticks <n>]`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod pilot;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("highrise=info".parse()?))
        .init();

    info!("Highrise sim starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let options = app::SimOptions::parse(std::env::args().skip(1))?;
    let report = app::run(&options)?;

    info!(
        "Highrise sim finished: {} floor(s) cleared in {} ticks",
        report.floors_cleared, report.ticks
    );
    Ok(())
}
