//! Compass
//!
//! Loads control catalogs and per-engine evaluation plans, then resolves
//! policy evaluation evidence into compliance findings.

use anyhow::Result;
use clap::Parser;
use compass_cli::cli::{Cli, Commands};
use compass_cli::commands;
use std::io::{self, Write};
use tracing::info;

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.command.load_args().verbose);
    compass_telemetry::describe_metrics();

    let service = commands::load_service(cli.command.load_args())?;
    info!(
        catalogs = service.scope().len(),
        mappers = service.mappers().len(),
        "Service ready"
    );

    match &cli.command {
        Commands::Check { .. } => {
            let mut stdout = io::stdout().lock();
            commands::write_summary(&service, &mut stdout)?;
        }

        Commands::Enrich { input, .. } => {
            let reader = commands::open_input(input)?;
            let rejected = commands::enrich_stream(
                &service,
                reader,
                io::stdout().lock(),
                io::stderr().lock(),
            )?;

            let mut stderr = io::stderr().lock();
            commands::write_metrics(&service.metrics().snapshot(), &mut stderr)?;
            if rejected > 0 {
                writeln!(stderr, "Rejected {rejected} malformed records")?;
            }
        }
    }

    Ok(())
}

/// Initialize tracing/logging on stderr; stdout carries command output
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("compass=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("compass=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
