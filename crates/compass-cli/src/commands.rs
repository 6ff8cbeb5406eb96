//! Subcommand implementations

use anyhow::{Context, Result};
use compass_core::Evidence;
use compass_mapper::Mapper;
use compass_service::{CompassConfig, Service};
use compass_telemetry::MetricsSnapshot;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use tracing::{info, warn};

use crate::cli::LoadArgs;

/// Load configuration, catalogs and plans into a service
pub fn load_service(args: &LoadArgs) -> Result<Service> {
    let config = CompassConfig::load(args.config.as_deref(), &args.catalogs)
        .context("Failed to load configuration")?;
    info!(
        catalogs = config.catalogs.len(),
        plugins = config.plugins.len(),
        "Configuration loaded"
    );

    let service = Service::from_config(&config).context("Failed to load catalogs and plans")?;
    Ok(service)
}

/// Print what was loaded
pub fn write_summary(service: &Service, out: &mut impl Write) -> io::Result<()> {
    let scope = service.scope();
    writeln!(out, "Catalogs: {}", scope.len())?;
    for catalog_id in scope.ids() {
        let controls = scope
            .get(catalog_id)
            .map(|catalog| catalog.controls().count())
            .unwrap_or_default();
        writeln!(out, "  {catalog_id} ({controls} controls)")?;
    }

    let mappers = service.mappers();
    writeln!(out, "Mappers: {}", mappers.len())?;
    for id in mappers.ids() {
        if let Some(mapper) = mappers.get(id.as_str()) {
            let plans: usize = mapper.plans().values().map(Vec::len).sum();
            writeln!(
                out,
                "  {id} ({plans} plans across {} catalogs)",
                mapper.plans().len()
            )?;
        }
    }

    Ok(())
}

/// Open the evidence input, `-` meaning stdin
pub fn open_input(input: &str) -> Result<Box<dyn BufRead>> {
    if input == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(input).with_context(|| format!("Failed to open {input}"))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Enrich one JSON evidence record per line
///
/// Each response is written to `out` as a single JSON line. Lines that are
/// not valid evidence, including lines that are not UTF-8, are reported to
/// `errors` and skipped. Returns the number of rejected lines.
pub fn enrich_stream(
    service: &Service,
    mut input: impl BufRead,
    mut out: impl Write,
    mut errors: impl Write,
) -> Result<usize> {
    let mut rejected = 0;
    let mut line_no = 0;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = input
            .read_until(b'\n', &mut buf)
            .context("Failed to read evidence input")?;
        if read == 0 {
            break;
        }
        line_no += 1;

        let parsed = std::str::from_utf8(&buf)
            .map_err(|e| format!("invalid UTF-8: {e}"))
            .and_then(|line| {
                if line.trim().is_empty() {
                    Ok(None)
                } else {
                    Evidence::from_json(line).map(Some).map_err(|e| e.to_string())
                }
            });

        let evidence = match parsed {
            Ok(Some(evidence)) => evidence,
            Ok(None) => continue,
            Err(e) => {
                rejected += 1;
                warn!(line = line_no, error = %e, "Rejected evidence record");
                writeln!(errors, "line {line_no}: {e}")?;
                continue;
            }
        };

        let response = service.enrich(&evidence.policy_engine_name, &evidence);
        serde_json::to_writer(&mut out, &response)?;
        writeln!(out)?;
    }

    out.flush()?;
    Ok(rejected)
}

/// Print enrichment counters
pub fn write_metrics(snapshot: &MetricsSnapshot, out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "Enriched {} records: {} mapped, {} unmapped, {} via fallback ({:.1}% mapped, avg {}us)",
        snapshot.total_requests,
        snapshot.mapped,
        snapshot.unmapped,
        snapshot.fallbacks,
        snapshot.mapped_rate() * 100.0,
        snapshot.avg_latency_us()
    )
}
