//! Evidence enrichment service

use chrono::{DateTime, Utc};
use compass_core::attributes::{self, AttributeValue};
use compass_core::{EnrichmentRequest, EnrichmentResponse, EnrichmentStatus, Error, Evidence, Result};
use compass_mapper::{Mapper, MapperSet, Scope};
use compass_telemetry::EnrichmentMetrics;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::CompassConfig;
use crate::loader;

/// Resolve evidence with a mapper the caller already holds
pub fn enrich(evidence: &Evidence, mapper: &dyn Mapper, scope: &Scope) -> EnrichmentResponse {
    EnrichmentResponse {
        compliance: mapper.map(evidence, scope),
    }
}

/// Enrichment service
///
/// Owns the mapper registry and catalog scope. Both are frozen at
/// construction; share the service as `Arc<Service>` between handlers.
#[derive(Debug)]
pub struct Service {
    mappers: MapperSet,
    scope: Scope,
    metrics: EnrichmentMetrics,
}

impl Service {
    pub fn new(mappers: MapperSet, scope: Scope) -> Self {
        Self {
            mappers,
            scope,
            metrics: EnrichmentMetrics::new(),
        }
    }

    /// Load catalogs and plans named by the configuration
    pub fn from_config(config: &CompassConfig) -> Result<Self> {
        let scope = loader::scope_from_catalog_paths(&config.catalogs)?;
        let mappers = loader::mapper_set_from_config(config)?;
        Ok(Self::new(mappers, scope))
    }

    /// Enrich evidence reported by the policy engine `source_id`
    ///
    /// Unknown sources are served by the fallback mapper, which yields the
    /// unmapped finding.
    pub fn enrich(&self, source_id: &str, evidence: &Evidence) -> EnrichmentResponse {
        let start = Instant::now();
        let selected = self.mappers.select(source_id);

        if selected.is_fallback {
            warn!(
                source = %source_id,
                fallback = %selected.mapper.plugin_name(),
                "No mapper registered for source, using fallback"
            );
        }

        let response = enrich(evidence, selected.mapper.as_ref(), &self.scope);

        self.metrics.record(
            response.compliance.enrichment_status,
            selected.is_fallback,
            start.elapsed(),
        );
        debug!(
            source = %source_id,
            policy_rule_id = %evidence.policy_rule_id,
            status = %response.compliance.status,
            enrichment_status = %response.compliance.enrichment_status,
            "Enriched evidence"
        );

        response
    }

    /// Enrich a request, keyed by the evidence's own policy engine name
    pub fn enrich_request(&self, request: &EnrichmentRequest) -> EnrichmentResponse {
        self.enrich(&request.evidence.policy_engine_name, &request.evidence)
    }

    /// Compliance attributes for a log record carrying evidence attributes
    ///
    /// Records missing a required attribute are not enriched and get only
    /// the `skipped` enrichment status.
    pub fn annotate(
        &self,
        attrs: &HashMap<String, String>,
        timestamp: DateTime<Utc>,
    ) -> Vec<(&'static str, AttributeValue)> {
        let evidence = match attributes::evidence_from_attributes(attrs, timestamp) {
            Ok(evidence) => evidence,
            Err(Error::MissingAttributes(missing)) => {
                debug!(missing = ?missing, "Skipping record without evidence attributes");
                return self.skipped();
            }
            Err(e) => {
                warn!(error = %e, "Failed to read evidence attributes");
                return self.skipped();
            }
        };

        let response = self.enrich(&evidence.policy_engine_name, &evidence);
        attributes::compliance_attributes(&response.compliance)
    }

    fn skipped(&self) -> Vec<(&'static str, AttributeValue)> {
        self.metrics.record_skipped();
        vec![(
            attributes::COMPLIANCE_ENRICHMENT_STATUS,
            EnrichmentStatus::Skipped.as_str().into(),
        )]
    }

    pub fn mappers(&self) -> &MapperSet {
        &self.mappers
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn metrics(&self) -> &EnrichmentMetrics {
        &self.metrics
    }
}
