use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::classifier::{classify, next_listed_date};
use crate::context_id::extract_context_id;
use crate::nsw_client::{AvailabilityClient, fetch_availability};
use crate::types::{AvailabilityStatus, CampgroundRecord, EnrichedRecord};

/// Attaches availability to campground records, one record at a time
pub struct Enricher {
    client: Arc<dyn AvailabilityClient>,
}

/// Counts of an enrichment run by outcome
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrichmentSummary {
    /// Records processed
    pub total: usize,
    /// Records that had an extractable context id
    pub with_context_id: usize,
    /// Records bookable today
    pub available: usize,
    /// Records with dates that exclude today
    pub unavailable: usize,
    /// Records without usable availability
    pub unknown: usize,
}

impl EnrichmentSummary {
    /// Tally enriched records
    pub fn from_records(records: &[EnrichedRecord]) -> Self {
        let mut summary = Self {
            total: records.len(),
            ..Self::default()
        };

        for record in records {
            if record.context_id.is_some() {
                summary.with_context_id += 1;
            }
            match record.availability {
                AvailabilityStatus::Available => summary.available += 1,
                AvailabilityStatus::Unavailable => summary.unavailable += 1,
                AvailabilityStatus::Unknown => summary.unknown += 1,
            }
        }

        summary
    }
}

impl Enricher {
    /// Create an enricher backed by the given availability source
    pub fn new(client: Arc<dyn AvailabilityClient>) -> Self {
        Self { client }
    }

    /// Enrich a single record for `today`.
    ///
    /// Records without a usable `id` never reach the availability client.
    pub async fn enrich_record(&self, record: CampgroundRecord, today: NaiveDate) -> EnrichedRecord {
        let context_id = extract_context_id(record.raw_id());

        let dates = match context_id.as_deref() {
            Some(id) => fetch_availability(self.client.as_ref(), id).await,
            None => None,
        };

        let availability = classify(today, dates.as_deref());

        if let (Some(id), Some(listed)) = (context_id.as_deref(), dates.as_deref()) {
            match next_listed_date(today, listed) {
                Some(next) => debug!("{}: {} (next listed date {})", id, availability, next),
                None => debug!("{}: {}", id, availability),
            }
        }

        EnrichedRecord::new(record, context_id, dates, availability)
    }

    /// Enrich every record in order. Lookups run strictly one after another.
    pub async fn enrich(&self, records: Vec<CampgroundRecord>, today: NaiveDate) -> Vec<EnrichedRecord> {
        info!("Enriching {} campgrounds for {}", records.len(), today);

        let mut enriched = Vec::with_capacity(records.len());
        for record in records {
            enriched.push(self.enrich_record(record, today).await);
        }

        let summary = EnrichmentSummary::from_records(&enriched);
        info!(
            "Enrichment complete: {} available, {} unavailable, {} unknown ({} of {} with a context id)",
            summary.available,
            summary.unavailable,
            summary.unknown,
            summary.with_context_id,
            summary.total
        );

        enriched
    }
}
