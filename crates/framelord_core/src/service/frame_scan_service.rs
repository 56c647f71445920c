//! FrameScan use-case service.
//!
//! # Responsibility
//! - Validate and store analysis results against one or more contacts.
//! - Answer per-contact history and score aggregates.
//!
//! # Invariants
//! - Stored scores are always within `0..=100`.
//! - Contact ids are trimmed; blanks and repeats are dropped, order kept.

use crate::model::frame_scan::{FrameScanDomain, FrameScanReport, FrameScanValidationError};
use crate::model::record::{NewRecord, Record};
use crate::store::FrameScanStore;
use chrono::{DateTime, Utc};
use log::info;
use serde_json::Value;
use std::collections::BTreeMap;

/// Input for `FrameScanService::record_scan`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordScanRequest {
    /// First entry is the primary subject.
    pub contact_ids: Vec<String>,
    pub domain: FrameScanDomain,
    pub score: u8,
    pub summary: String,
    pub raw_result: Value,
    /// Backdates the report when set (seeded or imported data).
    pub created_at: Option<DateTime<Utc>>,
}

pub struct FrameScanService<'store> {
    store: &'store FrameScanStore,
}

impl<'store> FrameScanService<'store> {
    pub fn new(store: &'store FrameScanStore) -> Self {
        Self { store }
    }

    /// Validates and stores one report.
    ///
    /// # Errors
    /// - `ScoreOutOfRange` when `score > 100`; nothing is stored.
    pub fn record_scan(
        &self,
        request: RecordScanRequest,
    ) -> Result<Record<FrameScanReport>, FrameScanValidationError> {
        let report = FrameScanReport {
            domain: request.domain,
            score: request.score,
            summary: request.summary,
            raw_result: request.raw_result,
        };
        report.validate()?;

        let mut input =
            NewRecord::new(report).with_owner_refs(normalize_contact_ids(&request.contact_ids));
        input.created_at = request.created_at;

        let record = self.store.add(input);
        info!(
            "event=frame_scan_record module=service status=ok id={} score={} owners={}",
            record.id,
            record.payload.score,
            record.owner_refs.len()
        );
        Ok(record)
    }

    /// Reports mentioning `contact_id`, most recent first.
    pub fn history_for_contact(&self, contact_id: &str) -> Vec<Record<FrameScanReport>> {
        self.store.get_by_owner_ref(contact_id)
    }

    pub fn latest_for_contact(&self, contact_id: &str) -> Option<Record<FrameScanReport>> {
        self.history_for_contact(contact_id).into_iter().next()
    }

    /// Mean score across all reports, or across one contact's reports.
    ///
    /// Returns `None` when there is nothing to average.
    pub fn average_score(&self, contact_id: Option<&str>) -> Option<f64> {
        let reports = match contact_id {
            Some(contact_id) => self.history_for_contact(contact_id),
            None => self.store.get_all(),
        };
        if reports.is_empty() {
            return None;
        }
        let total: u32 = reports
            .iter()
            .map(|record| u32::from(record.payload.score))
            .sum();
        Some(f64::from(total) / reports.len() as f64)
    }

    pub fn reports_per_contact(&self) -> BTreeMap<String, usize> {
        self.store.count_by_owner_ref()
    }

    pub fn count_in_domain(&self, domain: FrameScanDomain) -> usize {
        self.store.count_where(|record| record.payload.domain == domain)
    }
}

fn normalize_contact_ids(contact_ids: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(contact_ids.len());
    for contact_id in contact_ids {
        let trimmed = contact_id.trim();
        if !trimmed.is_empty() && !normalized.iter().any(|known| known == trimmed) {
            normalized.push(trimmed.to_string());
        }
    }
    normalized
}
