//! Read-side helpers: list filters, paging limits, and ordering.

use crate::model::record::Record;
use chrono::{DateTime, Utc};

pub const LIST_DEFAULT_LIMIT: u32 = 20;
pub const LIST_LIMIT_MAX: u32 = 200;

/// Filter and paging options for `RecordStore::list`.
///
/// `limit: None` returns every match after `offset`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordQuery {
    pub owner_ref: Option<String>,
    /// Inclusive lower bound on `created_at`.
    pub created_from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `created_at`.
    pub created_before: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl RecordQuery {
    pub fn for_owner(owner: impl Into<String>) -> Self {
        Self {
            owner_ref: Some(owner.into()),
            ..Self::default()
        }
    }

    pub fn matches<P>(&self, record: &Record<P>) -> bool {
        if let Some(owner) = self.owner_ref.as_deref() {
            if !record.references(owner) {
                return false;
            }
        }
        if let Some(from) = self.created_from {
            if record.created_at < from {
                return false;
            }
        }
        if let Some(before) = self.created_before {
            if record.created_at >= before {
                return false;
            }
        }
        true
    }
}

/// Normalizes an explicit page size: `0` means default, oversize clamps to max.
pub fn normalize_limit(limit: Option<u32>) -> Option<u32> {
    match limit {
        Some(0) => Some(LIST_DEFAULT_LIMIT),
        Some(value) if value > LIST_LIMIT_MAX => Some(LIST_LIMIT_MAX),
        other => other,
    }
}

/// Stable most-recent-first sort. Equal timestamps keep their input order.
pub fn sort_newest_first<P>(records: &mut [Record<P>]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
