//! Generic record envelope shared by every entity store.
//!
//! # Responsibility
//! - Carry the store-owned fields (`id`, `created_at`, `owner_refs`) around a
//!   typed entity payload.
//! - Define the input (`NewRecord`) and patch (`RecordPatch`) shapes accepted
//!   by store mutations.
//!
//! # Invariants
//! - `id` and `created_at` are assigned by the store and have no patch field.
//! - `owner_refs` keeps insertion order; the first entry is the primary subject.

use crate::model::payload::Payload;
use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Opaque record identifier, unique inside one store instance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub(crate) fn new(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for RecordId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for RecordId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// One stored entity.
///
/// Serialized with camelCase keys so exported blobs keep the
/// `id/createdAt/ownerRefs/payload` shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<P> {
    pub id: RecordId,
    /// RFC 3339 in serialized form.
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub owner_refs: Vec<String>,
    pub payload: P,
}

impl<P> Record<P> {
    /// Returns whether `owner` appears anywhere in `owner_refs`.
    pub fn references(&self, owner: &str) -> bool {
        self.owner_refs.iter().any(|value| value == owner)
    }

    /// First owner reference, if any.
    pub fn primary_owner(&self) -> Option<&str> {
        self.owner_refs.first().map(String::as_str)
    }
}

/// Input accepted by `RecordStore::add`.
///
/// `created_at` is optional so seeded or backdated data can keep its original
/// timestamp; the store uses the current time otherwise.
#[derive(Debug, Clone, Default)]
pub struct NewRecord<P> {
    pub owner_refs: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub payload: P,
}

impl<P> NewRecord<P> {
    pub fn new(payload: P) -> Self {
        Self {
            owner_refs: Vec::new(),
            created_at: None,
            payload,
        }
    }

    /// Appends one owner reference.
    pub fn owned_by(mut self, owner: impl Into<String>) -> Self {
        self.owner_refs.push(owner.into());
        self
    }

    pub fn with_owner_refs<I, S>(mut self, owners: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.owner_refs = owners.into_iter().map(Into::into).collect();
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Shallow patch applied by `RecordStore::update`.
///
/// Every `Some` field replaces the stored value wholesale. There is no way to
/// express a change to `id` or `created_at`.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch<Q> {
    pub owner_refs: Option<Vec<String>>,
    pub payload: Q,
}

impl<Q: Default> RecordPatch<Q> {
    /// Patch touching only payload fields.
    pub fn payload(payload: Q) -> Self {
        Self {
            owner_refs: None,
            payload,
        }
    }

    /// Patch replacing only the owner reference list.
    pub fn owner_refs<I, S>(owners: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            owner_refs: Some(owners.into_iter().map(Into::into).collect()),
            payload: Q::default(),
        }
    }
}

/// Patch alias for a concrete payload type.
pub type PatchFor<P> = RecordPatch<<P as Payload>::Patch>;

/// Current time truncated to millisecond precision.
pub fn now_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Parses an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
}
