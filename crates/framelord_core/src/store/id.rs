//! Record id generation.
//!
//! Ids have the shape `{prefix}_{epoch_ms}_{suffix}`. The suffix is eight
//! base-36 characters (about 41 bits) taken from a v4 UUID, so independent
//! generators never need to coordinate.

use crate::model::record::RecordId;
use chrono::Utc;
use uuid::Uuid;

const SUFFIX_LEN: usize = 8;
const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const FALLBACK_PREFIX: &str = "rec";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdGenerator {
    prefix: String,
}

impl IdGenerator {
    /// Creates a generator for `prefix`.
    ///
    /// The prefix is lowercased and any character outside `[a-z0-9_]` becomes
    /// `_`. A blank prefix falls back to `rec`.
    pub fn new(prefix: &str) -> Self {
        let normalized: String = prefix
            .trim()
            .chars()
            .map(|c| {
                let c = c.to_ascii_lowercase();
                if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let prefix = if normalized.is_empty() {
            FALLBACK_PREFIX.to_string()
        } else {
            normalized
        };
        Self { prefix }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn next_id(&self) -> RecordId {
        self.next_id_at(Utc::now().timestamp_millis())
    }

    /// Generates an id for an explicit epoch-millisecond timestamp.
    pub fn next_id_at(&self, epoch_ms: i64) -> RecordId {
        RecordId::new(format!("{}_{}_{}", self.prefix, epoch_ms, random_suffix()))
    }
}

fn random_suffix() -> String {
    let mut entropy = Uuid::new_v4().as_u128();
    let mut suffix = String::with_capacity(SUFFIX_LEN);
    for _ in 0..SUFFIX_LEN {
        suffix.push(char::from(BASE36_ALPHABET[(entropy % 36) as usize]));
        entropy /= 36;
    }
    suffix
}
