//! FrameScan report payload.
//!
//! # Invariants
//! - `score` is within `0..=100` once validated.
//! - `raw_result` is kept opaque; the analysis output is never re-shaped here.

use crate::model::payload::Payload;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const MAX_FRAME_SCORE: u8 = 100;

/// Kind of content a scan was run against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameScanDomain {
    #[default]
    Text,
    Image,
    Audio,
}

/// Result of one frame analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameScanReport {
    pub domain: FrameScanDomain,
    pub score: u8,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub raw_result: Value,
}

#[derive(Debug, Clone, Default)]
pub struct FrameScanReportPatch {
    pub domain: Option<FrameScanDomain>,
    pub score: Option<u8>,
    pub summary: Option<String>,
    pub raw_result: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameScanValidationError {
    ScoreOutOfRange(u8),
}

impl Display for FrameScanValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ScoreOutOfRange(score) => {
                write!(f, "frame score {score} is outside 0..={MAX_FRAME_SCORE}")
            }
        }
    }
}

impl Error for FrameScanValidationError {}

impl FrameScanReport {
    pub fn new(domain: FrameScanDomain, score: u8, summary: impl Into<String>) -> Self {
        Self {
            domain,
            score,
            summary: summary.into(),
            raw_result: Value::Null,
        }
    }

    pub fn validate(&self) -> Result<(), FrameScanValidationError> {
        if self.score > MAX_FRAME_SCORE {
            return Err(FrameScanValidationError::ScoreOutOfRange(self.score));
        }
        Ok(())
    }
}

impl Payload for FrameScanReport {
    const ID_PREFIX: &'static str = "fs";
    type Patch = FrameScanReportPatch;

    fn apply_patch(&mut self, patch: Self::Patch) {
        if let Some(domain) = patch.domain {
            self.domain = domain;
        }
        if let Some(score) = patch.score {
            self.score = score;
        }
        if let Some(summary) = patch.summary {
            self.summary = summary;
        }
        if let Some(raw_result) = patch.raw_result {
            self.raw_result = raw_result;
        }
    }
}
