//! Want (goal) payload.

use crate::model::payload::Payload;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WantStatus {
    #[default]
    Active,
    Achieved,
    Abandoned,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Want {
    pub title: String,
    #[serde(default)]
    pub status: WantStatus,
    /// Serialized as `YYYY-MM-DD`.
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct WantPatch {
    pub title: Option<String>,
    pub status: Option<WantStatus>,
    pub target_date: Option<Option<NaiveDate>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WantValidationError {
    EmptyTitle,
}

impl Display for WantValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "want title cannot be empty"),
        }
    }
}

impl Error for WantValidationError {}

impl Want {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), WantValidationError> {
        if self.title.trim().is_empty() {
            return Err(WantValidationError::EmptyTitle);
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.status == WantStatus::Active
    }
}

impl Payload for Want {
    const ID_PREFIX: &'static str = "want";
    type Patch = WantPatch;

    fn apply_patch(&mut self, patch: Self::Patch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(target_date) = patch.target_date {
            self.target_date = target_date;
        }
    }
}
