//! Want (goal) use-case service.

use crate::model::record::{NewRecord, Record, RecordPatch};
use crate::model::want::{Want, WantPatch, WantStatus, WantValidationError};
use crate::store::WantStore;
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WantServiceError {
    Validation(WantValidationError),
    WantNotFound(String),
}

impl Display for WantServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::WantNotFound(id) => write!(f, "want not found: {id}"),
        }
    }
}

impl Error for WantServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::WantNotFound(_) => None,
        }
    }
}

impl From<WantValidationError> for WantServiceError {
    fn from(value: WantValidationError) -> Self {
        Self::Validation(value)
    }
}

pub struct WantService<'store> {
    store: &'store WantStore,
}

impl<'store> WantService<'store> {
    pub fn new(store: &'store WantStore) -> Self {
        Self { store }
    }

    /// Creates an active want. The title is trimmed.
    pub fn create_want(
        &self,
        title: &str,
        owner_refs: &[&str],
        target_date: Option<NaiveDate>,
    ) -> Result<Record<Want>, WantServiceError> {
        let mut want = Want::new(title.trim());
        want.target_date = target_date;
        want.validate()?;
        Ok(self
            .store
            .add(NewRecord::new(want).with_owner_refs(owner_refs.iter().copied())))
    }

    pub fn set_status(
        &self,
        id: &str,
        status: WantStatus,
    ) -> Result<Record<Want>, WantServiceError> {
        let patch = WantPatch {
            status: Some(status),
            ..WantPatch::default()
        };
        self.store
            .update(id, RecordPatch::payload(patch))
            .ok_or_else(|| WantServiceError::WantNotFound(id.to_string()))
    }

    pub fn active_wants(&self) -> Vec<Record<Want>> {
        self.store.filter(|record| record.payload.is_active())
    }

    pub fn wants_for_owner(&self, owner: &str) -> Vec<Record<Want>> {
        self.store.get_by_owner_ref(owner)
    }

    /// Active wants whose target date is before `today`.
    pub fn overdue(&self, today: NaiveDate) -> Vec<Record<Want>> {
        self.store.filter(|record| {
            record.payload.is_active()
                && record
                    .payload
                    .target_date
                    .is_some_and(|target| target < today)
        })
    }
}
