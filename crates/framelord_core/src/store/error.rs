//! Store-level error taxonomy.
//!
//! A missing record is not an error here: lookups and mutations return
//! `None` / `false` for it.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    /// Bulk input was not a JSON array of well-formed, uniquely-identified records.
    MalformedImport(String),
    /// Persisted row or file content could not be decoded.
    InvalidData(String),
    Serialize(serde_json::Error),
    Io(std::io::Error),
    Db(DbError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedImport(message) => write!(f, "malformed import: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
            Self::Serialize(err) => write!(f, "failed to serialize records: {err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MalformedImport(_) => None,
            Self::InvalidData(_) => None,
            Self::Serialize(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
