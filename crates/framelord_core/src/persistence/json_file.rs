//! Whole-list JSON blob persistence.
//!
//! # Invariants
//! - A missing file loads as an empty list.
//! - Saves write a sibling temp file and rename it over the target, so a
//!   crash mid-write never leaves a truncated blob.

use crate::model::payload::Payload;
use crate::model::record::Record;
use crate::persistence::PersistenceAdapter;
use crate::store::error::{StoreError, StoreResult};
use crate::store::record_store::parse_records;
use log::{debug, error};
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("records.json"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl<P: Payload> PersistenceAdapter<P> for JsonFilePersistence {
    fn load(&self) -> StoreResult<Vec<Record<P>>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(
                    "event=persistence_load module=persistence backend=json status=empty path={}",
                    self.path.display()
                );
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        parse_records(&content).map_err(|err| match err {
            StoreError::MalformedImport(message) => StoreError::InvalidData(format!(
                "`{}`: {message}",
                self.path.display()
            )),
            other => other,
        })
    }

    fn save(&self, records: &[Record<P>]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let body = serde_json::to_vec_pretty(records).map_err(StoreError::Serialize)?;
        let temp_path = self.temp_path();
        if let Err(err) = fs::write(&temp_path, body) {
            error!(
                "event=persistence_save module=persistence backend=json status=error path={} error={}",
                temp_path.display(),
                err
            );
            let _ = fs::remove_file(&temp_path);
            return Err(err.into());
        }
        if let Err(err) = fs::rename(&temp_path, &self.path) {
            error!(
                "event=persistence_save module=persistence backend=json status=error path={} error={}",
                self.path.display(),
                err
            );
            let _ = fs::remove_file(&temp_path);
            return Err(err.into());
        }
        Ok(())
    }
}
