use crate::model::payload::Payload;
use crate::model::record::Record;
use crate::persistence::PersistenceAdapter;
use crate::store::error::StoreResult;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// In-process adapter holding the last saved snapshot.
#[derive(Debug)]
pub struct MemoryPersistence<P> {
    records: Mutex<Vec<Record<P>>>,
    saves: Mutex<usize>,
}

impl<P> Default for MemoryPersistence<P> {
    fn default() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            saves: Mutex::new(0),
        }
    }
}

impl<P: Clone> MemoryPersistence<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing snapshot, e.g. seeded demo data.
    pub fn with_records(records: Vec<Record<P>>) -> Self {
        Self {
            records: Mutex::new(records),
            saves: Mutex::new(0),
        }
    }

    pub fn snapshot(&self) -> Vec<Record<P>> {
        lock(&self.records).clone()
    }

    /// Number of completed `save` calls.
    pub fn save_count(&self) -> usize {
        *lock(&self.saves)
    }
}

impl<P: Payload> PersistenceAdapter<P> for MemoryPersistence<P> {
    fn load(&self) -> StoreResult<Vec<Record<P>>> {
        Ok(self.snapshot())
    }

    fn save(&self, records: &[Record<P>]) -> StoreResult<()> {
        *lock(&self.records) = records.to_vec();
        *lock(&self.saves) += 1;
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
