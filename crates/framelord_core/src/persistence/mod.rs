//! Persistence adapters for record stores.
//!
//! # Responsibility
//! - Define the load/save contract a store uses to reach durable storage.
//! - Provide file, SQLite, and in-memory implementations.
//! - Offer an opt-in autosave hook; stores never persist on their own.
//!
//! # Invariants
//! - `save` receives the complete record list and replaces prior content.
//! - Autosave failures are logged and never reach the mutating caller.

mod json_file;
mod memory;
mod sqlite;

pub use json_file::JsonFilePersistence;
pub use memory::MemoryPersistence;
pub use sqlite::SqlitePersistence;

use crate::model::payload::Payload;
use crate::model::record::Record;
use crate::store::error::StoreResult;
use crate::store::record_store::RecordStore;
use crate::store::subscription::Subscription;
use log::error;
use std::sync::{Arc, Mutex, PoisonError};

/// Load/save boundary between an in-memory store and durable storage.
pub trait PersistenceAdapter<P: Payload> {
    /// Returns every persisted record. Empty storage yields an empty list.
    fn load(&self) -> StoreResult<Vec<Record<P>>>;

    /// Replaces persisted content with `records`.
    fn save(&self, records: &[Record<P>]) -> StoreResult<()>;
}

/// Saves `store` through `adapter` after every mutation.
///
/// The listener keeps only a weak reference to the store, so it does not
/// extend the store's lifetime. Call `unsubscribe` on the returned handle to
/// stop saving.
///
/// Snapshot and save happen under one per-hook lock, so with concurrent
/// mutators a save never overwrites a newer snapshot with an older one.
pub fn autosave<P, A>(store: &Arc<RecordStore<P>>, adapter: Arc<A>) -> Subscription
where
    P: Payload,
    A: PersistenceAdapter<P> + Send + Sync + 'static,
{
    let weak_store = Arc::downgrade(store);
    let save_lock = Mutex::new(());
    store.subscribe_fn(move || {
        let Some(store) = weak_store.upgrade() else {
            return;
        };
        let _guard = save_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = store.save_to(adapter.as_ref()) {
            error!(
                "event=autosave module=persistence status=error prefix={} error={}",
                P::ID_PREFIX,
                err
            );
        }
    })
}
