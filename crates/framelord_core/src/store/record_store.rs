//! Generic reactive in-memory record store.
//!
//! # Responsibility
//! - Own the authoritative record list for one entity type.
//! - Apply every write and notify subscribers synchronously.
//! - Serve read-only snapshots that never alias internal state.
//!
//! # Invariants
//! - No two records share an `id`.
//! - `id` and `created_at` never change after `add`.
//! - Listeners run after internal locks are released, exactly once per
//!   successful mutation, before the mutating call returns.
//! - A failed import leaves the record list untouched.

use crate::model::payload::Payload;
use crate::model::record::{now_timestamp, NewRecord, PatchFor, Record, RecordId};
use crate::persistence::PersistenceAdapter;
use crate::store::error::{StoreError, StoreResult};
use crate::store::id::IdGenerator;
use crate::store::query::{normalize_limit, sort_newest_first, RecordQuery};
use crate::store::subscription::{Listener, Subscription, SubscriptionRegistry};
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub struct RecordStore<P: Payload> {
    ids: IdGenerator,
    records: RwLock<Vec<Record<P>>>,
    registry: SubscriptionRegistry,
}

impl<P: Payload> Default for RecordStore<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Payload> std::fmt::Debug for RecordStore<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("prefix", &self.ids.prefix())
            .field("records", &self.len())
            .field("listeners", &self.registry.len())
            .finish()
    }
}

impl<P: Payload> RecordStore<P> {
    /// Creates an empty store using `P::ID_PREFIX` for generated ids.
    pub fn new() -> Self {
        Self {
            ids: IdGenerator::new(P::ID_PREFIX),
            records: RwLock::new(Vec::new()),
            registry: SubscriptionRegistry::new(),
        }
    }

    /// Creates a store pre-filled with `records`, e.g. from a persistence load.
    ///
    /// # Errors
    /// - `MalformedImport` when two records share an id.
    pub fn with_records(records: Vec<Record<P>>) -> StoreResult<Self> {
        ensure_unique_ids(&records)?;
        let store = Self::new();
        *store.write_records() = records;
        Ok(store)
    }

    fn name(&self) -> &str {
        self.ids.prefix()
    }

    // Mutations

    /// Adds one record at the front of the list and notifies subscribers.
    pub fn add(&self, input: NewRecord<P>) -> Record<P> {
        let created_at = input.created_at.unwrap_or_else(now_timestamp);
        let record = {
            let mut records = self.write_records();
            let record = Record {
                id: self.fresh_id(&records),
                created_at,
                owner_refs: input.owner_refs,
                payload: input.payload,
            };
            records.insert(0, record.clone());
            record
        };

        debug!(
            "event=record_add module=store store={} status=ok id={}",
            self.name(),
            record.id
        );
        self.emit();
        record
    }

    /// Shallow-merges `patch` into the record with `id`.
    ///
    /// Returns `None` without notifying when no record matches.
    pub fn update(&self, id: &str, patch: PatchFor<P>) -> Option<Record<P>> {
        let updated = {
            let mut records = self.write_records();
            match records.iter_mut().find(|record| record.id == id) {
                Some(record) => {
                    if let Some(owner_refs) = patch.owner_refs {
                        record.owner_refs = owner_refs;
                    }
                    record.payload.apply_patch(patch.payload);
                    Some(record.clone())
                }
                None => None,
            }
        };

        match updated {
            Some(record) => {
                debug!(
                    "event=record_update module=store store={} status=ok id={}",
                    self.name(),
                    id
                );
                self.emit();
                Some(record)
            }
            None => {
                debug!(
                    "event=record_update module=store store={} status=not_found id={}",
                    self.name(),
                    id
                );
                None
            }
        }
    }

    /// Removes the record with `id`. Notifies only when something was removed.
    pub fn delete(&self, id: &str) -> bool {
        let removed = {
            let mut records = self.write_records();
            let before = records.len();
            records.retain(|record| record.id != id);
            records.len() < before
        };

        debug!(
            "event=record_delete module=store store={} status={} id={}",
            self.name(),
            if removed { "ok" } else { "not_found" },
            id
        );
        if removed {
            self.emit();
        }
        removed
    }

    /// Empties the store. Always notifies.
    pub fn clear(&self) {
        let dropped = {
            let mut records = self.write_records();
            let dropped = records.len();
            records.clear();
            dropped
        };
        info!(
            "event=store_clear module=store store={} status=ok dropped={}",
            self.name(),
            dropped
        );
        self.emit();
    }

    /// Replaces the whole record list with the JSON array in `json`.
    ///
    /// Returns the number of imported records.
    ///
    /// # Errors
    /// - `MalformedImport` for invalid JSON, a non-array top-level value,
    ///   undecodable records, or duplicate ids. State is left untouched and
    ///   the failure is logged.
    pub fn import_json(&self, json: &str) -> StoreResult<usize> {
        match parse_records::<P>(json) {
            Ok(records) => Ok(self.replace_all(records, "json")),
            Err(err) => {
                warn!(
                    "event=store_import module=store store={} status=error source=json error={}",
                    self.name(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Replaces state with whatever `adapter` loads.
    ///
    /// # Errors
    /// - Adapter errors are returned unchanged; state is left untouched.
    /// - `MalformedImport` when the loaded records contain duplicate ids.
    pub fn load_from<A>(&self, adapter: &A) -> StoreResult<usize>
    where
        A: PersistenceAdapter<P> + ?Sized,
    {
        let loaded = adapter.load().and_then(|records| {
            ensure_unique_ids(&records)?;
            Ok(records)
        });
        match loaded {
            Ok(records) => Ok(self.replace_all(records, "adapter")),
            Err(err) => {
                warn!(
                    "event=store_import module=store store={} status=error source=adapter error={}",
                    self.name(),
                    err
                );
                Err(err)
            }
        }
    }

    fn replace_all(&self, records: Vec<Record<P>>, source: &str) -> usize {
        let count = records.len();
        *self.write_records() = records;
        info!(
            "event=store_import module=store store={} status=ok source={} count={}",
            self.name(),
            source,
            count
        );
        self.emit();
        count
    }

    // Subscriptions

    pub fn subscribe(&self, listener: Listener) -> Subscription {
        self.registry.subscribe(listener)
    }

    /// Convenience wrapper around `subscribe` for plain closures.
    pub fn subscribe_fn<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.registry.subscribe(Arc::new(listener))
    }

    pub fn listener_count(&self) -> usize {
        self.registry.len()
    }

    // Queries

    /// All records, most recent first. Ties keep their stored order.
    pub fn get_all(&self) -> Vec<Record<P>> {
        let mut records = self.read_records().clone();
        sort_newest_first(&mut records);
        records
    }

    pub fn get_by_id(&self, id: &str) -> Option<Record<P>> {
        self.read_records()
            .iter()
            .find(|record| record.id == id)
            .cloned()
    }

    /// Records whose `owner_refs` contains `owner`, most recent first.
    pub fn get_by_owner_ref(&self, owner: &str) -> Vec<Record<P>> {
        self.filter(|record| record.references(owner))
    }

    /// Same record as `get_all()[0]`, without copying the rest.
    pub fn get_latest(&self) -> Option<Record<P>> {
        let records = self.read_records();
        let mut latest: Option<&Record<P>> = None;
        for record in records.iter() {
            match latest {
                Some(best) if best.created_at >= record.created_at => {}
                _ => latest = Some(record),
            }
        }
        latest.cloned()
    }

    /// Records matching `predicate`, most recent first.
    pub fn filter<F>(&self, predicate: F) -> Vec<Record<P>>
    where
        F: Fn(&Record<P>) -> bool,
    {
        let mut matched: Vec<Record<P>> = self
            .read_records()
            .iter()
            .filter(|record| predicate(*record))
            .cloned()
            .collect();
        sort_newest_first(&mut matched);
        matched
    }

    /// Filtered, paged view. Paging applies after newest-first ordering.
    pub fn list(&self, query: &RecordQuery) -> Vec<Record<P>> {
        let matched = self.filter(|record| query.matches(record));
        let skipped = matched.into_iter().skip(query.offset as usize);
        match normalize_limit(query.limit) {
            Some(limit) => skipped.take(limit as usize).collect(),
            None => skipped.collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.read_records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_records().is_empty()
    }

    /// Number of records matching `predicate`, or all records for `None`.
    pub fn count(&self, predicate: Option<&dyn Fn(&Record<P>) -> bool>) -> usize {
        match predicate {
            Some(predicate) => self.count_where(predicate),
            None => self.len(),
        }
    }

    /// Number of records matching `predicate`.
    pub fn count_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&Record<P>) -> bool,
    {
        self.read_records()
            .iter()
            .filter(|record| predicate(*record))
            .count()
    }

    /// Number of records referencing each owner. A record listing the same
    /// owner twice counts once for it.
    pub fn count_by_owner_ref(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in self.read_records().iter() {
            let owners: BTreeSet<&str> = record.owner_refs.iter().map(String::as_str).collect();
            for owner in owners {
                *counts.entry(owner.to_string()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Serializes the record list in stored order.
    pub fn export_json(&self) -> StoreResult<String> {
        serde_json::to_string(&*self.read_records()).map_err(StoreError::Serialize)
    }

    /// Writes the newest-first snapshot through `adapter`.
    pub fn save_to<A>(&self, adapter: &A) -> StoreResult<()>
    where
        A: PersistenceAdapter<P> + ?Sized,
    {
        let snapshot = self.get_all();
        adapter.save(&snapshot)?;
        debug!(
            "event=store_save module=store store={} status=ok count={}",
            self.name(),
            snapshot.len()
        );
        Ok(())
    }

    // Internals

    fn fresh_id(&self, records: &[Record<P>]) -> RecordId {
        loop {
            let id = self.ids.next_id();
            if !records.iter().any(|record| record.id == id) {
                return id;
            }
        }
    }

    fn emit(&self) {
        self.registry.emit_change(self.name());
    }

    fn read_records(&self) -> RwLockReadGuard<'_, Vec<Record<P>>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_records(&self) -> RwLockWriteGuard<'_, Vec<Record<P>>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Decodes a JSON array of records, rejecting anything else.
pub(crate) fn parse_records<P: Payload>(json: &str) -> StoreResult<Vec<Record<P>>> {
    let value: Value = serde_json::from_str(json)
        .map_err(|err| StoreError::MalformedImport(format!("invalid json: {err}")))?;
    if !value.is_array() {
        return Err(StoreError::MalformedImport(
            "top-level value must be an array".to_string(),
        ));
    }
    let records: Vec<Record<P>> = serde_json::from_value(value)
        .map_err(|err| StoreError::MalformedImport(format!("invalid record: {err}")))?;
    ensure_unique_ids(&records)?;
    Ok(records)
}

fn ensure_unique_ids<P>(records: &[Record<P>]) -> StoreResult<()> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.id.as_str()) {
            return Err(StoreError::MalformedImport(format!(
                "duplicate record id `{}`",
                record.id
            )));
        }
    }
    Ok(())
}
