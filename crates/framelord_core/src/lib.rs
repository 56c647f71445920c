//! Core record stores for FrameLord.
//! Typed entity payloads, reactive in-memory stores, and their persistence.

pub mod db;
pub mod logging;
pub mod model;
pub mod persistence;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError, LoggingStatus};
pub use model::contact::{Contact, ContactPatch, ContactValidationError};
pub use model::frame_scan::{
    FrameScanDomain, FrameScanReport, FrameScanReportPatch, FrameScanValidationError,
};
pub use model::note::{
    normalize_tag, normalize_tags, Note, NotePatch, NoteSource, NoteValidationError,
};
pub use model::payload::Payload;
pub use model::record::{parse_timestamp, NewRecord, PatchFor, Record, RecordId, RecordPatch};
pub use model::want::{Want, WantPatch, WantStatus, WantValidationError};
pub use persistence::{
    autosave, JsonFilePersistence, MemoryPersistence, PersistenceAdapter, SqlitePersistence,
};
pub use service::frame_scan_service::{FrameScanService, RecordScanRequest};
pub use service::note_service::{
    derive_markdown_preview, MarkdownPreview, NoteService, NoteServiceError,
};
pub use service::want_service::{WantService, WantServiceError};
pub use store::error::{StoreError, StoreResult};
pub use store::id::IdGenerator;
pub use store::query::RecordQuery;
pub use store::record_store::RecordStore;
pub use store::subscription::{Listener, Subscription, SubscriptionRegistry};
pub use store::{ContactStore, FrameScanStore, NoteStore, WantStore};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
