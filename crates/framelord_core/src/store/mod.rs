//! Reactive in-memory record stores.
//!
//! # Responsibility
//! - Generate record ids, hold record lists, apply mutations, and fan out
//!   change notifications.
//! - Provide derived, copy-on-read query views.
//!
//! # Invariants
//! - Every store instance is explicit; nothing here is a process singleton.
//! - Missing records are reported through `Option`/`bool`, never errors.

pub mod error;
pub mod id;
pub mod query;
pub mod record_store;
pub mod subscription;

use crate::model::contact::Contact;
use crate::model::frame_scan::FrameScanReport;
use crate::model::note::Note;
use crate::model::want::Want;
use record_store::RecordStore;

pub type FrameScanStore = RecordStore<FrameScanReport>;
pub type NoteStore = RecordStore<Note>;
pub type WantStore = RecordStore<Want>;
pub type ContactStore = RecordStore<Contact>;
