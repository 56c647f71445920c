//! Record envelope and typed entity payloads.
//!
//! # Responsibility
//! - Define the generic `Record<P>` shape owned by stores.
//! - Define one closed, typed payload per entity kind so the store layer never
//!   handles untyped data.
//!
//! # Invariants
//! - Every record is identified by a store-assigned `RecordId`.
//! - Payload validation happens at construction time in services, never in
//!   the generic store.

pub mod contact;
pub mod frame_scan;
pub mod note;
pub mod payload;
pub mod record;
pub mod want;
