//! Use-case services over entity stores.
//!
//! # Responsibility
//! - Validate typed payloads before they reach a store.
//! - Keep entity rules (tags, previews, score ranges) out of the generic
//!   store layer.

pub mod frame_scan_service;
pub mod note_service;
pub mod want_service;
