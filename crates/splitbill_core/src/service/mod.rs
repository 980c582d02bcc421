//! Core use-case services.
//!
//! # Responsibility
//! - Own authoritative bill state and its persistence side effect.
//! - Derive the per-person split from a bill snapshot.
//!
//! # See also
//! - `crate::repo` for the storage boundary.

pub mod bill_store;
pub mod split;
