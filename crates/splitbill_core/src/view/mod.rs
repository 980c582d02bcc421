//! Presentation layer.
//!
//! # Responsibility
//! - Derive a render model (`BillSummary`) from the current bill.
//! - Drive user actions through forms and the store.
//!
//! # Invariants
//! - Nothing interactive is rendered before the persisted bill was read once.
//! - The view holds no bill state of its own; it re-derives from the store.

pub mod controller;
pub mod summary;
