//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the durable key-value slot contract and its implementations.
//! - Keep the JSON serialization boundary of the bill aggregate in one place.
//!
//! # Invariants
//! - The bill aggregate is always read and written as one whole value.
//! - Storage APIs return semantic errors (`Corrupt`) in addition to DB
//!   transport errors.

pub mod bill_repo;
pub mod kv_repo;
