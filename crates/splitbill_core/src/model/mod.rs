//! Bill domain model.
//!
//! # Responsibility
//! - Define the canonical people/items/bill shapes shared by store, split
//!   calculator, forms and view.
//! - Provide pure state transitions over the `Bill` aggregate.
//!
//! # Invariants
//! - Every person and item is identified by a stable string id.
//! - Share entries reference `Person.id` by value; there is no inverse index.
//! - Transitions never mutate shared entries; untouched entries keep their
//!   `Arc` identity.

pub mod bill;
pub mod item;
pub mod person;
