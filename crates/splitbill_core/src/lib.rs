//! Core domain logic for SplitBill.
//! This crate is the single source of truth for bill invariants.

pub mod db;
pub mod form;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;

pub use form::item_form::ItemForm;
pub use form::person_form::PersonForm;
pub use form::{FieldErrors, FormError, FormField};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::bill::Bill;
pub use model::item::{BillItem, ItemId, ItemValidationError, Share};
pub use model::person::{Person, PersonId};
pub use repo::bill_repo::{load_bill, save_bill, BILL_STORAGE_KEY};
pub use repo::kv_repo::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError, StorageResult,
};
pub use service::bill_store::{BillStore, StoreEvent, SubscriptionId};
pub use service::split::{compute_split, format_amount, round_cents, Split};
pub use view::controller::{BillView, EditTarget, InlineEdit, Screen};
pub use view::summary::{render_text, BillSummary};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
