//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose bill use cases (people, items, snapshot) to Dart via FRB.
//! - Run the same form validation the in-process view uses.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every call opens the DB, loads the bill, applies at most one mutation
//!   and writes the whole bill back.
//! - Validation failures never reach the store.

use log::warn;
use splitbill_core::db::open_db;
use splitbill_core::form::normalize_name;
use splitbill_core::{
    compute_split, core_version as core_version_inner, init_logging as init_logging_inner,
    ping as ping_inner, BillStore, FieldErrors, FormError, FormField, ItemForm, PersonForm,
    SqliteKeyValueStore,
};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const BILL_DB_FILE_NAME: &str = "splitbill.sqlite3";
static BILL_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Validation message attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrorItem {
    /// Field name (`name|price|shares`).
    pub field: String,
    pub message: String,
}

/// Generic action response envelope for bill mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the mutation was applied and persisted.
    pub ok: bool,
    /// Id of the created or targeted entity.
    pub id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
    /// Per-field validation messages; empty unless validation failed.
    pub field_errors: Vec<FieldErrorItem>,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: String) -> Self {
        Self {
            ok: true,
            id: Some(id),
            message: message.into(),
            field_errors: Vec::new(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
            field_errors: Vec::new(),
        }
    }

    fn invalid(errors: Vec<FieldErrorItem>) -> Self {
        Self {
            ok: false,
            id: None,
            message: "Validation failed.".to_string(),
            field_errors: errors,
        }
    }
}

/// Pending share entered for a new item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareInput {
    pub person_id: String,
    /// Raw percentage box text; parsed like the in-app number input.
    pub percentage: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonEntry {
    pub person_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareEntry {
    pub person_id: String,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemEntry {
    pub item_id: String,
    pub name: String,
    pub price: f64,
    pub shares: Vec<ShareEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitEntry {
    pub person_id: String,
    /// Unrounded owed amount.
    pub amount: f64,
}

/// Full bill state plus the derived split.
#[derive(Debug, Clone, PartialEq)]
pub struct BillSnapshotResponse {
    pub ok: bool,
    pub people: Vec<PersonEntry>,
    pub items: Vec<ItemEntry>,
    /// One entry per person, in people order.
    pub split: Vec<SplitEntry>,
    pub total: f64,
    /// Price portion no existing person covers.
    pub unallocated: f64,
    /// Load or recovery diagnostics; empty when the bill read cleanly.
    pub message: String,
}

/// Reads the persisted bill and its split.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Corrupt persisted state yields an empty bill with a message.
/// - An unreadable bill yields `ok = false`; mutations are refused until a
///   later call reads it successfully.
#[flutter_rust_bridge::frb(sync)]
pub fn bill_snapshot() -> BillSnapshotResponse {
    bill_snapshot_at(&resolve_bill_db_path())
}

/// Adds a person after name validation.
#[flutter_rust_bridge::frb(sync)]
pub fn person_add(name: String) -> ActionResponse {
    person_add_at(&resolve_bill_db_path(), name)
}

/// Renames a person; blank names are rejected.
#[flutter_rust_bridge::frb(sync)]
pub fn person_rename(person_id: String, name: String) -> ActionResponse {
    person_rename_at(&resolve_bill_db_path(), person_id, name)
}

/// Deletes a person and removes their shares from every item.
#[flutter_rust_bridge::frb(sync)]
pub fn person_delete(person_id: String) -> ActionResponse {
    person_delete_at(&resolve_bill_db_path(), person_id)
}

/// Adds an item after name, price and percentage validation.
///
/// Shares naming unknown people are dropped before validation.
#[flutter_rust_bridge::frb(sync)]
pub fn item_add(name: String, price: String, shares: Vec<ShareInput>) -> ActionResponse {
    item_add_at(&resolve_bill_db_path(), name, price, shares)
}

/// Renames an item; blank names are rejected.
#[flutter_rust_bridge::frb(sync)]
pub fn item_rename(item_id: String, name: String) -> ActionResponse {
    item_rename_at(&resolve_bill_db_path(), item_id, name)
}

/// Deletes an item.
#[flutter_rust_bridge::frb(sync)]
pub fn item_delete(item_id: String) -> ActionResponse {
    item_delete_at(&resolve_bill_db_path(), item_id)
}

fn bill_snapshot_at(db_path: &Path) -> BillSnapshotResponse {
    let result = with_bill_store(db_path, |store| {
        let bill = store.bill();
        let split = compute_split(bill);
        BillSnapshotResponse {
            ok: !store.is_read_only(),
            people: bill
                .people
                .iter()
                .map(|person| PersonEntry {
                    person_id: person.id.clone(),
                    name: person.name.clone(),
                })
                .collect(),
            items: bill
                .items
                .iter()
                .map(|item| ItemEntry {
                    item_id: item.id.clone(),
                    name: item.name.clone(),
                    price: item.price,
                    shares: item
                        .shared_by
                        .iter()
                        .map(|share| ShareEntry {
                            person_id: share.person_id.clone(),
                            percentage: u32::from(share.percentage),
                        })
                        .collect(),
                })
                .collect(),
            split: split
                .iter()
                .map(|(person_id, amount)| SplitEntry {
                    person_id: person_id.to_string(),
                    amount,
                })
                .collect(),
            total: bill.total(),
            unallocated: split.unallocated(),
            message: store.load_warning().unwrap_or_default().to_string(),
        }
    });

    result.unwrap_or_else(|err| BillSnapshotResponse {
        ok: false,
        people: Vec::new(),
        items: Vec::new(),
        split: Vec::new(),
        total: 0.0,
        unallocated: 0.0,
        message: format!("bill_snapshot failed: {err}"),
    })
}

fn person_add_at(db_path: &Path, name: String) -> ActionResponse {
    let mut form = PersonForm::new();
    form.set_name(name);
    let person = match form.submit() {
        Ok(person) => person,
        Err(err) => return ActionResponse::invalid(vec![field_error(FormField::Name, err)]),
    };

    let person_id = person.id.clone();
    match mutate_bill(db_path, "person_add", |store| store.add_person(person)) {
        Ok(()) => ActionResponse::success("Person added.", person_id),
        Err(err) => ActionResponse::failure(format!("person_add failed: {err}")),
    }
}

fn person_rename_at(db_path: &Path, person_id: String, name: String) -> ActionResponse {
    let name = match normalize_name(&name) {
        Ok(name) => name,
        Err(err) => return ActionResponse::invalid(vec![field_error(FormField::Name, err)]),
    };

    let result = mutate_bill(db_path, "person_rename", |store| {
        let renamed = store.bill().person(&person_id).map(|person| person.renamed(name));
        match renamed {
            Some(renamed) => {
                store.edit_person(renamed);
                true
            }
            None => false,
        }
    });
    match result {
        Ok(true) => ActionResponse::success("Person renamed.", person_id),
        Ok(false) => ActionResponse::failure(format!("person `{person_id}` not found")),
        Err(err) => ActionResponse::failure(format!("person_rename failed: {err}")),
    }
}

fn person_delete_at(db_path: &Path, person_id: String) -> ActionResponse {
    match mutate_bill(db_path, "person_delete", |store| {
        store.delete_person(&person_id)
    }) {
        Ok(()) => ActionResponse::success("Person deleted.", person_id),
        Err(err) => ActionResponse::failure(format!("person_delete failed: {err}")),
    }
}

fn item_add_at(
    db_path: &Path,
    name: String,
    price: String,
    shares: Vec<ShareInput>,
) -> ActionResponse {
    let mut form = ItemForm::new();
    form.set_name(name);
    form.set_price(price);
    for share in &shares {
        form.set_share(&share.person_id, &share.percentage);
    }

    let result = mutate_bill(db_path, "item_add", |store| {
        form.retain_people(&store.bill().people);
        let item = form.submit()?;
        let item_id = item.id.clone();
        store.add_item(item);
        Ok::<_, FieldErrors>(item_id)
    });
    match result {
        Ok(Ok(item_id)) => ActionResponse::success("Item added.", item_id),
        Ok(Err(errors)) => ActionResponse::invalid(
            errors
                .iter()
                .map(|(field, err)| field_error(field, err))
                .collect(),
        ),
        Err(err) => ActionResponse::failure(format!("item_add failed: {err}")),
    }
}

fn item_rename_at(db_path: &Path, item_id: String, name: String) -> ActionResponse {
    let name = match normalize_name(&name) {
        Ok(name) => name,
        Err(err) => return ActionResponse::invalid(vec![field_error(FormField::Name, err)]),
    };

    let result = mutate_bill(db_path, "item_rename", |store| {
        let renamed = store.bill().item(&item_id).map(|item| item.renamed(name));
        match renamed {
            Some(renamed) => {
                store.edit_item(renamed);
                true
            }
            None => false,
        }
    });
    match result {
        Ok(true) => ActionResponse::success("Item renamed.", item_id),
        Ok(false) => ActionResponse::failure(format!("item `{item_id}` not found")),
        Err(err) => ActionResponse::failure(format!("item_rename failed: {err}")),
    }
}

fn item_delete_at(db_path: &Path, item_id: String) -> ActionResponse {
    match mutate_bill(db_path, "item_delete", |store| store.delete_item(&item_id)) {
        Ok(()) => ActionResponse::success("Item deleted.", item_id),
        Err(err) => ActionResponse::failure(format!("item_delete failed: {err}")),
    }
}

fn field_error(field: FormField, err: FormError) -> FieldErrorItem {
    FieldErrorItem {
        field: field.as_str().to_string(),
        message: err.to_string(),
    }
}

fn resolve_bill_db_path() -> PathBuf {
    BILL_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("SPLITBILL_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(BILL_DB_FILE_NAME)
        })
        .clone()
}

fn with_bill_store<T>(
    db_path: &Path,
    f: impl FnOnce(&mut BillStore<SqliteKeyValueStore<'_>>) -> T,
) -> Result<T, String> {
    let conn = open_db(db_path).map_err(|err| format!("bill DB open failed: {err}"))?;
    let mut store = BillStore::open(SqliteKeyValueStore::new(&conn));
    Ok(f(&mut store))
}

/// Runs one mutation and reports a failed write-through as an error.
fn mutate_bill<T>(
    db_path: &Path,
    op: &'static str,
    f: impl FnOnce(&mut BillStore<SqliteKeyValueStore<'_>>) -> T,
) -> Result<T, String> {
    with_bill_store(db_path, |store| {
        if store.is_read_only() {
            warn!("event=ffi_call module=ffi status=error op={op} error_code=bill_read_failed");
            return Err(format!(
                "bill read failed: {}",
                store.load_warning().unwrap_or_default()
            ));
        }
        let value = f(store);
        match store.last_persist_error() {
            Some(err) => {
                warn!("event=ffi_call module=ffi status=error op={op} error_code=persist_failed");
                Err(format!("bill write failed: {err}"))
            }
            None => Ok(value),
        }
    })?
}
