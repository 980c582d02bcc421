//! Bill aggregate persistence over a key-value slot.
//!
//! # Responsibility
//! - Serialize the whole `Bill` as JSON under one fixed key.
//! - Decode persisted JSON back into a `Bill`.
//!
//! # Invariants
//! - A missing key decodes as an empty bill.
//! - Undecodable content is reported as `StorageError::Corrupt`, never masked
//!   here; recovery policy belongs to the store.
//! - Writes always replace the whole aggregate.

use crate::model::bill::Bill;
use crate::repo::kv_repo::{KeyValueStore, StorageError, StorageResult};
use log::debug;

/// Well-known key holding the persisted bill.
pub const BILL_STORAGE_KEY: &str = "splitthebill_data";

/// Loads the persisted bill, or an empty one when nothing was saved yet.
///
/// # Errors
/// - `StorageError::Db` when the slot cannot be read.
/// - `StorageError::Corrupt` when the stored value is not a valid bill.
pub fn load_bill(kv: &impl KeyValueStore) -> StorageResult<Bill> {
    let Some(raw) = kv.get(BILL_STORAGE_KEY)? else {
        debug!("event=bill_load module=repo status=ok source=empty");
        return Ok(Bill::new());
    };

    let bill: Bill = serde_json::from_str(&raw).map_err(StorageError::Corrupt)?;
    debug!(
        "event=bill_load module=repo status=ok source=stored people={} items={} bytes={}",
        bill.people.len(),
        bill.items.len(),
        raw.len()
    );
    Ok(bill)
}

/// Writes the whole bill under [`BILL_STORAGE_KEY`].
pub fn save_bill(kv: &impl KeyValueStore, bill: &Bill) -> StorageResult<()> {
    let encoded = serde_json::to_string(bill).map_err(StorageError::Encode)?;
    kv.set(BILL_STORAGE_KEY, &encoded)?;
    debug!(
        "event=bill_save module=repo status=ok people={} items={} bytes={}",
        bill.people.len(),
        bill.items.len(),
        encoded.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load_bill, save_bill, BILL_STORAGE_KEY};
    use crate::model::bill::Bill;
    use crate::model::item::{BillItem, Share};
    use crate::model::person::Person;
    use crate::repo::kv_repo::{KeyValueStore, MemoryKeyValueStore, StorageError};

    #[test]
    fn missing_key_loads_empty_bill() {
        let kv = MemoryKeyValueStore::new();
        assert_eq!(load_bill(&kv).unwrap(), Bill::new());
    }

    #[test]
    fn garbage_is_reported_as_corrupt() {
        let kv = MemoryKeyValueStore::new();
        kv.set(BILL_STORAGE_KEY, "{not json").unwrap();
        assert!(matches!(load_bill(&kv), Err(StorageError::Corrupt(_))));
    }

    #[test]
    fn save_uses_persisted_wire_names() {
        let kv = MemoryKeyValueStore::new();
        let bill = Bill::new()
            .with_person_added(Person::with_id("1", "Alice"))
            .with_item_added(BillItem::with_id(
                "i1",
                "Pizza",
                20.0,
                vec![Share::new("1", 100)],
            ));
        save_bill(&kv, &bill).unwrap();

        let raw = kv.get(BILL_STORAGE_KEY).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["people"][0]["name"], "Alice");
        assert_eq!(json["items"][0]["sharedBy"][0]["personId"], "1");
        assert_eq!(json["items"][0]["sharedBy"][0]["percentage"], 100);
        assert_eq!(json["items"][0]["price"], 20.0);
    }
}
