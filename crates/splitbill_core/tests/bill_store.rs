use splitbill_core::{
    load_bill, Bill, BillItem, BillStore, KeyValueStore, MemoryKeyValueStore, Person, Share,
    StorageError, StorageResult, StoreEvent, BILL_STORAGE_KEY,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

fn alice() -> Person {
    Person::with_id("1", "Alice")
}

fn bob() -> Person {
    Person::with_id("2", "Bob")
}

fn shared_item(id: &str, price: f64, shares: &[(&str, u8)]) -> BillItem {
    BillItem::with_id(
        id,
        id,
        price,
        shares
            .iter()
            .map(|(person_id, percentage)| Share::new(*person_id, *percentage))
            .collect(),
    )
}

fn loaded_store(kv: &MemoryKeyValueStore) -> BillStore<&MemoryKeyValueStore> {
    BillStore::open(kv)
}

/// Key-value slot whose writes always fail.
struct ReadOnlyStore;

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
        let encode_failure = serde_json::from_str::<u8>("read-only").unwrap_err();
        Err(StorageError::Encode(encode_failure))
    }

    fn remove(&self, _key: &str) -> StorageResult<bool> {
        Ok(false)
    }
}

/// Wraps a slot whose next read fails with a database error.
struct FailingReadStore<'a> {
    inner: &'a MemoryKeyValueStore,
    fail_next_get: Cell<bool>,
}

impl<'a> FailingReadStore<'a> {
    fn new(inner: &'a MemoryKeyValueStore) -> Self {
        Self {
            inner,
            fail_next_get: Cell::new(true),
        }
    }
}

impl KeyValueStore for FailingReadStore<'_> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        if self.fail_next_get.replace(false) {
            return Err(StorageError::from(rusqlite::Error::QueryReturnedNoRows));
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<bool> {
        self.inner.remove(key)
    }
}

#[test]
fn add_person_appends_without_name_uniqueness() {
    let kv = MemoryKeyValueStore::new();
    let mut store = loaded_store(&kv);

    store.add_person(alice());
    store.add_person(Person::with_id("3", "Alice"));

    let names: Vec<&str> = store
        .bill()
        .people
        .iter()
        .map(|person| person.name.as_str())
        .collect();
    assert_eq!(names, vec!["Alice", "Alice"]);
}

#[test]
fn edit_person_replaces_by_id_and_ignores_unknown_ids() {
    let kv = MemoryKeyValueStore::new();
    let mut store = loaded_store(&kv);
    store.add_person(alice());
    store.add_person(bob());
    let bob_before = Arc::clone(&store.bill().people[1]);

    store.edit_person(Person::with_id("1", "Alicia"));
    assert_eq!(store.bill().people[0].name, "Alicia");
    assert!(Arc::ptr_eq(&bob_before, &store.bill().people[1]));

    let before = store.bill().clone();
    store.edit_person(Person::with_id("404", "Ghost"));
    assert_eq!(store.bill(), &before);
}

#[test]
fn delete_person_cascades_to_shares_without_rebalancing() {
    let kv = MemoryKeyValueStore::new();
    let mut store = loaded_store(&kv);
    store.add_person(alice());
    store.add_person(bob());
    store.add_item(shared_item("dinner", 10.0, &[("1", 70), ("2", 30)]));
    store.add_item(shared_item("coffee", 4.0, &[("1", 100)]));
    let coffee_before = Arc::clone(&store.bill().items[1]);
    let alice_before = Arc::clone(&store.bill().people[0]);

    store.delete_person("2");

    let bill = store.bill();
    assert_eq!(bill.people.len(), 1);
    assert!(Arc::ptr_eq(&alice_before, &bill.people[0]));
    assert_eq!(bill.items[0].shared_by, vec![Share::new("1", 70)]);
    assert_eq!(bill.items[0].allocated_percentage(), 70);
    assert!(Arc::ptr_eq(&coffee_before, &bill.items[1]));
    assert!(bill.dangling_person_ids().is_empty());
    assert_eq!(bill.under_allocated_item_ids(), vec!["dinner".to_string()]);
}

#[test]
fn item_edit_and_delete_touch_only_the_target() {
    let kv = MemoryKeyValueStore::new();
    let mut store = loaded_store(&kv);
    store.add_person(alice());
    store.add_item(shared_item("a", 1.0, &[("1", 100)]));
    store.add_item(shared_item("b", 2.0, &[("1", 100)]));
    let b_before = Arc::clone(&store.bill().items[1]);

    let renamed = store.bill().items[0].renamed("Apple");
    store.edit_item(renamed);
    assert_eq!(store.bill().items[0].name, "Apple");
    assert!(Arc::ptr_eq(&b_before, &store.bill().items[1]));

    store.delete_item("a");
    assert_eq!(store.bill().items.len(), 1);
    assert!(Arc::ptr_eq(&b_before, &store.bill().items[0]));
    assert_eq!(store.bill().people.len(), 1);

    store.delete_item("missing");
    assert_eq!(store.bill().items.len(), 1);
}

#[test]
fn add_item_does_not_validate() {
    let kv = MemoryKeyValueStore::new();
    let mut store = loaded_store(&kv);

    store.add_item(shared_item("odd", 5.0, &[("1", 40)]));
    assert_eq!(store.bill().items.len(), 1);
}

#[test]
fn every_mutation_writes_whole_bill_through() {
    let kv = MemoryKeyValueStore::new();
    let mut store = loaded_store(&kv);

    store.add_person(alice());
    assert_eq!(load_bill(&kv).unwrap(), *store.bill());

    store.add_item(shared_item("x", 9.0, &[("1", 100)]));
    assert_eq!(load_bill(&kv).unwrap(), *store.bill());

    store.delete_person("1");
    let persisted = load_bill(&kv).unwrap();
    assert!(persisted.people.is_empty());
    assert!(persisted.items[0].shared_by.is_empty());
}

#[test]
fn nothing_is_written_before_load() {
    let kv = MemoryKeyValueStore::new();
    kv.set(
        BILL_STORAGE_KEY,
        r#"{"items":[],"people":[{"id":"1","name":"Alice"}]}"#,
    )
    .unwrap();

    let mut store = BillStore::new(&kv);
    store.add_person(bob());
    assert!(!store.is_loaded());

    let persisted = load_bill(&kv).unwrap();
    assert_eq!(persisted.people.len(), 1);
    assert_eq!(persisted.people[0].name, "Alice");
}

#[test]
fn corrupt_state_recovers_to_empty_with_warning() {
    let kv = MemoryKeyValueStore::new();
    kv.set(BILL_STORAGE_KEY, "definitely not json").unwrap();

    let mut store = BillStore::open(&kv);
    assert!(store.is_loaded());
    assert_eq!(store.bill(), &Bill::new());
    assert!(store.load_warning().unwrap().contains("corrupt"));

    store.add_person(alice());
    assert_eq!(load_bill(&kv).unwrap().people.len(), 1);
}

#[test]
fn unreadable_slot_never_overwrites_saved_bill() {
    let kv = MemoryKeyValueStore::new();
    kv.set(
        BILL_STORAGE_KEY,
        r#"{"items":[],"people":[{"id":"1","name":"Alice"},{"id":"2","name":"Bob"}]}"#,
    )
    .unwrap();

    let mut store = BillStore::open(FailingReadStore::new(&kv));
    assert!(store.is_loaded());
    assert!(store.is_read_only());
    assert!(store.load_warning().is_some());
    assert!(store.bill().is_empty());

    store.add_person(Person::with_id("3", "Carol"));
    store.delete_item("anything");
    assert_eq!(store.bill().people.len(), 1);

    let ids: Vec<String> = load_bill(&kv)
        .unwrap()
        .people
        .iter()
        .map(|person| person.id.clone())
        .collect();
    assert_eq!(ids, vec!["1", "2"]);

    let reopened = BillStore::open(&kv);
    assert!(!reopened.is_read_only());
    assert_eq!(reopened.bill().people.len(), 2);
}

#[test]
fn corrupt_state_is_not_read_only() {
    let kv = MemoryKeyValueStore::new();
    kv.set(BILL_STORAGE_KEY, "[").unwrap();
    assert!(!BillStore::open(&kv).is_read_only());
}

#[test]
fn failed_write_keeps_in_memory_state() {
    let mut store = BillStore::open(ReadOnlyStore);
    store.add_person(alice());

    assert_eq!(store.bill().people.len(), 1);
    assert!(matches!(
        store.last_persist_error(),
        Some(StorageError::Encode(_))
    ));
}

#[test]
fn subscribers_are_notified_in_order_after_each_change() {
    let kv = MemoryKeyValueStore::new();
    let mut store = BillStore::new(&kv);
    let log = Rc::new(RefCell::new(Vec::new()));

    let first = Rc::clone(&log);
    store.subscribe(move |event, _| first.borrow_mut().push(format!("a:{}", event.as_str())));
    let second = Rc::clone(&log);
    store.subscribe(move |event, bill| {
        second
            .borrow_mut()
            .push(format!("b:{}:{}", event.as_str(), bill.people.len()))
    });

    store.load();
    store.add_person(alice());
    store.delete_person("1");

    assert_eq!(
        *log.borrow(),
        vec![
            "a:bill_loaded",
            "b:bill_loaded:0",
            "a:person_add",
            "b:person_add:1",
            "a:person_delete",
            "b:person_delete:0",
        ]
    );
}

#[test]
fn subscriber_sees_post_mutation_state() {
    let kv = MemoryKeyValueStore::new();
    let mut store = loaded_store(&kv);
    let seen = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&seen);
    store.subscribe(move |event, bill| {
        if let StoreEvent::ItemAdded(id) = event {
            *sink.borrow_mut() = bill.item(id).map(|item| item.price);
        }
    });

    store.add_item(shared_item("cake", 12.5, &[("1", 100)]));
    assert_eq!(*seen.borrow(), Some(12.5));
}
