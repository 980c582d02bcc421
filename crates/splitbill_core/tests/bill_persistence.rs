use splitbill_core::db::{open_db, open_db_in_memory};
use splitbill_core::{
    load_bill, save_bill, Bill, BillItem, BillStore, KeyValueStore, Person, Share,
    SqliteKeyValueStore, StorageError, BILL_STORAGE_KEY,
};

fn sample_bill() -> Bill {
    Bill::new()
        .with_person_added(Person::with_id("1", "Alice"))
        .with_person_added(Person::with_id("2", "Bob"))
        .with_item_added(BillItem::with_id(
            "pizza",
            "Pizza",
            20.0,
            vec![Share::new("1", 50), Share::new("2", 50)],
        ))
        .with_item_added(BillItem::with_id(
            "soda",
            "Soda",
            3.25,
            vec![Share::new("2", 100)],
        ))
}

#[test]
fn sqlite_kv_set_get_remove() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKeyValueStore::new(&conn);

    assert_eq!(kv.get("missing").unwrap(), None);
    kv.set("k", "v1").unwrap();
    kv.set("k", "v2").unwrap();
    assert_eq!(kv.get("k").unwrap().as_deref(), Some("v2"));

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_store;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);

    assert!(kv.remove("k").unwrap());
    assert_eq!(kv.get("k").unwrap(), None);
}

#[test]
fn save_then_load_reproduces_equal_bill() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKeyValueStore::new(&conn);
    let bill = sample_bill();

    save_bill(&kv, &bill).unwrap();
    let loaded = load_bill(&kv).unwrap();

    assert_eq!(loaded, bill);
    let order: Vec<&str> = loaded.items.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(order, vec!["pizza", "soda"]);
}

#[test]
fn full_precision_prices_survive_save_and_load() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKeyValueStore::new(&conn);
    let prices = [
        54.781751339831196,
        0.1 + 0.2,
        37.000000000000007,
        73.99999999999999,
        10.0 / 3.0,
    ];
    let bill = prices
        .iter()
        .enumerate()
        .fold(Bill::new(), |bill, (index, price)| {
            bill.with_item_added(BillItem::with_id(
                format!("item-{index}"),
                "Item",
                *price,
                Vec::new(),
            ))
        });

    save_bill(&kv, &bill).unwrap();
    let loaded = load_bill(&kv).unwrap();

    assert_eq!(loaded, bill);
    for (item, price) in loaded.items.iter().zip(prices) {
        assert_eq!(item.price.to_bits(), price.to_bits());
    }
}

#[test]
fn loads_json_written_by_browser_build() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKeyValueStore::new(&conn);
    kv.set(
        BILL_STORAGE_KEY,
        r#"{"items":[{"id":"1700000000001","name":"Pizza","price":20,"sharedBy":[{"personId":"1","percentage":50},{"personId":"2","percentage":50}]}],"people":[{"id":"1","name":"Alice"},{"id":"2","name":"Bob"}]}"#,
    )
    .unwrap();

    let bill = load_bill(&kv).unwrap();
    assert_eq!(bill.people.len(), 2);
    assert_eq!(bill.items[0].price, 20.0);
    assert_eq!(bill.items[0].shared_by[1], Share::new("2", 50));
}

#[test]
fn corrupt_value_is_reported() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKeyValueStore::new(&conn);
    kv.set(BILL_STORAGE_KEY, r#"{"items": "nope"}"#).unwrap();

    let err = load_bill(&kv).unwrap_err();
    assert!(matches!(err, StorageError::Corrupt(_)));
    assert!(err.to_string().contains("corrupt"));
}

#[test]
fn store_state_survives_reopen_of_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bill.db");

    {
        let conn = open_db(&path).unwrap();
        let mut store = BillStore::open(SqliteKeyValueStore::new(&conn));
        store.add_person(Person::with_id("1", "Alice"));
        store.add_item(BillItem::with_id(
            "tea",
            "Tea",
            4.0,
            vec![Share::new("1", 100)],
        ));
    }

    let conn = open_db(&path).unwrap();
    let store = BillStore::open(SqliteKeyValueStore::new(&conn));
    assert_eq!(store.bill().people[0].name, "Alice");
    assert_eq!(store.bill().items[0].id, "tea");
    assert!(store.load_warning().is_none());
}
