//! Authoritative in-memory bill state with write-through persistence.
//!
//! # Responsibility
//! - Own the current `Bill` and expose the five mutation use-cases.
//! - Write the whole aggregate through to the key-value slot after each
//!   mutation once the persisted state has been read.
//! - Notify subscribers after every state change.
//!
//! # Invariants
//! - Mutations are synchronous and total; observers never see a partial state.
//! - Nothing is written before `load()` completed, so an empty startup state
//!   cannot overwrite persisted data.
//! - A failed write never rolls back the in-memory state.
//! - When the slot could not be read, nothing is ever written back, so the
//!   saved bill survives until a later load succeeds.
//! - Subscribers are notified in registration order.

use crate::model::bill::Bill;
use crate::model::item::{BillItem, ItemId};
use crate::model::person::{Person, PersonId};
use crate::repo::bill_repo::{load_bill, save_bill};
use crate::repo::kv_repo::{KeyValueStore, StorageError};
use log::{error, info, warn};

/// Handle returned by [`BillStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Change notification emitted after each state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// Persisted state was read (or recovered to empty).
    Loaded,
    PersonAdded(PersonId),
    PersonEdited(PersonId),
    /// Emitted once per delete, including the share cascade.
    PersonDeleted(PersonId),
    ItemAdded(ItemId),
    ItemEdited(ItemId),
    ItemDeleted(ItemId),
}

impl StoreEvent {
    /// Stable event name used in log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loaded => "bill_loaded",
            Self::PersonAdded(_) => "person_add",
            Self::PersonEdited(_) => "person_edit",
            Self::PersonDeleted(_) => "person_delete",
            Self::ItemAdded(_) => "item_add",
            Self::ItemEdited(_) => "item_edit",
            Self::ItemDeleted(_) => "item_delete",
        }
    }
}

type Subscriber = Box<dyn FnMut(&StoreEvent, &Bill)>;

/// Bill store over a durable key-value slot.
pub struct BillStore<K: KeyValueStore> {
    kv: K,
    bill: Bill,
    loaded: bool,
    read_failed: bool,
    load_warning: Option<String>,
    last_persist_error: Option<StorageError>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl<K: KeyValueStore> BillStore<K> {
    /// Creates an unloaded store holding an empty bill.
    pub fn new(kv: K) -> Self {
        Self {
            kv,
            bill: Bill::new(),
            loaded: false,
            read_failed: false,
            load_warning: None,
            last_persist_error: None,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Creates a store and immediately reads the persisted bill.
    pub fn open(kv: K) -> Self {
        let mut store = Self::new(kv);
        store.load();
        store
    }

    /// Reads the persisted bill once.
    ///
    /// Corrupt state falls back to an empty bill that later mutations
    /// overwrite. An unreadable slot also yields an empty bill, but the store
    /// turns read-only (see [`BillStore::is_read_only`]). The reason is kept in
    /// [`BillStore::load_warning`]. Repeated calls are no-ops.
    pub fn load(&mut self) -> &Bill {
        if self.loaded {
            return &self.bill;
        }

        self.bill = match load_bill(&self.kv) {
            Ok(bill) => {
                info!(
                    "event=bill_load module=store status=ok people={} items={}",
                    bill.people.len(),
                    bill.items.len()
                );
                bill
            }
            Err(err @ StorageError::Corrupt(_)) => {
                warn!(
                    "event=bill_load module=store status=recovered error_code=bill_corrupt error={}",
                    err
                );
                self.load_warning = Some(err.to_string());
                Bill::new()
            }
            Err(err) => {
                error!(
                    "event=bill_load module=store status=read_only error_code=bill_read_failed error={}",
                    err
                );
                self.load_warning = Some(err.to_string());
                self.read_failed = true;
                Bill::new()
            }
        };
        self.loaded = true;
        self.notify(&StoreEvent::Loaded);
        &self.bill
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether write-through is disabled because the persisted bill could not
    /// be read.
    pub fn is_read_only(&self) -> bool {
        self.read_failed
    }

    /// Current bill snapshot.
    pub fn bill(&self) -> &Bill {
        &self.bill
    }

    /// Reason the last load fell back to an empty bill, if it did.
    pub fn load_warning(&self) -> Option<&str> {
        self.load_warning.as_deref()
    }

    /// Error of the most recent failed write; cleared by the next good write.
    pub fn last_persist_error(&self) -> Option<&StorageError> {
        self.last_persist_error.as_ref()
    }

    /// Underlying key-value slot.
    pub fn storage(&self) -> &K {
        &self.kv
    }

    /// Registers a change callback.
    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&StoreEvent, &Bill) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Removes a callback. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(registered, _)| *registered != id);
        self.subscribers.len() != before
    }

    pub fn add_person(&mut self, person: Person) {
        let event = StoreEvent::PersonAdded(person.id.clone());
        let next = self.bill.with_person_added(person);
        self.commit(next, event);
    }

    /// Replaces the person with the same id; unknown ids leave people as-is.
    pub fn edit_person(&mut self, updated: Person) {
        let event = StoreEvent::PersonEdited(updated.id.clone());
        let next = self.bill.with_person_replaced(updated);
        self.commit(next, event);
    }

    /// Removes the person and their shares from every item.
    ///
    /// Remaining shares are not rebalanced, so affected items may total less
    /// than 100%.
    pub fn delete_person(&mut self, person_id: &str) {
        let next = self.bill.without_person(person_id);
        self.commit(next, StoreEvent::PersonDeleted(person_id.to_string()));
    }

    /// Appends an item. Callers validate shares beforehand.
    pub fn add_item(&mut self, item: BillItem) {
        let event = StoreEvent::ItemAdded(item.id.clone());
        let next = self.bill.with_item_added(item);
        self.commit(next, event);
    }

    pub fn edit_item(&mut self, updated: BillItem) {
        let event = StoreEvent::ItemEdited(updated.id.clone());
        let next = self.bill.with_item_replaced(updated);
        self.commit(next, event);
    }

    pub fn delete_item(&mut self, item_id: &str) {
        let next = self.bill.without_item(item_id);
        self.commit(next, StoreEvent::ItemDeleted(item_id.to_string()));
    }

    fn commit(&mut self, next: Bill, event: StoreEvent) {
        self.bill = next;
        info!(
            "event={} module=store status=ok people={} items={}",
            event.as_str(),
            self.bill.people.len(),
            self.bill.items.len()
        );

        if self.read_failed {
            warn!(
                "event=bill_save module=store status=skipped trigger={} error_code=bill_read_failed",
                event.as_str()
            );
        } else if self.loaded {
            match save_bill(&self.kv, &self.bill) {
                Ok(()) => self.last_persist_error = None,
                Err(err) => {
                    error!(
                        "event=bill_save module=store status=error trigger={} error={}",
                        event.as_str(),
                        err
                    );
                    self.last_persist_error = Some(err);
                }
            }
        }

        self.notify(&event);
    }

    fn notify(&mut self, event: &StoreEvent) {
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(event, &self.bill);
        }
    }
}
