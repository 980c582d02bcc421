//! Bill aggregate and its pure state transitions.
//!
//! # Responsibility
//! - Hold people and items as the single persisted root object.
//! - Provide the six transitions used by the store: add/replace/remove for
//!   people and items.
//!
//! # Invariants
//! - Every transition returns a new `Bill` and leaves `self` untouched.
//! - Entries not targeted by a transition keep their `Arc` identity.
//! - Removing a person cascades to share entries in every item; remaining
//!   percentages are never rebalanced.

use crate::model::item::{BillItem, ItemId};
use crate::model::person::{Person, PersonId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Root aggregate persisted and loaded as one unit.
///
/// Serialized field order is `items`, then `people`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub items: Vec<Arc<BillItem>>,
    pub people: Vec<Arc<Person>>,
}

impl Bill {
    /// Creates an empty bill.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.people.is_empty()
    }

    /// Looks up a person by id.
    pub fn person(&self, id: &str) -> Option<&Arc<Person>> {
        self.people.iter().find(|person| person.id == id)
    }

    /// Looks up an item by id.
    pub fn item(&self, id: &str) -> Option<&Arc<BillItem>> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Sum of all item prices.
    pub fn total(&self) -> f64 {
        self.items.iter().map(|item| item.price).sum()
    }

    /// Appends `person`. Names are not required to be unique.
    pub fn with_person_added(&self, person: Person) -> Self {
        let mut people = self.people.clone();
        people.push(Arc::new(person));
        Self {
            items: self.items.clone(),
            people,
        }
    }

    /// Replaces the person with the same id; no-op when absent.
    pub fn with_person_replaced(&self, updated: Person) -> Self {
        let updated = Arc::new(updated);
        Self {
            items: self.items.clone(),
            people: self
                .people
                .iter()
                .map(|person| {
                    if person.id == updated.id {
                        Arc::clone(&updated)
                    } else {
                        Arc::clone(person)
                    }
                })
                .collect(),
        }
    }

    /// Removes the person with `person_id` and all of their share entries.
    ///
    /// Items that never referenced the person are carried over by identity.
    pub fn without_person(&self, person_id: &str) -> Self {
        Self {
            items: self
                .items
                .iter()
                .map(|item| {
                    if item.is_shared_by(person_id) {
                        Arc::new(item.without_person(person_id))
                    } else {
                        Arc::clone(item)
                    }
                })
                .collect(),
            people: self
                .people
                .iter()
                .filter(|person| person.id != person_id)
                .cloned()
                .collect(),
        }
    }

    /// Appends `item` without validating it.
    pub fn with_item_added(&self, item: BillItem) -> Self {
        let mut items = self.items.clone();
        items.push(Arc::new(item));
        Self {
            items,
            people: self.people.clone(),
        }
    }

    /// Replaces the item with the same id; no-op when absent.
    pub fn with_item_replaced(&self, updated: BillItem) -> Self {
        let updated = Arc::new(updated);
        Self {
            items: self
                .items
                .iter()
                .map(|item| {
                    if item.id == updated.id {
                        Arc::clone(&updated)
                    } else {
                        Arc::clone(item)
                    }
                })
                .collect(),
            people: self.people.clone(),
        }
    }

    /// Removes the item with `item_id`; no-op when absent.
    pub fn without_item(&self, item_id: &str) -> Self {
        Self {
            items: self
                .items
                .iter()
                .filter(|item| item.id != item_id)
                .cloned()
                .collect(),
            people: self.people.clone(),
        }
    }

    /// Returns ids of people referenced by shares but missing from `people`.
    pub fn dangling_person_ids(&self) -> Vec<PersonId> {
        let mut dangling: Vec<PersonId> = Vec::new();
        for share in self.items.iter().flat_map(|item| item.shared_by.iter()) {
            if self.person(&share.person_id).is_none() && !dangling.contains(&share.person_id) {
                dangling.push(share.person_id.clone());
            }
        }
        dangling
    }

    /// Returns ids of items whose shares no longer total 100%.
    pub fn under_allocated_item_ids(&self) -> Vec<ItemId> {
        self.items
            .iter()
            .filter(|item| item.unallocated_amount() > 0.0)
            .map(|item| item.id.clone())
            .collect()
    }
}
