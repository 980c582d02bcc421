//! Bill view controller.
//!
//! # Responsibility
//! - Gate rendering behind the initial load.
//! - Re-derive the summary after store change notifications.
//! - Translate user actions (form submit, inline edit, delete) into store
//!   mutations.
//!
//! # Invariants
//! - Subscribes to the store exactly once, on construction.
//! - Actions issued while loading are ignored.
//! - At most one inline edit is open; blur commits it, there is no cancel.
//! - A blank inline edit is discarded, keeping names non-empty.

use crate::form::item_form::ItemForm;
use crate::form::person_form::PersonForm;
use crate::form::{FieldErrors, FormError};
use crate::model::item::ItemId;
use crate::model::person::PersonId;
use crate::repo::kv_repo::KeyValueStore;
use crate::service::bill_store::{BillStore, SubscriptionId};
use crate::view::summary::BillSummary;
use log::debug;
use std::cell::Cell;
use std::rc::Rc;

/// What the view shows right now.
#[derive(Debug, PartialEq)]
pub enum Screen<'a> {
    /// Persisted state not read yet; show a placeholder.
    Loading,
    Ready(&'a BillSummary),
}

/// Entity targeted by an inline rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    Person(PersonId),
    Item(ItemId),
}

/// Open inline rename field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineEdit {
    pub target: EditTarget,
    /// Current text of the editable field.
    pub pending: String,
}

/// View controller owning the store, both forms and inline edit state.
pub struct BillView<K: KeyValueStore> {
    store: BillStore<K>,
    revision: Rc<Cell<u64>>,
    summary: Option<(u64, BillSummary)>,
    editing: Option<InlineEdit>,
    person_form: PersonForm,
    item_form: ItemForm,
    subscription: SubscriptionId,
}

impl<K: KeyValueStore> BillView<K> {
    /// Wraps `store` and subscribes to its change events.
    pub fn new(mut store: BillStore<K>) -> Self {
        let revision = Rc::new(Cell::new(0_u64));
        let observed = Rc::clone(&revision);
        let subscription = store.subscribe(move |event, _| {
            observed.set(observed.get() + 1);
            debug!(
                "event=view_invalidate module=view status=ok trigger={}",
                event.as_str()
            );
        });

        Self {
            store,
            revision,
            summary: None,
            editing: None,
            person_form: PersonForm::new(),
            item_form: ItemForm::new(),
            subscription,
        }
    }

    /// Reads persisted state; the view leaves `Loading` afterwards.
    pub fn load(&mut self) {
        self.store.load();
    }

    pub fn is_loading(&self) -> bool {
        !self.store.is_loaded()
    }

    /// Number of store changes observed so far.
    pub fn revision(&self) -> u64 {
        self.revision.get()
    }

    /// Current screen, re-deriving the summary when the store changed.
    pub fn screen(&mut self) -> Screen<'_> {
        if !self.store.is_loaded() {
            return Screen::Loading;
        }

        let revision = self.revision.get();
        let fresh = matches!(&self.summary, Some((rendered, _)) if *rendered == revision);
        if !fresh {
            self.summary = Some((revision, BillSummary::from_bill(self.store.bill())));
        }
        match &self.summary {
            Some((_, summary)) => Screen::Ready(summary),
            None => Screen::Loading,
        }
    }

    pub fn store(&self) -> &BillStore<K> {
        &self.store
    }

    /// Unsubscribes and returns the store.
    pub fn into_store(mut self) -> BillStore<K> {
        self.store.unsubscribe(self.subscription);
        self.store
    }

    pub fn person_form(&self) -> &PersonForm {
        &self.person_form
    }

    pub fn person_form_mut(&mut self) -> &mut PersonForm {
        &mut self.person_form
    }

    pub fn item_form(&self) -> &ItemForm {
        &self.item_form
    }

    pub fn item_form_mut(&mut self) -> &mut ItemForm {
        &mut self.item_form
    }

    /// Submits the person form.
    ///
    /// Returns the new person id, or `None` while loading.
    pub fn submit_person(&mut self) -> Result<Option<PersonId>, FormError> {
        if self.is_loading() {
            return Ok(None);
        }
        let person = self.person_form.submit()?;
        let id = person.id.clone();
        self.store.add_person(person);
        Ok(Some(id))
    }

    /// Submits the item form.
    ///
    /// Pending shares of people deleted meanwhile are dropped first.
    pub fn submit_item(&mut self) -> Result<Option<ItemId>, FieldErrors> {
        if self.is_loading() {
            return Ok(None);
        }
        self.item_form.retain_people(&self.store.bill().people);
        let item = self.item_form.submit()?;
        let id = item.id.clone();
        self.store.add_item(item);
        Ok(Some(id))
    }

    pub fn editing(&self) -> Option<&InlineEdit> {
        self.editing.as_ref()
    }

    /// Opens an inline rename for a person. Returns `false` for unknown ids.
    pub fn begin_edit_person(&mut self, person_id: &str) -> bool {
        self.blur();
        let Some(person) = self.store.bill().person(person_id) else {
            return false;
        };
        self.editing = Some(InlineEdit {
            target: EditTarget::Person(person.id.clone()),
            pending: person.name.clone(),
        });
        true
    }

    /// Opens an inline rename for an item. Returns `false` for unknown ids.
    pub fn begin_edit_item(&mut self, item_id: &str) -> bool {
        self.blur();
        let Some(item) = self.store.bill().item(item_id) else {
            return false;
        };
        self.editing = Some(InlineEdit {
            target: EditTarget::Item(item.id.clone()),
            pending: item.name.clone(),
        });
        true
    }

    /// Replaces the text of the open inline edit.
    pub fn update_edit(&mut self, text: impl Into<String>) {
        if let Some(edit) = self.editing.as_mut() {
            edit.pending = text.into();
        }
    }

    /// Closes the open inline edit, committing a non-blank value.
    ///
    /// Returns whether a rename reached the store.
    pub fn blur(&mut self) -> bool {
        let Some(edit) = self.editing.take() else {
            return false;
        };
        let name = edit.pending.trim();
        if name.is_empty() || self.is_loading() {
            debug!("event=inline_edit module=view status=discarded");
            return false;
        }

        match edit.target {
            EditTarget::Person(person_id) => {
                let Some(person) = self.store.bill().person(&person_id) else {
                    return false;
                };
                let renamed = person.renamed(name);
                self.store.edit_person(renamed);
            }
            EditTarget::Item(item_id) => {
                let Some(item) = self.store.bill().item(&item_id) else {
                    return false;
                };
                let renamed = item.renamed(name);
                self.store.edit_item(renamed);
            }
        }
        true
    }

    /// Deletes a person immediately, cascading to their shares.
    pub fn delete_person(&mut self, person_id: &str) {
        if self.is_loading() {
            return;
        }
        if matches!(&self.editing, Some(InlineEdit { target: EditTarget::Person(id), .. }) if id == person_id)
        {
            self.editing = None;
        }
        self.store.delete_person(person_id);
        self.item_form.retain_people(&self.store.bill().people);
    }

    /// Deletes an item immediately.
    pub fn delete_item(&mut self, item_id: &str) {
        if self.is_loading() {
            return;
        }
        if matches!(&self.editing, Some(InlineEdit { target: EditTarget::Item(id), .. }) if id == item_id)
        {
            self.editing = None;
        }
        self.store.delete_item(item_id);
    }
}
