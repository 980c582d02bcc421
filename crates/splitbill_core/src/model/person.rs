//! Person domain model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a person.
///
/// Kept as a plain string so persisted ids (e.g. `"1"`) round-trip unchanged.
pub type PersonId = String;

/// One participant of the bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    /// Display name. Non-empty after trim when created through forms.
    pub name: String,
}

impl Person {
    /// Creates a person with a freshly generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), name)
    }

    /// Creates a person with a caller-provided id.
    pub fn with_id(id: impl Into<PersonId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Returns a copy of this person carrying `name`.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            id: self.id.clone(),
            name: name.into(),
        }
    }
}
