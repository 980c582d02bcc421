//! Bill item domain model.
//!
//! # Responsibility
//! - Define purchased items and their per-person percentage shares.
//! - Check creation-time invariants without enforcing them on every write.
//!
//! # Invariants
//! - At creation, share percentages sum to exactly 100.
//! - A person appears at most once in `shared_by`.
//! - Zero-percentage shares are never stored.
//! - After a person is deleted an item may carry less than 100%; that state
//!   is accepted and is not re-validated.

use crate::model::person::PersonId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a bill item.
pub type ItemId = String;

/// Percentage total every new item must allocate.
pub const FULL_ALLOCATION_PERCENT: u32 = 100;

/// One person's share of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Share {
    pub person_id: PersonId,
    /// Integer percentage in `1..=100`.
    pub percentage: u8,
}

impl Share {
    pub fn new(person_id: impl Into<PersonId>, percentage: u8) -> Self {
        Self {
            person_id: person_id.into(),
            percentage,
        }
    }
}

/// Purchased item whose price is split across people.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillItem {
    pub id: ItemId,
    pub name: String,
    pub price: f64,
    /// Ordered share entries; order is preserved through persistence.
    pub shared_by: Vec<Share>,
}

/// Violations of the item creation invariants.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemValidationError {
    /// Name is blank after trim.
    EmptyName,
    /// Price is not finite or not strictly positive.
    InvalidPrice(f64),
    /// A share above 100% or an explicit zero share.
    InvalidPercentage { person_id: PersonId, percentage: u8 },
    /// The same person holds more than one share.
    DuplicateShare(PersonId),
    /// Shares do not add up to exactly 100%.
    PercentageSumMismatch { total: u32 },
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "item name must not be blank"),
            Self::InvalidPrice(price) => write!(f, "item price must be positive, got {price}"),
            Self::InvalidPercentage {
                person_id,
                percentage,
            } => write!(
                f,
                "share of person {person_id} must be within 1..=100, got {percentage}"
            ),
            Self::DuplicateShare(person_id) => {
                write!(f, "person {person_id} has more than one share")
            }
            Self::PercentageSumMismatch { total } => write!(
                f,
                "shares must total {FULL_ALLOCATION_PERCENT}%, got {total}%"
            ),
        }
    }
}

impl Error for ItemValidationError {}

impl BillItem {
    /// Creates an item with a freshly generated id.
    pub fn new(name: impl Into<String>, price: f64, shared_by: Vec<Share>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), name, price, shared_by)
    }

    /// Creates an item with a caller-provided id.
    ///
    /// Does not validate; see [`BillItem::validate`].
    pub fn with_id(
        id: impl Into<ItemId>,
        name: impl Into<String>,
        price: f64,
        shared_by: Vec<Share>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            shared_by,
        }
    }

    /// Checks the creation-time invariants.
    ///
    /// # Errors
    /// - Returns the first violated invariant, checked in field order.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.name.trim().is_empty() {
            return Err(ItemValidationError::EmptyName);
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(ItemValidationError::InvalidPrice(self.price));
        }

        let mut seen = HashSet::new();
        for share in &self.shared_by {
            if share.percentage == 0 || u32::from(share.percentage) > FULL_ALLOCATION_PERCENT {
                return Err(ItemValidationError::InvalidPercentage {
                    person_id: share.person_id.clone(),
                    percentage: share.percentage,
                });
            }
            if !seen.insert(share.person_id.as_str()) {
                return Err(ItemValidationError::DuplicateShare(share.person_id.clone()));
            }
        }

        let total = self.allocated_percentage();
        if total != FULL_ALLOCATION_PERCENT {
            return Err(ItemValidationError::PercentageSumMismatch { total });
        }
        Ok(())
    }

    /// Sum of all share percentages.
    pub fn allocated_percentage(&self) -> u32 {
        self.shared_by
            .iter()
            .map(|share| u32::from(share.percentage))
            .sum()
    }

    /// Price portion not covered by any share.
    ///
    /// Zero for fully allocated items; positive once a sharing person was
    /// deleted. Over-allocation is reported as zero.
    pub fn unallocated_amount(&self) -> f64 {
        let missing = FULL_ALLOCATION_PERCENT.saturating_sub(self.allocated_percentage());
        self.price * f64::from(missing) / 100.0
    }

    /// Returns the share of `person_id`, if any.
    pub fn share_of(&self, person_id: &str) -> Option<&Share> {
        self.shared_by
            .iter()
            .find(|share| share.person_id == person_id)
    }

    /// Returns whether `person_id` holds a share of this item.
    pub fn is_shared_by(&self, person_id: &str) -> bool {
        self.share_of(person_id).is_some()
    }

    /// Returns a copy of this item carrying `name`.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Returns a copy of this item with the shares of `person_id` removed.
    pub fn without_person(&self, person_id: &str) -> Self {
        Self {
            shared_by: self
                .shared_by
                .iter()
                .filter(|share| share.person_id != person_id)
                .cloned()
                .collect(),
            ..self.clone()
        }
    }
}
