//! Per-person split calculation.
//!
//! # Responsibility
//! - Aggregate weighted item prices into a per-person owed amount.
//! - Report the price portion that no known person covers.
//!
//! # Invariants
//! - Every known person appears in the result, starting at zero.
//! - No rounding during accumulation; rounding is a display concern.
//! - Shares that point at unknown people never panic; they are skipped and
//!   counted as unallocated.

use crate::model::bill::Bill;
use crate::model::item::FULL_ALLOCATION_PERCENT;
use crate::model::person::PersonId;
use log::warn;
use std::collections::HashMap;

/// Computed split, ordered like `Bill.people`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Split {
    amounts: Vec<(PersonId, f64)>,
    unallocated: f64,
}

impl Split {
    /// Owed amount for `person_id`, or `None` for unknown people.
    pub fn get(&self, person_id: &str) -> Option<f64> {
        self.amounts
            .iter()
            .find(|(id, _)| id == person_id)
            .map(|(_, amount)| *amount)
    }

    /// `(person_id, amount)` pairs in people order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.amounts
            .iter()
            .map(|(id, amount)| (id.as_str(), *amount))
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    /// Sum of all owed amounts.
    pub fn total(&self) -> f64 {
        self.amounts.iter().map(|(_, amount)| amount).sum()
    }

    /// Price portion not owed by any known person.
    pub fn unallocated(&self) -> f64 {
        self.unallocated
    }
}

/// Computes how much each person owes.
///
/// Each share adds `price * percentage / 100` to its person. Items without
/// shares contribute nothing to anyone.
pub fn compute_split(bill: &Bill) -> Split {
    let mut amounts: Vec<(PersonId, f64)> = Vec::with_capacity(bill.people.len());
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(bill.people.len());
    for person in &bill.people {
        if index.contains_key(person.id.as_str()) {
            continue;
        }
        index.insert(person.id.as_str(), amounts.len());
        amounts.push((person.id.clone(), 0.0));
    }

    let mut unallocated = 0.0;
    for item in &bill.items {
        let mut covered: u32 = 0;
        for share in &item.shared_by {
            match index.get(share.person_id.as_str()) {
                Some(&slot) => {
                    amounts[slot].1 += item.price * (f64::from(share.percentage) / 100.0);
                    covered += u32::from(share.percentage);
                }
                None => {
                    // Ids only; names stay out of logs.
                    warn!(
                        "event=split_compute module=split status=degraded error_code=unknown_person item_id={} person_id={}",
                        item.id, share.person_id
                    );
                }
            }
        }
        let missing = FULL_ALLOCATION_PERCENT.saturating_sub(covered);
        unallocated += item.price * f64::from(missing) / 100.0;
    }

    Split {
        amounts,
        unallocated,
    }
}

/// Rounds to two decimal places.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Formats an amount with exactly two decimals, e.g. `10.00`.
pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", round_cents(amount))
}

#[cfg(test)]
mod tests {
    use super::{format_amount, round_cents};

    #[test]
    fn format_amount_rounds_to_cents() {
        assert_eq!(format_amount(10.0), "10.00");
        assert_eq!(format_amount(3.333_333), "3.33");
        assert_eq!(format_amount(0.0), "0.00");
    }

    #[test]
    fn round_cents_keeps_two_decimals() {
        assert!((round_cents(6.666_666) - 6.67).abs() < 1e-9);
    }
}
