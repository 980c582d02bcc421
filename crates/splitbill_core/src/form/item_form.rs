//! New-item form.
//!
//! # Invariants
//! - Pending shares are clamped to `0..=100`; zero removes the entry.
//! - A person holds at most one pending share.
//! - Submission requires name, price and share total to all be valid; every
//!   failing field is reported at once.

use crate::form::{normalize_name, FieldErrors, FormError, FormField};
use crate::model::item::{BillItem, Share, FULL_ALLOCATION_PERCENT};
use crate::model::person::Person;
use std::sync::Arc;

const MAX_SHARE_PERCENT: u8 = 100;

/// Pending "add item" input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemForm {
    name: String,
    price: String,
    shares: Vec<Share>,
    errors: FieldErrors,
}

impl ItemForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw price text as typed.
    pub fn price(&self) -> &str {
        &self.price
    }

    /// Pending shares in entry order.
    pub fn shares(&self) -> &[Share] {
        &self.shares
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn set_name(&mut self, text: impl Into<String>) {
        self.name = text.into();
        self.errors.clear(FormField::Name);
    }

    pub fn set_price(&mut self, text: impl Into<String>) {
        self.price = text.into();
        self.errors.clear(FormField::Price);
    }

    /// Captures a raw percentage input for one person.
    ///
    /// Returns the effective percentage after parsing and clamping; `0`
    /// means the person no longer shares the item. A re-entered share moves
    /// to the end of the sequence.
    pub fn set_share(&mut self, person_id: &str, raw: &str) -> u8 {
        let percentage = parse_share_input(raw);
        self.set_share_percent(person_id, percentage);
        percentage
    }

    /// Same as [`ItemForm::set_share`] for already numeric input.
    pub fn set_share_percent(&mut self, person_id: &str, percentage: u8) {
        let percentage = percentage.min(MAX_SHARE_PERCENT);
        self.shares.retain(|share| share.person_id != person_id);
        if percentage > 0 {
            self.shares.push(Share::new(person_id, percentage));
        }
        self.errors.clear(FormField::Shares);
    }

    /// Pending percentage of `person_id`, if any.
    pub fn share_for(&self, person_id: &str) -> Option<u8> {
        self.shares
            .iter()
            .find(|share| share.person_id == person_id)
            .map(|share| share.percentage)
    }

    /// Sum of pending share percentages.
    pub fn total_percentage(&self) -> u32 {
        self.shares
            .iter()
            .map(|share| u32::from(share.percentage))
            .sum()
    }

    /// Drops pending shares of people not in `people`.
    pub fn retain_people(&mut self, people: &[Arc<Person>]) {
        self.shares
            .retain(|share| people.iter().any(|person| person.id == share.person_id));
    }

    /// Validates all fields without changing the form.
    pub fn validate(&self) -> Result<(String, f64), FieldErrors> {
        let mut errors = FieldErrors::default();

        let name = normalize_name(&self.name)
            .map_err(|err| errors.name = Some(err))
            .ok();
        let price = parse_price(&self.price)
            .map_err(|err| errors.price = Some(err))
            .ok();
        let total = self.total_percentage();
        if total != FULL_ALLOCATION_PERCENT {
            errors.shares = Some(FormError::PercentageSumMismatch { total });
        }

        match (name, price) {
            (Some(name), Some(price)) if errors.is_empty() => Ok((name, price)),
            _ => Err(errors),
        }
    }

    /// Validates and builds a new item with a fresh id.
    ///
    /// On success the form is reset. On failure the field errors are stored
    /// on the form and every input is kept.
    pub fn submit(&mut self) -> Result<BillItem, FieldErrors> {
        match self.validate() {
            Ok((name, price)) => {
                let shares = std::mem::take(&mut self.shares);
                *self = Self::default();
                Ok(BillItem::new(name, price, shares))
            }
            Err(errors) => {
                self.errors = errors.clone();
                Err(errors)
            }
        }
    }
}

/// Parses a price as a finite number strictly above zero.
pub fn parse_price(raw: &str) -> Result<f64, FormError> {
    match raw.trim().parse::<f64>() {
        Ok(price) if price.is_finite() && price > 0.0 => Ok(price),
        _ => Err(FormError::InvalidPrice),
    }
}

/// Parses integer-box input: leading digits only, garbage counts as zero,
/// result clamped to `0..=100`.
pub fn parse_share_input(raw: &str) -> u8 {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let mut value: u32 = 0;
    let mut any_digit = false;
    for digit in digits.chars().map_while(|ch| ch.to_digit(10)) {
        any_digit = true;
        value = value.saturating_mul(10).saturating_add(digit);
    }

    if !any_digit || negative {
        return 0;
    }
    u8::try_from(value.min(u32::from(MAX_SHARE_PERCENT))).unwrap_or(MAX_SHARE_PERCENT)
}

#[cfg(test)]
mod tests {
    use super::{parse_price, parse_share_input, ItemForm};
    use crate::form::FormError;

    #[test]
    fn share_input_behaves_like_integer_box() {
        assert_eq!(parse_share_input("50"), 50);
        assert_eq!(parse_share_input(" 42abc"), 42);
        assert_eq!(parse_share_input("12.9"), 12);
        assert_eq!(parse_share_input("abc"), 0);
        assert_eq!(parse_share_input(""), 0);
        assert_eq!(parse_share_input("-5"), 0);
        assert_eq!(parse_share_input("250"), 100);
        assert_eq!(parse_share_input("99999999999999999999"), 100);
    }

    #[test]
    fn price_must_be_positive_finite_number() {
        assert_eq!(parse_price(" 12.50 "), Ok(12.5));
        assert_eq!(parse_price("0"), Err(FormError::InvalidPrice));
        assert_eq!(parse_price("-3"), Err(FormError::InvalidPrice));
        assert_eq!(parse_price("ten"), Err(FormError::InvalidPrice));
        assert_eq!(parse_price("inf"), Err(FormError::InvalidPrice));
        assert_eq!(parse_price("NaN"), Err(FormError::InvalidPrice));
        assert_eq!(parse_price(""), Err(FormError::InvalidPrice));
    }

    #[test]
    fn zero_share_removes_entry_and_reentry_moves_to_end() {
        let mut form = ItemForm::new();
        form.set_share("1", "30");
        form.set_share("2", "70");
        form.set_share("1", "40");
        let order: Vec<&str> = form
            .shares()
            .iter()
            .map(|share| share.person_id.as_str())
            .collect();
        assert_eq!(order, vec!["2", "1"]);

        assert_eq!(form.set_share("2", "0"), 0);
        assert_eq!(form.share_for("2"), None);
        assert_eq!(form.total_percentage(), 40);
    }
}
