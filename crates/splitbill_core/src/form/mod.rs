//! Input forms for new people and new items.
//!
//! # Responsibility
//! - Hold pending user input between edits and submission.
//! - Validate input before anything reaches the store.
//!
//! # Invariants
//! - A rejected submission issues no mutation and keeps every field value.
//! - Editing a field clears only that field's error.
//! - An accepted submission resets the form.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod item_form;
pub mod person_form;

/// User-input validation failure shown next to one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormError {
    /// Name is empty or whitespace only.
    EmptyName,
    /// Price is not a number or not strictly positive.
    InvalidPrice,
    /// Entered share percentages do not add up to exactly 100.
    PercentageSumMismatch { total: u32 },
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Name cannot be empty"),
            Self::InvalidPrice => write!(f, "Price must be a positive number"),
            Self::PercentageSumMismatch { total } => {
                write!(f, "Total percentage must equal 100% (currently {total}%)")
            }
        }
    }
}

impl Error for FormError {}

/// Form field an error is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Name,
    Price,
    Shares,
}

impl FormField {
    /// Stable field key used by FFI envelopes.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Price => "price",
            Self::Shares => "shares",
        }
    }
}

/// Per-field validation errors of one submission attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub name: Option<FormError>,
    pub price: Option<FormError>,
    pub shares: Option<FormError>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.shares.is_none()
    }

    /// Returns the error attached to `field`.
    pub fn get(&self, field: FormField) -> Option<FormError> {
        match field {
            FormField::Name => self.name,
            FormField::Price => self.price,
            FormField::Shares => self.shares,
        }
    }

    /// Clears the error attached to `field`.
    pub fn clear(&mut self, field: FormField) {
        match field {
            FormField::Name => self.name = None,
            FormField::Price => self.price = None,
            FormField::Shares => self.shares = None,
        }
    }

    /// Present errors in field order.
    pub fn iter(&self) -> impl Iterator<Item = (FormField, FormError)> + '_ {
        [FormField::Name, FormField::Price, FormField::Shares]
            .into_iter()
            .filter_map(|field| self.get(field).map(|error| (field, error)))
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, error) in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {error}", field.as_str())?;
            first = false;
        }
        Ok(())
    }
}

impl Error for FieldErrors {}

/// Trims a name, rejecting blank input.
pub fn normalize_name(raw: &str) -> Result<String, FormError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FormError::EmptyName);
    }
    Ok(trimmed.to_string())
}
