//! New-person form.

use crate::form::{normalize_name, FormError};
use crate::model::person::Person;

/// Pending "add person" input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonForm {
    name: String,
    error: Option<FormError>,
}

impl PersonForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Error shown under the name field.
    pub fn error(&self) -> Option<FormError> {
        self.error
    }

    /// Replaces the name input and clears its error.
    pub fn set_name(&mut self, text: impl Into<String>) {
        self.name = text.into();
        self.error = None;
    }

    /// Validates and builds a new person with a fresh id.
    ///
    /// On success the form is reset. On failure the input is kept.
    pub fn submit(&mut self) -> Result<Person, FormError> {
        match normalize_name(&self.name) {
            Ok(name) => {
                *self = Self::default();
                Ok(Person::new(name))
            }
            Err(err) => {
                self.error = Some(err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PersonForm;
    use crate::form::FormError;

    #[test]
    fn blank_name_is_rejected_and_kept() {
        let mut form = PersonForm::new();
        form.set_name("   ");
        assert_eq!(form.submit(), Err(FormError::EmptyName));
        assert_eq!(form.name(), "   ");
        assert_eq!(form.error(), Some(FormError::EmptyName));

        form.set_name("Al");
        assert_eq!(form.error(), None);
    }

    #[test]
    fn submit_trims_and_resets() {
        let mut form = PersonForm::new();
        form.set_name("  Alice ");
        let person = form.submit().unwrap();
        assert_eq!(person.name, "Alice");
        assert!(!person.id.is_empty());
        assert_eq!(form, PersonForm::new());
    }
}
