//! Form Controller.
//!
//! # Responsibility
//! - Hold the draft of one create/edit form and its per-field errors.
//! - Validate before any store call and translate the store outcome into
//!   a reconcilable mutation.
//!
//! # Invariants
//! - A draft that fails validation never reaches the store.
//! - Editing a field clears only that field's error.

use crate::model::{Record, RecordId};
use crate::reconcile::Mutation;
use crate::store::{RecordStore, StoreError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod validate;

use validate::{Validate, ValidationErrors};

/// Whether the form creates a new record or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(RecordId),
}

#[derive(Debug)]
pub enum SubmitError {
    /// Rejected locally; the store was not called.
    Invalid(ValidationErrors),
    Store(StoreError),
    /// Submit requested while no form is open.
    Closed,
}

impl Display for SubmitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(errors) => write!(f, "form has errors: {errors}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Closed => write!(f, "no form is open"),
        }
    }
}

impl Error for SubmitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(errors) => Some(errors),
            Self::Store(err) => Some(err),
            Self::Closed => None,
        }
    }
}

/// Draft plus validation state of one open form.
#[derive(Debug, Clone)]
pub struct FormController<R: Record> {
    mode: FormMode,
    draft: R::Draft,
    errors: ValidationErrors,
}

impl<R: Record> FormController<R> {
    /// Opens an empty create form.
    pub fn create() -> Self {
        Self::create_with(R::Draft::default())
    }

    /// Opens a create form with prefilled values.
    pub fn create_with(draft: R::Draft) -> Self {
        Self {
            mode: FormMode::Create,
            draft,
            errors: ValidationErrors::new(),
        }
    }

    /// Opens an edit form holding the record's current values.
    pub fn edit(record: &R) -> Self {
        Self {
            mode: FormMode::Edit(record.id()),
            draft: record.to_draft(),
            errors: ValidationErrors::new(),
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn draft(&self) -> &R::Draft {
        &self.draft
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Edits `field` through `edit` and clears its pending error.
    pub fn update(&mut self, field: &str, edit: impl FnOnce(&mut R::Draft)) {
        edit(&mut self.draft);
        self.errors.clear(field);
    }

    /// Re-runs validation; returns whether the draft may be submitted.
    pub fn validate(&mut self) -> bool {
        match self.draft.validate() {
            Ok(()) => {
                self.errors = ValidationErrors::new();
                true
            }
            Err(errors) => {
                self.errors = errors;
                false
            }
        }
    }

    /// Validates and writes the draft through `store`.
    ///
    /// On failure the form keeps its draft so the user can correct it.
    pub async fn submit<S>(&mut self, store: &S) -> Result<Mutation<R>, SubmitError>
    where
        S: RecordStore<R> + ?Sized,
    {
        if !self.validate() {
            warn!(
                "event=form_submit module=form status=error kind={} reason=validation fields={}",
                R::KIND.as_str(),
                self.errors.fields().collect::<Vec<_>>().join(",")
            );
            return Err(SubmitError::Invalid(self.errors.clone()));
        }

        let outcome = match self.mode {
            FormMode::Create => store.create(self.draft.clone()).await.map(Mutation::Created),
            FormMode::Edit(id) => store
                .update(id, self.draft.clone())
                .await
                .map(Mutation::Updated),
        };

        match outcome {
            Ok(mutation) => {
                info!(
                    "event=form_submit module=form status=ok kind={} mode={:?}",
                    R::KIND.as_str(),
                    self.mode
                );
                Ok(mutation)
            }
            Err(err) => {
                if let StoreError::Validation(errors) = &err {
                    self.errors = errors.clone();
                }
                warn!(
                    "event=form_submit module=form status=error kind={} mode={:?} error={err}",
                    R::KIND.as_str(),
                    self.mode
                );
                Err(SubmitError::Store(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FormController, FormMode};
    use crate::model::contact::Contact;

    #[test]
    fn editing_a_field_clears_only_its_error() {
        let mut form = FormController::<Contact>::create();
        assert!(!form.validate());
        assert!(form.errors().contains("first_name"));
        assert!(form.errors().contains("email"));

        form.update("first_name", |draft| draft.first_name = "Ada".to_string());
        assert!(!form.errors().contains("first_name"));
        assert!(form.errors().contains("email"));
        assert_eq!(form.mode(), FormMode::Create);
    }
}
