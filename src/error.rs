use crate::form::state::{FieldErrors, ListField};
use thiserror::Error;

/// Errors from editing a listing form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// Index does not address an existing element of a list field
    #[error("No {field} entry at index {index} (have {len})")]
    IndexOutOfRange {
        field: ListField,
        index: usize,
        len: usize,
    },

    /// Image index does not exist
    #[error("No image at index {index} (have {len})")]
    ImageOutOfRange { index: usize, len: usize },
}

/// Why a submit attempt did not produce a listing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// One or more fields failed validation; the full map is attached
    #[error("Listing has {} invalid field(s)", .0.len())]
    Validation(FieldErrors),

    /// A previous submit is still waiting on the store
    #[error("A submission is already in progress")]
    AlreadySubmitting,

    /// This form already produced a listing
    #[error("This listing has already been submitted")]
    AlreadySubmitted,

    /// Creating a listing needs a signed-in owner
    #[error("You must be signed in to create a listing")]
    NotSignedIn,

    /// The ticket belongs to another form or to an attempt that already finished
    #[error("Submit ticket does not match the pending submission")]
    TicketMismatch,

    /// The store rejected or failed the request. `reason` is for logs only.
    #[error("Failed to create listing. Please try again.")]
    Persistence { reason: String },
}

impl SubmitError {
    /// Field errors, when the failure was a validation failure
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            SubmitError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// A listing record that breaks the model's rules
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ListingError {
    #[error("Price must not be negative, got {0}")]
    NegativePrice(f64),

    #[error("Availability must start before it ends")]
    AvailabilityOrder,
}

/// Errors from the settings panel
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// Settings are saved onto the signed-in identity
    #[error("You must be signed in to update settings")]
    NotSignedIn,

    #[error("Name cannot be empty")]
    BlankName,
}
