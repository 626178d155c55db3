pub mod controller;
pub mod preview;
pub mod state;
pub mod validation;

pub use controller::{ListingFormController, SubmitTicket};
pub use preview::{ImageFile, LocalPreviewRegistry, PreviewProvider, PreviewRef};
pub use state::{
    DateBound, FieldErrors, FieldPath, FormField, FormPhase, ListField, ListingDraft,
    ListingFormState, ScalarField,
};
