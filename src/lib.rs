//! Listing search and listing-creation logic for the FarmRental marketplace.

pub mod config;
pub mod error;
pub mod form;
pub mod models;
pub mod notifications;
pub mod search;
pub mod session;
pub mod settings;
pub mod store;

pub use error::{FormError, ListingError, SettingsError, SubmitError};
pub use form::ListingFormController;
pub use models::{Listing, ListingId, ListingKind};
pub use search::{FilterCriteria, ListingFilterEngine, Page};
pub use session::SessionContext;
pub use settings::UserSettings;
pub use store::ListingStore;
