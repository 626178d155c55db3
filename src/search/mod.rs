pub mod engine;
pub mod types;

pub use engine::{sort_listings, ListingFilterEngine, Page, DEFAULT_PAGE_SIZE};
pub use types::{Bounds, FilterCriteria, RawCriteria, Scope, SortKey};
