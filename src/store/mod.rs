pub mod catalog;
pub mod http;
pub mod memory;

use crate::models::{Listing, ListingId, ListingKind, NewListing};
use anyhow::Result;
use async_trait::async_trait;

pub use http::HttpListingStore;
pub use memory::MemoryListingStore;

/// Persistence collaborator for listings.
/// Browse screens read from it and the listing form writes to it.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Persist a new listing and return it as stored, with its id and creation time
    async fn create_listing(&self, listing: &NewListing) -> Result<Listing>;

    /// All listings, optionally only those of one kind
    async fn list_listings(&self, kind: Option<ListingKind>) -> Result<Vec<Listing>>;

    /// A single listing for the detail view
    async fn get_listing(&self, id: &ListingId) -> Result<Option<Listing>>;

    /// Name of the backing source, for logs
    fn source_name(&self) -> &'static str;
}
