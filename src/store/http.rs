use crate::models::{Listing, ListingId, ListingKind, NewListing};
use crate::store::ListingStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Listing store backed by the marketplace REST API
pub struct HttpListingStore {
    client: Client,
    base_url: String,
}

impl HttpListingStore {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("farm-rental/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn listings_url(&self) -> String {
        format!("{}/api/listings", self.base_url)
    }

    fn listing_url(&self, id: &ListingId) -> String {
        format!("{}/api/listings/{}", self.base_url, id)
    }
}

#[async_trait]
impl ListingStore for HttpListingStore {
    async fn create_listing(&self, listing: &NewListing) -> Result<Listing> {
        listing.validate().context("Refusing invalid listing")?;

        let url = self.listings_url();
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(listing)
            .send()
            .await
            .context("Failed to send listing")?;

        if !response.status().is_success() {
            warn!("Listing API returned status: {}", response.status());
            anyhow::bail!("Failed to create listing: {}", response.status());
        }

        let created: Listing = response
            .json()
            .await
            .context("Failed to read created listing")?;
        info!("Created listing {}", created.id);
        Ok(created)
    }

    async fn list_listings(&self, kind: Option<ListingKind>) -> Result<Vec<Listing>> {
        let url = self.listings_url();
        let mut request = self.client.get(&url);
        if let Some(kind) = kind {
            request = request.query(&[("type", kind.as_str())]);
        }

        debug!("GET {} (type={:?})", url, kind);
        let response = request.send().await.context("Failed to fetch listings")?;

        if !response.status().is_success() {
            warn!("Listing API returned status: {}", response.status());
            anyhow::bail!("Failed to fetch listings: {}", response.status());
        }

        let listings: Vec<Listing> = response.json().await.context("Failed to parse listings")?;
        let fetched = listings.len();
        let listings = keep_valid(listings);
        debug!("Fetched {} listings ({} kept)", fetched, listings.len());
        Ok(listings)
    }

    async fn get_listing(&self, id: &ListingId) -> Result<Option<Listing>> {
        let url = self.listing_url(id);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch listing")?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let listing: Listing = response.json().await.context("Failed to parse listing")?;
                listing
                    .validate()
                    .with_context(|| format!("Listing {} is invalid", listing.id))?;
                Ok(Some(listing))
            }
            status => {
                warn!("Listing API returned status: {}", status);
                anyhow::bail!("Failed to fetch listing {}: {}", id, status)
            }
        }
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

/// Drop records that break the listing rules rather than failing the whole page
fn keep_valid(listings: Vec<Listing>) -> Vec<Listing> {
    listings
        .into_iter()
        .filter(|listing| match listing.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!("Skipping listing {}: {}", listing.id, e);
                false
            }
        })
        .collect()
}
