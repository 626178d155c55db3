use crate::models::{Listing, ListingId, ListingKind, NewListing};
use crate::store::catalog;
use crate::store::ListingStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// Listings kept in process memory
#[derive(Debug, Default)]
pub struct MemoryListingStore {
    listings: RwLock<Vec<Listing>>,
}

impl MemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listings(listings: Vec<Listing>) -> Self {
        Self {
            listings: RwLock::new(listings),
        }
    }

    /// Store pre-filled with the sample land and equipment catalog
    pub fn seeded() -> Self {
        let listings = catalog::sample_listings();
        info!("📋 Seeding in-memory store with {} sample listings", listings.len());
        Self::with_listings(listings)
    }

    pub async fn len(&self) -> usize {
        self.listings.read().await.len()
    }
}

#[async_trait]
impl ListingStore for MemoryListingStore {
    async fn create_listing(&self, listing: &NewListing) -> Result<Listing> {
        listing.validate().context("Refusing invalid listing")?;

        let id = ListingId::new(Uuid::new_v4().to_string());
        let stored = listing.clone().into_listing(id, Utc::now());

        self.listings.write().await.push(stored.clone());
        debug!("Stored listing {} ({})", stored.id, stored.title);

        Ok(stored)
    }

    async fn list_listings(&self, kind: Option<ListingKind>) -> Result<Vec<Listing>> {
        let listings = self.listings.read().await;
        Ok(listings
            .iter()
            .filter(|listing| kind.map_or(true, |k| listing.kind() == k))
            .cloned()
            .collect())
    }

    async fn get_listing(&self, id: &ListingId) -> Result<Option<Listing>> {
        let listings = self.listings.read().await;
        Ok(listings.iter().find(|listing| &listing.id == id).cloned())
    }

    fn source_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Availability, EquipmentDetails, ListingDetails, Owner};
    use chrono::NaiveDate;

    fn payload(title: &str) -> NewListing {
        NewListing {
            title: title.into(),
            description: "Good tyres".into(),
            price: 700.0,
            location: "Rajkot".into(),
            state: Some("Gujarat".into()),
            details: ListingDetails::Equipment(EquipmentDetails {
                category: "Sprayers".into(),
                ..Default::default()
            }),
            features: vec![],
            availability: None,
            images: vec!["sprayer.jpg".into()],
            owner: Owner {
                id: "u9".into(),
                name: "Meena".into(),
                rating: None,
            },
        }
    }

    #[tokio::test]
    async fn created_listing_can_be_read_back() {
        let store = MemoryListingStore::new();
        let created = store.create_listing(&payload("Boom sprayer")).await.unwrap();

        let listing = store.get_listing(&created.id).await.unwrap().expect("listing stored");
        assert_eq!(listing, created);
        assert_eq!(listing.title, "Boom sprayer");
        assert_eq!(listing.kind(), ListingKind::Equipment);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn kind_hint_filters() {
        let store = MemoryListingStore::seeded();
        let all = store.list_listings(None).await.unwrap();
        let land = store.list_listings(Some(ListingKind::Land)).await.unwrap();
        let equipment = store.list_listings(Some(ListingKind::Equipment)).await.unwrap();

        assert!(!land.is_empty());
        assert!(!equipment.is_empty());
        assert_eq!(land.len() + equipment.len(), all.len());
        assert!(land.iter().all(|l| l.kind() == ListingKind::Land));
    }

    #[tokio::test]
    async fn negative_price_is_rejected() {
        let store = MemoryListingStore::new();
        let mut bad = payload("Broken");
        bad.price = -1.0;
        assert!(store.create_listing(&bad).await.is_err());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn reversed_availability_is_rejected() {
        let store = MemoryListingStore::new();
        let mut bad = payload("Backwards");
        bad.availability = Some(Availability {
            start_date: NaiveDate::from_ymd_opt(2024, 9, 30),
            end_date: NaiveDate::from_ymd_opt(2024, 9, 1),
        });
        assert!(store.create_listing(&bad).await.is_err());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn unknown_id_is_none() {
        let store = MemoryListingStore::seeded();
        assert!(store.get_listing(&ListingId::new("missing")).await.unwrap().is_none());
    }
}
