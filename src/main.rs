use farm_rental::config::Config;
use farm_rental::search::ListingFilterEngine;
use farm_rental::session::{load_session, save_session};
use farm_rental::settings::{ProfileField, SettingsField, UserSettings};
use farm_rental::store::{HttpListingStore, ListingStore, MemoryListingStore};
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Stored session text and whether the file may be rewritten.
/// A missing file reads as blank; a file we could not read is never overwritten.
async fn read_session_document(path: &Path) -> (String, bool) {
    match tokio::fs::read_to_string(path).await {
        Ok(document) => (document, true),
        Err(e) if e.kind() == ErrorKind::NotFound => (String::new(), true),
        Err(e) => {
            warn!("Could not read session {}: {}", path.display(), e);
            (String::new(), false)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("🌾 FarmRental - listing browser");

    let config = Config::from_env()?;

    let (document, writable) = read_session_document(&config.session_path).await;
    let loaded = load_session(&document);
    let mut session = loaded.clone();

    if let Some(name) = &config.display_name {
        let mut settings = UserSettings::for_session(&session);
        settings.update(SettingsField::Profile(ProfileField::Name, name.clone()));
        if let Err(e) = settings.save(&mut session) {
            warn!("Display name not saved: {}", e);
        }
    }

    match session.identity() {
        Some(identity) => info!("Signed in as {}", identity.name),
        None => info!("Browsing anonymously"),
    }

    let store: Box<dyn ListingStore> = match &config.api_url {
        Some(url) => Box::new(HttpListingStore::new(url.clone())?),
        None => Box::new(MemoryListingStore::seeded()),
    };

    let criteria = config.criteria.normalize();
    let listings = store.list_listings(criteria.kind).await?;
    info!("Loaded {} listings from {} store", listings.len(), store.source_name());

    let engine = ListingFilterEngine::new(config.page_size);
    let page = engine.apply(&listings, &criteria, &session);

    info!(
        "✅ Page {} of {} ({} matching, sorted by {})\n",
        page.number, page.total_pages, page.total_items, criteria.sort
    );

    for (i, listing) in page.items.iter().enumerate() {
        println!("{}. {} ({} per day)", i + 1, listing.title, listing.price);
        println!("   {} · {}", listing.kind(), listing.location);
        if let Some(state) = &listing.state {
            println!("   State: {}", state);
        }
        if let Some(area) = listing.area() {
            println!("   Area: {} acres", area);
        }
        if let Some(rating) = listing.rating() {
            println!("   Owner: {} ({:.1}★)", listing.owner.name, rating);
        }
        if !listing.features.is_empty() {
            println!("   Features: {}", listing.features.join(", "));
        }
        println!("   ID: {}", listing.id);
        println!();
    }

    let json = serde_json::to_string_pretty(&page)?;
    tokio::fs::write(&config.output_path, json).await?;
    info!("💾 Saved page to {}", config.output_path.display());

    if writable && session != loaded {
        tokio::fs::write(&config.session_path, save_session(&session)?).await?;
        info!("💾 Updated session in {}", config.session_path.display());
    }

    Ok(())
}
