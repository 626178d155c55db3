//! Per-user session context
//!
//! Holds the caller identity and favorites for one browse/form session.
//! Loading and saving are pure functions over a JSON document; the caller
//! owns the actual storage.

use crate::models::{ListingId, Owner};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The signed-in caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
        }
    }

    /// Owner reference stamped on listings this caller creates
    pub fn as_owner(&self) -> Owner {
        Owner {
            id: self.id.clone(),
            name: self.name.clone(),
            rating: None,
        }
    }
}

/// Ordered set of favorited listing ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Favorites(Vec<ListingId>);

impl Favorites {
    /// Returns false if the listing was already a favorite
    pub fn add(&mut self, id: ListingId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.0.push(id);
        true
    }

    pub fn remove(&mut self, id: &ListingId) -> bool {
        let before = self.0.len();
        self.0.retain(|fav| fav != id);
        self.0.len() != before
    }

    pub fn contains(&self, id: &ListingId) -> bool {
        self.0.iter().any(|fav| fav == id)
    }

    pub fn ids(&self) -> &[ListingId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Explicit session state passed to the filter engine and form controller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    #[serde(default)]
    pub identity: Option<Identity>,
    #[serde(default)]
    pub favorites: Favorites,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            favorites: Favorites::default(),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn sign_out(&mut self) {
        self.identity = None;
        self.favorites = Favorites::default();
    }
}

/// Parse a stored session document.
///
/// Blank or corrupt documents yield an anonymous session so a bad file never
/// locks the user out of browsing.
pub fn load_session(document: &str) -> SessionContext {
    if document.trim().is_empty() {
        debug!("No stored session, starting anonymous");
        return SessionContext::anonymous();
    }

    match serde_json::from_str(document) {
        Ok(session) => session,
        Err(e) => {
            warn!("Discarding unreadable session document: {}", e);
            SessionContext::anonymous()
        }
    }
}

/// Serialize a session for storage
pub fn save_session(session: &SessionContext) -> Result<String> {
    serde_json::to_string_pretty(session).context("Failed to serialize session")
}
