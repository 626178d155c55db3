use crate::search::{RawCriteria, DEFAULT_PAGE_SIZE};
use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;

pub struct Config {
    /// Listings API; the seeded in-memory store is used when unset
    pub api_url: Option<String>,
    pub page_size: usize,
    pub session_path: PathBuf,
    pub output_path: PathBuf,
    /// New display name to save onto the stored session, if any
    pub display_name: Option<String>,
    pub criteria: RawCriteria,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup, so tests need not touch the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).unwrap_or_default();

        let page_size = match lookup("FARMRENTAL_PAGE_SIZE") {
            Some(text) => text.trim().parse::<usize>().with_context(|| {
                format!("FARMRENTAL_PAGE_SIZE must be a number, got '{}'", text)
            })?,
            None => DEFAULT_PAGE_SIZE,
        };
        if page_size == 0 {
            bail!("FARMRENTAL_PAGE_SIZE must be at least 1");
        }

        Ok(Self {
            api_url: lookup("FARMRENTAL_API_URL")
                .filter(|url| !url.trim().is_empty()),
            page_size,
            display_name: lookup("FARMRENTAL_DISPLAY_NAME")
                .filter(|name| !name.trim().is_empty()),
            session_path: lookup("FARMRENTAL_SESSION_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("session.json")),
            output_path: lookup("FARMRENTAL_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("search_results.json")),
            criteria: RawCriteria {
                search: var("FARMRENTAL_QUERY"),
                kind: var("FARMRENTAL_KIND"),
                scope: var("FARMRENTAL_SCOPE"),
                sort: var("FARMRENTAL_SORT"),
                page: var("FARMRENTAL_PAGE"),
                min_price: var("FARMRENTAL_MIN_PRICE"),
                max_price: var("FARMRENTAL_MAX_PRICE"),
                ..Default::default()
            },
        })
    }
}
