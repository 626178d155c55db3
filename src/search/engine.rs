use crate::models::Listing;
use crate::search::types::{FilterCriteria, Scope, SortKey};
use crate::session::SessionContext;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

/// Page size used by the browse screens
pub const DEFAULT_PAGE_SIZE: usize = 6;

/// One page of an ordered result set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub items: Vec<Listing>,
    /// 1-based page number that was requested
    pub number: usize,
    pub page_size: usize,
    /// Matches across all pages
    pub total_items: usize,
    /// Never zero, so an empty result still renders a single page
    pub total_pages: usize,
}

impl Page {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }
}

/// Filter, sort and paginate a listing collection.
///
/// Stateless apart from the page size. Every call recomputes from scratch
/// and never mutates its input.
#[derive(Debug, Clone, Copy)]
pub struct ListingFilterEngine {
    page_size: usize,
}

impl Default for ListingFilterEngine {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ListingFilterEngine {
    /// A zero page size is bumped to 1
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Run the whole pipeline and return the requested page
    pub fn apply(
        &self,
        listings: &[Listing],
        criteria: &FilterCriteria,
        session: &SessionContext,
    ) -> Page {
        let ordered = self.select(listings, criteria, session);
        self.paginate(&ordered, criteria.page)
    }

    /// Filter then sort, without paging
    pub fn select(
        &self,
        listings: &[Listing],
        criteria: &FilterCriteria,
        session: &SessionContext,
    ) -> Vec<Listing> {
        let mut matched = self.filter(listings, criteria, session);
        sort_listings(&mut matched, criteria.sort);
        matched
    }

    /// Keep listings matching every active predicate, in input order
    pub fn filter(
        &self,
        listings: &[Listing],
        criteria: &FilterCriteria,
        session: &SessionContext,
    ) -> Vec<Listing> {
        let needle = criteria.search.to_lowercase();

        let matched: Vec<Listing> = listings
            .iter()
            .filter(|listing| in_scope(listing, criteria.scope, session))
            .filter(|listing| matches_search(listing, &needle))
            .filter(|listing| matches_categories(listing, criteria))
            .filter(|listing| matches_ranges(listing, criteria))
            .cloned()
            .collect();

        debug!(
            "Filtered {} listings down to {} (scope={:?}, search='{}')",
            listings.len(),
            matched.len(),
            criteria.scope,
            criteria.search
        );

        matched
    }

    /// Slice out a 1-based page. Out-of-range pages are empty, not errors.
    pub fn paginate(&self, ordered: &[Listing], page: usize) -> Page {
        let total_items = ordered.len();
        let total_pages = total_items.div_ceil(self.page_size).max(1);

        let items = match page.checked_sub(1) {
            Some(index) => {
                let start = index.saturating_mul(self.page_size).min(total_items);
                let end = start.saturating_add(self.page_size).min(total_items);
                ordered[start..end].to_vec()
            }
            None => Vec::new(),
        };

        Page {
            items,
            number: page,
            page_size: self.page_size,
            total_items,
            total_pages,
        }
    }
}

/// Stable sort by a single key using its fixed direction
pub fn sort_listings(listings: &mut [Listing], key: SortKey) {
    listings.sort_by(|a, b| compare(a, b, key));
}

fn compare(a: &Listing, b: &Listing, key: SortKey) -> Ordering {
    match key {
        SortKey::Date => b.created_at.cmp(&a.created_at),
        SortKey::Price => a.price.total_cmp(&b.price),
        // Missing ratings and areas sink to the end
        SortKey::Rating => descending(a.rating().map(f64::from), b.rating().map(f64::from)),
        SortKey::Area => descending(a.area(), b.area()),
    }
}

fn descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Scoped views fail closed: no identity, no results
fn in_scope(listing: &Listing, scope: Scope, session: &SessionContext) -> bool {
    match scope {
        Scope::All => true,
        Scope::MyListings => session
            .identity()
            .is_some_and(|identity| listing.owner.id == identity.id),
        Scope::Favorites => session.identity().is_some() && session.favorites.contains(&listing.id),
    }
}

fn matches_search(listing: &Listing, needle: &str) -> bool {
    needle.is_empty()
        || listing.title.to_lowercase().contains(needle)
        || listing.description.to_lowercase().contains(needle)
        || listing.location.to_lowercase().contains(needle)
}

fn matches_categories(listing: &Listing, criteria: &FilterCriteria) -> bool {
    let land = listing.details.land();
    let equipment = listing.details.equipment();

    criteria.kind.map_or(true, |kind| listing.kind() == kind)
        && equals(&criteria.state, listing.state.as_deref())
        && equals(&criteria.category, equipment.map(|e| e.category.as_str()))
        && equals(&criteria.brand, equipment.map(|e| e.brand.as_str()))
        && equals(&criteria.condition, equipment.map(|e| e.condition.as_str()))
        && equals(&criteria.soil_type, land.map(|l| l.soil_type.as_str()))
        && equals(&criteria.water_source, land.map(|l| l.water_source.as_str()))
}

/// Unset filter matches everything; a listing without the field never matches a set one
fn equals(filter: &Option<String>, field: Option<&str>) -> bool {
    match filter.as_deref() {
        None | Some("") => true,
        Some(wanted) => field == Some(wanted),
    }
}

fn matches_ranges(listing: &Listing, criteria: &FilterCriteria) -> bool {
    if !criteria.price.contains(listing.price) {
        return false;
    }
    if criteria.area.is_unbounded() {
        return true;
    }
    listing.area().is_some_and(|area| criteria.area.contains(area))
}
