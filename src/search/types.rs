use crate::models::ListingKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Ordering applied after filtering. Each key has a fixed direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Newest first
    #[default]
    Date,
    /// Cheapest first
    Price,
    /// Best-rated owner first
    Rating,
    /// Largest plot first
    Area,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::Price => "price",
            SortKey::Rating => "rating",
            SortKey::Area => "area",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(SortKey::Date),
            "price" => Ok(SortKey::Price),
            "rating" => Ok(SortKey::Rating),
            "area" => Ok(SortKey::Area),
            other => Err(format!("unknown sort key '{}'", other)),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ownership or membership restriction applied before every other filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scope {
    /// Every listing
    #[default]
    All,
    /// Listings owned by the caller
    MyListings,
    /// Listings the caller has favorited
    Favorites,
}

impl Scope {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "my-listings" | "mine" => Scope::MyListings,
            "favorites" => Scope::Favorites,
            _ => Scope::All,
        }
    }
}

/// Inclusive numeric range; a missing side is unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bounds {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// Normalized browse query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Case-insensitive substring over title, description and location
    pub search: String,
    pub scope: Scope,
    pub kind: Option<ListingKind>,
    pub state: Option<String>,
    /// Equipment category, e.g. "Tractors"
    pub category: Option<String>,
    pub brand: Option<String>,
    pub condition: Option<String>,
    pub soil_type: Option<String>,
    pub water_source: Option<String>,
    pub price: Bounds,
    pub area: Bounds,
    pub sort: SortKey,
    /// 1-based
    pub page: usize,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            search: String::new(),
            scope: Scope::All,
            kind: None,
            state: None,
            category: None,
            brand: None,
            condition: None,
            soil_type: None,
            water_source: None,
            price: Bounds::default(),
            area: Bounds::default(),
            sort: SortKey::Date,
            page: 1,
        }
    }
}

impl FilterCriteria {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }
}

/// Criteria exactly as a browse screen holds them: every control is text.
///
/// `RawCriteria::default()` is the "reset filters" state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCriteria {
    pub search: String,
    pub scope: String,
    pub kind: String,
    pub state: String,
    pub category: String,
    pub brand: String,
    pub condition: String,
    pub soil_type: String,
    pub water_source: String,
    pub min_price: String,
    pub max_price: String,
    pub min_area: String,
    pub max_area: String,
    pub sort: String,
    pub page: String,
}

impl RawCriteria {
    /// Turn screen state into criteria. Never fails: anything malformed
    /// falls back to "unset" or the default.
    pub fn normalize(&self) -> FilterCriteria {
        let sort = if self.sort.trim().is_empty() {
            SortKey::default()
        } else {
            self.sort.parse().unwrap_or_else(|e| {
                debug!("Falling back to default sort: {}", e);
                SortKey::default()
            })
        };

        let page = match self.page.trim() {
            "" => 1,
            text => match text.parse::<usize>() {
                Ok(page) if page >= 1 => page,
                _ => {
                    debug!("Ignoring page '{}', using page 1", text);
                    1
                }
            },
        };

        FilterCriteria {
            search: self.search.trim().to_string(),
            scope: Scope::parse(&self.scope),
            kind: ListingKind::parse(&self.kind),
            state: choice(&self.state),
            category: choice(&self.category),
            brand: choice(&self.brand),
            condition: choice(&self.condition),
            soil_type: choice(&self.soil_type),
            water_source: choice(&self.water_source),
            price: Bounds::new(
                bound("min_price", &self.min_price),
                bound("max_price", &self.max_price),
            ),
            area: Bounds::new(
                bound("min_area", &self.min_area),
                bound("max_area", &self.max_area),
            ),
            sort,
            page,
        }
    }
}

fn choice(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn bound(name: &str, value: &str) -> Option<f64> {
    let text = value.trim();
    if text.is_empty() {
        return None;
    }
    match text.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(n),
        _ => {
            debug!("Ignoring non-numeric {} '{}'", name, text);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reset_state_normalizes_to_default_criteria() {
        assert_eq!(RawCriteria::default().normalize(), FilterCriteria::default());
    }

    #[test]
    fn malformed_bounds_are_unset() {
        let raw = RawCriteria {
            min_price: "abc".into(),
            max_price: " 2000 ".into(),
            min_area: "NaN".into(),
            ..Default::default()
        };
        let criteria = raw.normalize();
        assert_eq!(criteria.price, Bounds::new(None, Some(2000.0)));
        assert!(criteria.area.is_unbounded());
    }

    #[test]
    fn unknown_sort_and_bad_page_fall_back() {
        let raw = RawCriteria {
            sort: "popularity".into(),
            page: "0".into(),
            ..Default::default()
        };
        let criteria = raw.normalize();
        assert_eq!(criteria.sort, SortKey::Date);
        assert_eq!(criteria.page, 1);

        let raw = RawCriteria {
            sort: "Rating".into(),
            page: "3".into(),
            ..Default::default()
        };
        let criteria = raw.normalize();
        assert_eq!(criteria.sort, SortKey::Rating);
        assert_eq!(criteria.page, 3);
    }

    #[test]
    fn scope_and_kind_parse() {
        let raw = RawCriteria {
            scope: "my-listings".into(),
            kind: "all".into(),
            ..Default::default()
        };
        let criteria = raw.normalize();
        assert_eq!(criteria.scope, Scope::MyListings);
        assert_eq!(criteria.kind, None);
    }

    #[test]
    fn bounds_are_inclusive() {
        let bounds = Bounds::new(Some(10.0), Some(20.0));
        assert!(bounds.contains(10.0));
        assert!(bounds.contains(20.0));
        assert!(!bounds.contains(9.99));
        assert!(!bounds.contains(20.01));
        assert!(Bounds::default().contains(-5.0));
    }
}
