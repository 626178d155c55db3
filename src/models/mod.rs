use crate::error::ListingError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of a listing
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub String);

impl ListingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of rentable item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Land,
    Equipment,
}

impl ListingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingKind::Land => "land",
            ListingKind::Equipment => "equipment",
        }
    }

    /// Parse a kind filter value; anything unrecognised (including "all") is `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "land" | "farm" => Some(ListingKind::Land),
            "equipment" => Some(ListingKind::Equipment),
            _ => None,
        }
    }
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes that only make sense for agricultural land
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandDetails {
    /// Area in acres
    pub area: f64,
    pub soil_type: String,
    pub water_source: String,
    #[serde(default)]
    pub climate: Option<String>,
    #[serde(default)]
    pub crops: Vec<String>,
}

/// Attributes that only make sense for machinery
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentDetails {
    pub category: String,
    pub brand: String,
    pub model: String,
    pub year: Option<i32>,
    pub condition: String,
}

/// Type discriminator plus the type-specific attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ListingDetails {
    Land(LandDetails),
    Equipment(EquipmentDetails),
}

impl ListingDetails {
    pub fn kind(&self) -> ListingKind {
        match self {
            ListingDetails::Land(_) => ListingKind::Land,
            ListingDetails::Equipment(_) => ListingKind::Equipment,
        }
    }

    pub fn land(&self) -> Option<&LandDetails> {
        match self {
            ListingDetails::Land(land) => Some(land),
            ListingDetails::Equipment(_) => None,
        }
    }

    pub fn equipment(&self) -> Option<&EquipmentDetails> {
        match self {
            ListingDetails::Equipment(equipment) => Some(equipment),
            ListingDetails::Land(_) => None,
        }
    }
}

/// Who is renting the item out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub rating: Option<f32>,
}

/// Optional rental window. When both ends are present start < end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Availability {
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none()
    }

    /// True unless both dates are set and start does not precede end
    pub fn is_ordered(&self) -> bool {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => start < end,
            _ => true,
        }
    }
}

/// Core listing read model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(alias = "_id")]
    pub id: ListingId,
    pub title: String,
    pub description: String,
    /// Price per day, never negative
    pub price: f64,
    pub location: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(flatten)]
    pub details: ListingDetails,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub availability: Option<Availability>,
    /// First image is the cover
    #[serde(default)]
    pub images: Vec<String>,
    pub owner: Owner,
    pub created_at: DateTime<Utc>,
}

impl Listing {
    pub fn kind(&self) -> ListingKind {
        self.details.kind()
    }

    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    pub fn area(&self) -> Option<f64> {
        self.details.land().map(|land| land.area)
    }

    pub fn rating(&self) -> Option<f32> {
        self.owner.rating
    }

    /// Check the price and availability rules
    pub fn validate(&self) -> Result<(), ListingError> {
        check_rules(self.price, self.availability.as_ref())
    }
}

fn check_rules(price: f64, availability: Option<&Availability>) -> Result<(), ListingError> {
    if price < 0.0 {
        return Err(ListingError::NegativePrice(price));
    }
    if !availability.map_or(true, Availability::is_ordered) {
        return Err(ListingError::AvailabilityOrder);
    }
    Ok(())
}

/// Normalized payload produced by a submitted form, before the store assigns an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub state: Option<String>,
    #[serde(flatten)]
    pub details: ListingDetails,
    pub features: Vec<String>,
    pub availability: Option<Availability>,
    /// Names of the uploaded image files, in display order
    pub images: Vec<String>,
    pub owner: Owner,
}

impl NewListing {
    pub fn validate(&self) -> Result<(), ListingError> {
        check_rules(self.price, self.availability.as_ref())
    }

    pub fn into_listing(self, id: ListingId, created_at: DateTime<Utc>) -> Listing {
        Listing {
            id,
            title: self.title,
            description: self.description,
            price: self.price,
            location: self.location,
            state: self.state,
            details: self.details,
            features: self.features,
            availability: self.availability,
            images: self.images,
            owner: self.owner,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn window(start: u32, end: Option<u32>) -> Availability {
        Availability {
            start_date: Some(day(start)),
            end_date: end.map(day),
        }
    }

    fn paddy_field() -> Listing {
        Listing {
            id: ListingId::new("l1"),
            title: "Paddy field".into(),
            description: "Irrigated".into(),
            price: 900.0,
            location: "Thanjavur".into(),
            state: Some("Tamil Nadu".into()),
            details: ListingDetails::Land(LandDetails {
                area: 4.5,
                soil_type: "Alluvial Soil".into(),
                water_source: "Canal".into(),
                climate: None,
                crops: vec!["Rice".into()],
            }),
            features: vec![],
            availability: None,
            images: vec!["https://img.example/1.jpg".into()],
            owner: Owner {
                id: "u1".into(),
                name: "Ravi".into(),
                rating: Some(4.5),
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn availability_ordering() {
        assert!(window(1, Some(2)).is_ordered());
        assert!(!window(2, Some(2)).is_ordered());
        assert!(window(2, None).is_ordered());
        assert!(Availability::default().is_empty());
    }

    #[test]
    fn listing_rules_cover_price_and_availability() {
        let mut listing = paddy_field();
        assert_eq!(listing.validate(), Ok(()));

        listing.availability = Some(window(10, Some(3)));
        assert_eq!(listing.validate(), Err(ListingError::AvailabilityOrder));

        listing.availability = Some(window(3, Some(10)));
        listing.price = -5.0;
        assert_eq!(listing.validate(), Err(ListingError::NegativePrice(-5.0)));
    }

    #[test]
    fn listing_json_carries_type_tag() {
        let value = serde_json::to_value(paddy_field()).unwrap();
        assert_eq!(value["type"], "land");
        assert_eq!(value["soilType"], "Alluvial Soil");

        let back: Listing = serde_json::from_value(value).unwrap();
        assert_eq!(back.kind(), ListingKind::Land);
        assert_eq!(back.area(), Some(4.5));
        assert_eq!(back.cover_image(), Some("https://img.example/1.jpg"));
    }

    #[test]
    fn kind_parse_treats_all_as_unset() {
        assert_eq!(ListingKind::parse("Equipment"), Some(ListingKind::Equipment));
        assert_eq!(ListingKind::parse("farm"), Some(ListingKind::Land));
        assert_eq!(ListingKind::parse("all"), None);
        assert_eq!(ListingKind::parse(""), None);
    }
}
