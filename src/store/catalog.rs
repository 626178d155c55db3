//! Sample catalog used to seed the in-memory store

use crate::models::{
    Availability, EquipmentDetails, LandDetails, Listing, ListingDetails, ListingId, Owner,
};
use chrono::{DateTime, NaiveDate, Utc};

const TRACTOR_IMAGE: &str =
    "https://images.unsplash.com/photo-1590859808308-3d2d9c515b1a?auto=format&fit=crop&w=1350&q=80";
const FIELD_IMAGE: &str =
    "https://images.unsplash.com/photo-1500382017468-9049fed747ef?auto=format&fit=crop&w=1350&q=80";

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

fn window(start: (i32, u32, u32), end: (i32, u32, u32)) -> Option<Availability> {
    Some(Availability {
        start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2),
        end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2),
    })
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

struct Machine<'a> {
    id: &'a str,
    title: &'a str,
    description: &'a str,
    price: f64,
    location: &'a str,
    state: &'a str,
    category: &'a str,
    brand: &'a str,
    model: &'a str,
    year: i32,
    condition: &'a str,
    features: &'a [&'a str],
    owner: (&'a str, &'a str, f32),
    created_at: DateTime<Utc>,
}

fn machine(m: Machine<'_>) -> Listing {
    Listing {
        id: ListingId::new(m.id),
        title: m.title.into(),
        description: m.description.into(),
        price: m.price,
        location: m.location.into(),
        state: Some(m.state.into()),
        details: ListingDetails::Equipment(EquipmentDetails {
            category: m.category.into(),
            brand: m.brand.into(),
            model: m.model.into(),
            year: Some(m.year),
            condition: m.condition.into(),
        }),
        features: strings(m.features),
        availability: window((2024, 4, 1), (2024, 6, 30)),
        images: vec![TRACTOR_IMAGE.into()],
        owner: Owner {
            id: m.owner.0.into(),
            name: m.owner.1.into(),
            rating: Some(m.owner.2),
        },
        created_at: m.created_at,
    }
}

struct Plot<'a> {
    id: &'a str,
    title: &'a str,
    description: &'a str,
    price: f64,
    location: &'a str,
    state: &'a str,
    area: f64,
    soil_type: &'a str,
    water_source: &'a str,
    climate: &'a str,
    crops: &'a [&'a str],
    owner: (&'a str, &'a str),
    created_at: DateTime<Utc>,
}

fn plot(p: Plot<'_>) -> Listing {
    Listing {
        id: ListingId::new(p.id),
        title: p.title.into(),
        description: p.description.into(),
        price: p.price,
        location: p.location.into(),
        state: Some(p.state.into()),
        details: ListingDetails::Land(LandDetails {
            area: p.area,
            soil_type: p.soil_type.into(),
            water_source: p.water_source.into(),
            climate: Some(p.climate.into()),
            crops: strings(p.crops),
        }),
        features: Vec::new(),
        availability: None,
        images: vec![FIELD_IMAGE.into()],
        owner: Owner {
            id: p.owner.0.into(),
            name: p.owner.1.into(),
            rating: None,
        },
        created_at: p.created_at,
    }
}

/// Land and equipment listings across several states
pub fn sample_listings() -> Vec<Listing> {
    vec![
        machine(Machine {
            id: "eq-1",
            title: "Mahindra 575 DI XP Plus Tractor",
            description:
                "Powerful 45 HP tractor with power steering, perfect for medium to large farms.",
            price: 1200.0,
            location: "Ludhiana",
            state: "Punjab",
            category: "Tractors",
            brand: "Mahindra",
            model: "575 DI XP Plus",
            year: 2020,
            condition: "Good",
            features: &["Power Steering", "Dual Clutch", "Power Take Off"],
            owner: ("owner1", "Amarjit Singh", 4.8),
            created_at: at(2024, 3, 15, 10, 30),
        }),
        machine(Machine {
            id: "eq-2",
            title: "John Deere 5050E Tractor",
            description: "50 HP tractor with advanced technology features for precision farming.",
            price: 1500.0,
            location: "Nagpur",
            state: "Maharashtra",
            category: "Tractors",
            brand: "John Deere",
            model: "5050E",
            year: 2021,
            condition: "Like New",
            features: &["GPS Ready", "Power Reverser"],
            owner: ("owner2", "Rajesh Patil", 4.9),
            created_at: at(2024, 3, 10, 14, 45),
        }),
        machine(Machine {
            id: "eq-3",
            title: "VST Shakti Power Tiller",
            description: "Efficient 8.5 HP power tiller for small to medium farms.",
            price: 500.0,
            location: "Coimbatore",
            state: "Tamil Nadu",
            category: "Power Tillers",
            brand: "VST Tillers",
            model: "Shakti 130",
            year: 2022,
            condition: "New",
            features: &["Easy Start", "Fuel Efficient"],
            owner: ("owner3", "Kavitha Gowda", 4.7),
            created_at: at(2024, 3, 5, 9, 15),
        }),
        machine(Machine {
            id: "eq-4",
            title: "Sonalika DI 35 RX Tractor",
            description: "Reliable 39 HP tractor, light on fuel and easy on small plots.",
            price: 900.0,
            location: "Lucknow",
            state: "Uttar Pradesh",
            category: "Tractors",
            brand: "Sonalika",
            model: "DI 35 RX",
            year: 2021,
            condition: "Like New",
            features: &["Oil Immersed Brakes"],
            owner: ("owner5", "Ramesh Yadav", 4.5),
            created_at: at(2024, 2, 28, 16, 40),
        }),
        machine(Machine {
            id: "eq-5",
            title: "Kubota B2420 Tractor",
            description: "Compact 24 HP tractor suited to orchards and vineyards.",
            price: 800.0,
            location: "Dehradun",
            state: "Uttarakhand",
            category: "Tractors",
            brand: "Kubota",
            model: "B2420",
            year: 2022,
            condition: "Like New",
            features: &["4WD", "Hydrostatic Transmission"],
            owner: ("owner7", "Deepak Rawat", 4.7),
            created_at: at(2024, 2, 20, 14, 15),
        }),
        plot(Plot {
            id: "land-1",
            title: "10 Acre Fertile Land in Punjab",
            description: "Prime agricultural land with alluvial soil perfect for wheat and rice.",
            price: 5000.0,
            location: "Ludhiana",
            state: "Punjab",
            area: 10.0,
            soil_type: "Alluvial Soil",
            water_source: "Canal",
            climate: "Subtropical",
            crops: &["Wheat", "Rice", "Cotton"],
            owner: ("owner1", "Amarjit Singh"),
            created_at: at(2023, 4, 15, 10, 30),
        }),
        plot(Plot {
            id: "land-2",
            title: "5 Acre Coastal Land in Kerala",
            description: "Coastal land suitable for coconut, banana and spice cultivation.",
            price: 7500.0,
            location: "Kochi",
            state: "Kerala",
            area: 5.0,
            soil_type: "Laterite Soil",
            water_source: "River",
            climate: "Tropical",
            crops: &["Coconut", "Banana", "Spices"],
            owner: ("owner2", "Thomas Mathew"),
            created_at: at(2023, 5, 2, 14, 45),
        }),
        plot(Plot {
            id: "land-3",
            title: "15 Acre Black Soil Land in Maharashtra",
            description: "Large plot with rich black cotton soil ideal for cotton and soybean.",
            price: 4500.0,
            location: "Nagpur",
            state: "Maharashtra",
            area: 15.0,
            soil_type: "Black Soil",
            water_source: "Borewell",
            climate: "Semi-arid",
            crops: &["Cotton", "Soybean"],
            owner: ("owner3", "Sunil Deshmukh"),
            created_at: at(2023, 5, 20, 9, 0),
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn sample_ids_are_unique_and_listings_valid() {
        let listings = sample_listings();
        let ids: HashSet<_> = listings.iter().map(|l| l.id.clone()).collect();
        assert_eq!(ids.len(), listings.len());

        for listing in &listings {
            assert!(listing.price >= 0.0);
            assert!(listing.availability.map_or(true, |a| a.is_ordered()));
            assert!(listing.created_at.timestamp() > 0);
        }
    }
}
