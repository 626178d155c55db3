use crate::form::state::{DraftAvailability, FieldErrors, FormField, ListingDraft};
use crate::models::{
    Availability, EquipmentDetails, LandDetails, ListingDetails, ListingKind, NewListing, Owner,
};
use chrono::NaiveDate;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Check a draft. Every failing field gets exactly one message.
pub fn validate(kind: ListingKind, draft: &ListingDraft, image_count: usize) -> FieldErrors {
    let mut errors = FieldErrors::default();

    if draft.title.trim().is_empty() {
        errors.insert(FormField::Title, "Title is required");
    }
    if draft.description.trim().is_empty() {
        errors.insert(FormField::Description, "Description is required");
    }
    if !positive(&draft.price) {
        errors.insert(FormField::Price, "Price must be greater than 0");
    }
    if draft.location.trim().is_empty() {
        errors.insert(FormField::Location, "Location is required");
    }

    match parse_availability(&draft.availability) {
        Ok(window) if !window.is_ordered() => {
            errors.insert(FormField::Availability, "End date must be after start date");
        }
        Ok(_) => {}
        Err(()) => {
            errors.insert(FormField::Availability, "Dates must use the YYYY-MM-DD format");
        }
    }

    if image_count == 0 {
        errors.insert(FormField::Images, "At least one image is required");
    }

    if kind == ListingKind::Land {
        if draft.state.trim().is_empty() {
            errors.insert(FormField::State, "State is required");
        }
        if !positive(&draft.area) {
            errors.insert(FormField::Area, "Area must be greater than 0");
        }
        if draft.soil_type.trim().is_empty() {
            errors.insert(FormField::SoilType, "Soil type is required");
        }
        if draft.water_source.trim().is_empty() {
            errors.insert(FormField::WaterSource, "Water source is required");
        }
    }

    errors
}

/// Build the store payload from a draft that passed [`validate`].
pub fn normalize(
    kind: ListingKind,
    draft: &ListingDraft,
    images: Vec<String>,
    owner: Owner,
) -> NewListing {
    let details = match kind {
        ListingKind::Land => ListingDetails::Land(LandDetails {
            area: number(&draft.area).unwrap_or_default(),
            soil_type: draft.soil_type.trim().to_string(),
            water_source: draft.water_source.trim().to_string(),
            climate: optional(&draft.climate),
            crops: draft.crops.clone(),
        }),
        ListingKind::Equipment => ListingDetails::Equipment(EquipmentDetails {
            category: draft.category.trim().to_string(),
            brand: draft.brand.trim().to_string(),
            model: draft.model.trim().to_string(),
            year: draft.year.trim().parse().ok(),
            condition: draft.condition.trim().to_string(),
        }),
    };

    let availability = parse_availability(&draft.availability)
        .ok()
        .filter(|window| !window.is_empty());

    NewListing {
        title: draft.title.trim().to_string(),
        description: draft.description.trim().to_string(),
        price: number(&draft.price).unwrap_or_default(),
        location: draft.location.trim().to_string(),
        state: optional(&draft.state),
        details,
        features: draft
            .features
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect(),
        availability,
        images,
        owner,
    }
}

fn number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn positive(text: &str) -> bool {
    number(text).is_some_and(|n| n > 0.0)
}

fn optional(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn parse_date(text: &str) -> Result<Option<NaiveDate>, ()> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT).map(Some).map_err(|_| ())
}

fn parse_availability(raw: &DraftAvailability) -> Result<Availability, ()> {
    Ok(Availability {
        start_date: parse_date(&raw.start)?,
        end_date: parse_date(&raw.end)?,
    })
}
