//! Transient state of a listing-creation form
//!
//! Fields are addressed through [`FieldPath`] rather than by name, so a
//! nested availability date or a single feature entry is an explicit variant.

use crate::error::FormError;
use crate::form::preview::{ImageFile, PreviewRef};
use crate::models::ListingKind;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Single-valued text fields of the draft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarField {
    Title,
    Description,
    Price,
    Location,
    State,
    Area,
    SoilType,
    WaterSource,
    Climate,
    Category,
    Brand,
    Model,
    Year,
    Condition,
}

/// Ends of the availability window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    Start,
    End,
}

/// Ordered, growable list fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListField {
    Features,
    /// Tag-like: values are unique
    Crops,
}

impl fmt::Display for ListField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListField::Features => f.write_str("feature"),
            ListField::Crops => f.write_str("crop"),
        }
    }
}

/// Address of an editable value in the draft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPath {
    Scalar(ScalarField),
    Availability(DateBound),
    ListItem(ListField, usize),
}

/// Keys of the validation error map
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    Title,
    Description,
    Price,
    Location,
    State,
    Area,
    SoilType,
    WaterSource,
    Availability,
    Images,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Title => "title",
            FormField::Description => "description",
            FormField::Price => "price",
            FormField::Location => "location",
            FormField::State => "state",
            FormField::Area => "area",
            FormField::SoilType => "soilType",
            FormField::WaterSource => "waterSource",
            FormField::Availability => "availability",
            FormField::Images => "images",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field → message. A missing key means the field is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<FormField, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: FormField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: FormField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = FormField> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

/// Where the form is in its lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormPhase {
    #[default]
    Editing,
    EditingWithErrors,
    Submitting,
    Submitted,
    EditingWithSubmitError,
}

/// Raw availability inputs, empty when unset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftAvailability {
    pub start: String,
    pub end: String,
}

/// Writable listing fields exactly as typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub price: String,
    pub location: String,
    pub state: String,
    pub area: String,
    pub soil_type: String,
    pub water_source: String,
    pub climate: String,
    pub category: String,
    pub brand: String,
    pub model: String,
    pub year: String,
    pub condition: String,
    pub features: Vec<String>,
    pub crops: Vec<String>,
    pub availability: DraftAvailability,
}

impl Default for ListingDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            price: String::new(),
            location: String::new(),
            state: String::new(),
            area: String::new(),
            soil_type: String::new(),
            water_source: String::new(),
            climate: String::new(),
            category: String::new(),
            brand: String::new(),
            model: String::new(),
            year: String::new(),
            condition: String::new(),
            // The form opens with one blank feature row
            features: vec![String::new()],
            crops: Vec::new(),
            availability: DraftAvailability::default(),
        }
    }
}

impl ListingDraft {
    fn scalar_mut(&mut self, field: ScalarField) -> &mut String {
        match field {
            ScalarField::Title => &mut self.title,
            ScalarField::Description => &mut self.description,
            ScalarField::Price => &mut self.price,
            ScalarField::Location => &mut self.location,
            ScalarField::State => &mut self.state,
            ScalarField::Area => &mut self.area,
            ScalarField::SoilType => &mut self.soil_type,
            ScalarField::WaterSource => &mut self.water_source,
            ScalarField::Climate => &mut self.climate,
            ScalarField::Category => &mut self.category,
            ScalarField::Brand => &mut self.brand,
            ScalarField::Model => &mut self.model,
            ScalarField::Year => &mut self.year,
            ScalarField::Condition => &mut self.condition,
        }
    }

    pub fn scalar(&self, field: ScalarField) -> &str {
        match field {
            ScalarField::Title => &self.title,
            ScalarField::Description => &self.description,
            ScalarField::Price => &self.price,
            ScalarField::Location => &self.location,
            ScalarField::State => &self.state,
            ScalarField::Area => &self.area,
            ScalarField::SoilType => &self.soil_type,
            ScalarField::WaterSource => &self.water_source,
            ScalarField::Climate => &self.climate,
            ScalarField::Category => &self.category,
            ScalarField::Brand => &self.brand,
            ScalarField::Model => &self.model,
            ScalarField::Year => &self.year,
            ScalarField::Condition => &self.condition,
        }
    }

    pub fn list(&self, field: ListField) -> &[String] {
        match field {
            ListField::Features => &self.features,
            ListField::Crops => &self.crops,
        }
    }

    fn list_mut(&mut self, field: ListField) -> &mut Vec<String> {
        match field {
            ListField::Features => &mut self.features,
            ListField::Crops => &mut self.crops,
        }
    }

    /// Replace the value at `path`, leaving every other field untouched
    pub fn set(&mut self, path: FieldPath, value: String) -> Result<(), FormError> {
        match path {
            FieldPath::Scalar(field) => *self.scalar_mut(field) = value,
            FieldPath::Availability(DateBound::Start) => self.availability.start = value,
            FieldPath::Availability(DateBound::End) => self.availability.end = value,
            FieldPath::ListItem(field, index) => {
                let list = self.list_mut(field);
                let len = list.len();
                let slot = list
                    .get_mut(index)
                    .ok_or(FormError::IndexOutOfRange { field, index, len })?;
                *slot = value;
            }
        }
        Ok(())
    }

    /// Append to a list field. Crops are trimmed and deduplicated, so
    /// adding a blank or existing crop is a no-op that returns false.
    pub fn push(&mut self, field: ListField, value: String) -> bool {
        match field {
            ListField::Features => {
                self.features.push(value);
                true
            }
            ListField::Crops => {
                let crop = value.trim();
                if crop.is_empty() || self.crops.iter().any(|c| c == crop) {
                    return false;
                }
                self.crops.push(crop.to_string());
                true
            }
        }
    }

    /// Remove and return the element at `index`; later elements shift down
    pub fn remove(&mut self, field: ListField, index: usize) -> Result<String, FormError> {
        let list = self.list_mut(field);
        if index >= list.len() {
            return Err(FormError::IndexOutOfRange {
                field,
                index,
                len: list.len(),
            });
        }
        Ok(list.remove(index))
    }
}

/// An attached image and the preview shown for it
#[derive(Debug)]
pub struct ImageAttachment {
    pub file: ImageFile,
    pub preview: PreviewRef,
}

/// Everything the form holds between mount and discard
#[derive(Debug)]
pub struct ListingFormState {
    pub kind: ListingKind,
    pub draft: ListingDraft,
    pub errors: FieldErrors,
    /// Generic message from the last failed store call, kept apart from field errors
    pub submit_error: Option<String>,
    pub submitting: bool,
    pub phase: FormPhase,
    pub images: Vec<ImageAttachment>,
}

impl ListingFormState {
    pub fn new(kind: ListingKind) -> Self {
        Self {
            kind,
            draft: ListingDraft::default(),
            errors: FieldErrors::default(),
            submit_error: None,
            submitting: false,
            phase: FormPhase::Editing,
            images: Vec::new(),
        }
    }
}
