use std::collections::HashMap;
use std::str::FromStr;

use crate::core::error::ValidationErrors;
use crate::models::hotel::HotelDetails;

const STAR_RATINGS: std::ops::RangeInclusive<u8> = 1..=5;

/// Text fields of a hotel multipart form, grouped by name. Indexed names such as
/// `facilities[2]` are folded into their base name in arrival order.
#[derive(Debug, Default)]
pub struct HotelFormFields {
    values: HashMap<String, Vec<String>>,
}

/// Strip a trailing `[...]` index from a form field name
pub fn base_field_name(name: &str) -> &str {
    match name.find('[') {
        Some(pos) if name.ends_with(']') => &name[..pos],
        _ => name,
    }
}

impl HotelFormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str, value: String) {
        self.values
            .entry(base_field_name(name).to_string())
            .or_default()
            .push(value);
    }

    fn first(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|values| values.first())
            .map(|value| value.trim())
    }

    /// Every value of a repeated field, blanks dropped
    pub fn all(&self, name: &str) -> Vec<String> {
        self.values
            .get(name)
            .map(|values| {
                values
                    .iter()
                    .map(|value| value.trim())
                    .filter(|value| !value.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn required_text(&self, name: &str, msg: &str, errors: &mut ValidationErrors) -> String {
        match self.first(name) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => {
                errors.push(name, msg);
                String::new()
            }
        }
    }

    fn required_number<T: FromStr + Default>(&self, name: &str, msg: &str, errors: &mut ValidationErrors) -> T {
        match self.first(name).and_then(|value| value.parse::<T>().ok()) {
            Some(value) => value,
            None => {
                errors.push(name, msg);
                T::default()
            }
        }
    }

    /// Check every editable field and collect all failures at once
    pub fn validate(&self) -> Result<HotelDetails, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = self.required_text("name", "Name is required", &mut errors);
        let city = self.required_text("city", "City is required", &mut errors);
        let country = self.required_text("country", "Country is required", &mut errors);
        let description = self.required_text("description", "Description is required", &mut errors);
        let hotel_type = self.required_text("type", "Hotel type is required", &mut errors);

        let price_per_night: f64 =
            self.required_number("pricePerNight", "Price per night must be a number", &mut errors);
        if !price_per_night.is_finite() || price_per_night < 0.0 {
            errors.push("pricePerNight", "Price per night must be a number");
        }

        let flagged = errors.0.len();
        let star_rating: u8 =
            self.required_number("starRating", "Star rating must be a number", &mut errors);
        if errors.0.len() == flagged && !STAR_RATINGS.contains(&star_rating) {
            errors.push("starRating", "Star rating must be between 1 and 5");
        }
        let adult_count: u32 =
            self.required_number("adultCount", "Adult count must be a number", &mut errors);
        let child_count: u32 =
            self.required_number("childCount", "Child count must be a number", &mut errors);

        let facilities = self.all("facilities");
        if facilities.is_empty() {
            errors.push("facilities", "Facilities is required");
        }

        errors.into_result(HotelDetails {
            name,
            city,
            country,
            description,
            hotel_type,
            star_rating,
            price_per_night,
            facilities,
            adult_count,
            child_count,
        })
    }
}
