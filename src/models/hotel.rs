use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserId;

pub type HotelId = Uuid;

/// The owner-editable part of a hotel listing, already validated
#[derive(Clone, Debug, PartialEq)]
pub struct HotelDetails {
    pub name: String,
    pub city: String,
    pub country: String,
    pub description: String,
    pub hotel_type: String,
    pub star_rating: u8,
    pub price_per_night: f64,
    pub facilities: Vec<String>,
    pub adult_count: u32,
    pub child_count: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: HotelId,
    #[serde(rename = "userId")]
    pub owner_id: UserId,
    pub name: String,
    pub city: String,
    pub country: String,
    pub description: String,
    #[serde(rename = "type")]
    pub hotel_type: String,
    pub star_rating: u8,
    pub price_per_night: f64,
    pub facilities: Vec<String>,
    pub adult_count: u32,
    pub child_count: u32,
    /// Never empty once a create or update has succeeded
    pub image_urls: Vec<String>,
    pub last_updated: DateTime<Utc>,
}

impl Hotel {
    pub fn new(owner_id: UserId, details: HotelDetails, image_urls: Vec<String>, now: DateTime<Utc>) -> Self {
        let HotelDetails {
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
        } = details;

        Self {
            id: Uuid::new_v4(),
            owner_id,
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
            image_urls,
            last_updated: now,
        }
    }

    /// Overwrite every editable field except the image set
    pub fn apply_details(&mut self, details: HotelDetails, now: DateTime<Utc>) {
        self.name = details.name;
        self.city = details.city;
        self.country = details.country;
        self.description = details.description;
        self.hotel_type = details.hotel_type;
        self.star_rating = details.star_rating;
        self.price_per_night = details.price_per_night;
        self.facilities = details.facilities;
        self.adult_count = details.adult_count;
        self.child_count = details.child_count;
        self.last_updated = now;
    }
}
