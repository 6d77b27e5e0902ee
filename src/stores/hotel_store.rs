use crate::core::error::StoreError;
use crate::models::hotel::{Hotel, HotelDetails, HotelId};
use crate::models::user::UserId;
use crate::wal::wal::{Wal, WalOperation};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;

/// Hotel records keyed by id. Reads are always scoped to an owner.
pub struct HotelStore {
    hotels: DashMap<HotelId, Arc<Hotel>>,
    wal: Arc<Wal>,
}

impl HotelStore {
    pub fn new(wal: Arc<Wal>) -> Self {
        Self {
            hotels: DashMap::new(),
            wal,
        }
    }

    /// Insert or replace a whole record. The entry stays locked from the log
    /// append until the record is visible, so log order matches memory order.
    pub fn save(&self, hotel: Hotel) -> Result<Arc<Hotel>, StoreError> {
        let entry = self.hotels.entry(hotel.id);
        self.wal.log_operation(&WalOperation::PutHotel { hotel: hotel.clone() })?;
        let hotel = Arc::new(hotel);
        entry.insert(Arc::clone(&hotel));
        Ok(hotel)
    }

    /// Read-modify-write of one owned record under its entry lock.
    /// `Ok(None)` when the hotel is missing or belongs to someone else.
    fn modify_owned(
        &self,
        owner_id: UserId,
        hotel_id: HotelId,
        change: impl FnOnce(&mut Hotel),
    ) -> Result<Option<Arc<Hotel>>, StoreError> {
        let Some(mut slot) = self.hotels.get_mut(&hotel_id) else {
            return Ok(None);
        };
        if slot.owner_id != owner_id {
            return Ok(None);
        }

        let mut hotel = slot.value().as_ref().clone();
        change(&mut hotel);
        self.wal.log_operation(&WalOperation::PutHotel { hotel: hotel.clone() })?;

        let hotel = Arc::new(hotel);
        *slot.value_mut() = Arc::clone(&hotel);
        Ok(Some(hotel))
    }

    /// Overwrite the editable fields of an owned hotel, leaving its images alone
    pub fn update_details(
        &self,
        owner_id: UserId,
        hotel_id: HotelId,
        details: HotelDetails,
        now: DateTime<Utc>,
    ) -> Result<Option<Arc<Hotel>>, StoreError> {
        self.modify_owned(owner_id, hotel_id, |hotel| hotel.apply_details(details, now))
    }

    /// Set the image list of an owned hotel and nothing else
    pub fn replace_images(
        &self,
        owner_id: UserId,
        hotel_id: HotelId,
        image_urls: Vec<String>,
    ) -> Result<Option<Arc<Hotel>>, StoreError> {
        self.modify_owned(owner_id, hotel_id, |hotel| hotel.image_urls = image_urls)
    }

    pub fn restore(&self, hotel: Hotel) {
        self.hotels.insert(hotel.id, Arc::new(hotel));
    }

    /// A hotel owned by someone else is reported exactly like a missing one
    pub fn find_owned(&self, owner_id: UserId, hotel_id: HotelId) -> Option<Arc<Hotel>> {
        self.hotels
            .get(&hotel_id)
            .filter(|entry| entry.value().owner_id == owner_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// All hotels of one owner, most recently updated first
    pub fn list_by_owner(&self, owner_id: UserId) -> Vec<Arc<Hotel>> {
        let mut hotels: Vec<Arc<Hotel>> = self
            .hotels
            .iter()
            .filter(|entry| entry.value().owner_id == owner_id)
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        hotels.sort_by(|a, b| b.last_updated.cmp(&a.last_updated).then(a.id.cmp(&b.id)));
        hotels
    }

    pub fn snapshot(&self) -> Vec<Hotel> {
        self.hotels.iter().map(|entry| entry.value().as_ref().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.hotels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hotels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn store() -> (HotelStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let wal = Wal::new(temp_dir.path().join("hotels.wal")).unwrap();
        (HotelStore::new(Arc::new(wal)), temp_dir)
    }

    fn hotel(owner: UserId, name: &str, minutes_ago: i64) -> Hotel {
        Hotel::new(
            owner,
            HotelDetails {
                name: name.to_string(),
                city: "Rome".to_string(),
                country: "Italy".to_string(),
                description: "Near the forum".to_string(),
                hotel_type: "Family".to_string(),
                star_rating: 3,
                price_per_night: 150.0,
                facilities: vec!["Spa".to_string()],
                adult_count: 2,
                child_count: 2,
            },
            vec!["https://img.test/1".to_string()],
            Utc::now() - Duration::minutes(minutes_ago),
        )
    }

    #[test]
    fn test_find_owned_hides_other_owners() {
        let (store, _dir) = store();
        let owner_a = Uuid::new_v4();
        let owner_b = Uuid::new_v4();
        let saved = store.save(hotel(owner_a, "A's place", 0)).unwrap();

        assert!(store.find_owned(owner_a, saved.id).is_some());
        assert!(store.find_owned(owner_b, saved.id).is_none());
        assert!(store.find_owned(owner_a, Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_list_by_owner_filters_and_orders() {
        let (store, _dir) = store();
        let owner = Uuid::new_v4();
        store.save(hotel(owner, "older", 30)).unwrap();
        store.save(hotel(owner, "newer", 1)).unwrap();
        store.save(hotel(Uuid::new_v4(), "someone else", 0)).unwrap();

        let names: Vec<String> = store
            .list_by_owner(owner)
            .iter()
            .map(|h| h.name.clone())
            .collect();
        assert_eq!(names, vec!["newer".to_string(), "older".to_string()]);
    }

    #[test]
    fn test_save_replaces_record() {
        let (store, _dir) = store();
        let owner = Uuid::new_v4();
        let mut record = hotel(owner, "first", 0);
        store.save(record.clone()).unwrap();

        record.name = "second".to_string();
        store.save(record.clone()).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.find_owned(owner, record.id).unwrap().name, "second");
        assert_eq!(store.wal.replay().unwrap().len(), 2);
    }

    #[test]
    fn test_replace_images_keeps_current_fields() {
        let (store, _dir) = store();
        let owner = Uuid::new_v4();
        let saved = store.save(hotel(owner, "first", 0)).unwrap();

        let mut renamed = saved.as_ref().clone();
        renamed.name = "renamed".to_string();
        store.save(renamed).unwrap();

        let updated = store
            .replace_images(owner, saved.id, vec!["https://img.test/2".to_string()])
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "renamed");
        assert_eq!(updated.image_urls, vec!["https://img.test/2".to_string()]);
        assert_eq!(store.find_owned(owner, saved.id).unwrap().as_ref(), updated.as_ref());

        // the logged record matches memory
        let last = store.wal.replay().unwrap().pop().unwrap();
        assert_eq!(last, WalOperation::PutHotel { hotel: updated.as_ref().clone() });
    }

    #[test]
    fn test_owned_updates_skip_foreign_and_missing() {
        let (store, _dir) = store();
        let owner = Uuid::new_v4();
        let saved = store.save(hotel(owner, "mine", 0)).unwrap();

        assert!(store
            .replace_images(Uuid::new_v4(), saved.id, Vec::new())
            .unwrap()
            .is_none());
        assert!(store
            .update_details(owner, Uuid::new_v4(), HotelDetails {
                name: "ghost".to_string(),
                ..details_of(&saved)
            }, Utc::now())
            .unwrap()
            .is_none());
        assert_eq!(store.find_owned(owner, saved.id).unwrap().image_urls.len(), 1);
        assert_eq!(store.wal.replay().unwrap().len(), 1);
    }

    fn details_of(hotel: &Hotel) -> HotelDetails {
        HotelDetails {
            name: hotel.name.clone(),
            city: hotel.city.clone(),
            country: hotel.country.clone(),
            description: hotel.description.clone(),
            hotel_type: hotel.hotel_type.clone(),
            star_rating: hotel.star_rating,
            price_per_night: hotel.price_per_night,
            facilities: hotel.facilities.clone(),
            adult_count: hotel.adult_count,
            child_count: hotel.child_count,
        }
    }

    #[test]
    fn test_update_details_keeps_images() {
        let (store, _dir) = store();
        let owner = Uuid::new_v4();
        let saved = store.save(hotel(owner, "before", 5)).unwrap();
        store
            .replace_images(owner, saved.id, vec!["https://img.test/new".to_string()])
            .unwrap();

        let updated = store
            .update_details(owner, saved.id, HotelDetails {
                name: "after".to_string(),
                ..details_of(&saved)
            }, Utc::now())
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "after");
        assert_eq!(updated.image_urls, vec!["https://img.test/new".to_string()]);
        assert!(updated.last_updated > saved.last_updated);
    }
}
