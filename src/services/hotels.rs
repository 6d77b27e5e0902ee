use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::core::error::{HotelError, ValidationErrors};
use crate::images::pipeline::{ImageFile, ImageIngestor};
use crate::metrics::collector::Metrics;
use crate::models::hotel::{Hotel, HotelDetails, HotelId};
use crate::models::user::UserId;
use crate::stores::hotel_store::HotelStore;

/// Create/update orchestration for hotel listings.
///
/// Every operation is scoped to the calling owner: a hotel that belongs to
/// somebody else is reported as [`HotelError::NotFound`], never as forbidden.
pub struct HotelManager {
    store: Arc<HotelStore>,
    ingestor: ImageIngestor,
    metrics: Arc<Metrics>,
}

impl HotelManager {
    pub fn new(store: Arc<HotelStore>, ingestor: ImageIngestor, metrics: Arc<Metrics>) -> Self {
        Self {
            store,
            ingestor,
            metrics,
        }
    }

    async fn ingest(&self, files: &[ImageFile]) -> Result<Vec<String>, HotelError> {
        match self.ingestor.ingest(files).await {
            Ok(urls) => {
                self.metrics.add_images_uploaded(urls.len());
                Ok(urls)
            }
            Err(e) => {
                self.metrics.increment_failed_ingestions();
                Err(e.into())
            }
        }
    }

    #[instrument(name = "Creating hotel", skip(self, details, files), fields(files = files.len()))]
    pub async fn create_hotel(
        &self,
        owner_id: UserId,
        details: HotelDetails,
        files: Vec<ImageFile>,
    ) -> Result<Arc<Hotel>, HotelError> {
        if files.is_empty() {
            return Err(ValidationErrors::single("imageFiles", "At least one image is required").into());
        }

        let image_urls = self.ingest(&files).await?;
        let hotel = Hotel::new(owner_id, details, image_urls, Utc::now());
        let hotel = self.store.save(hotel)?;

        self.metrics.increment_hotels_created();
        info!(hotel_id = %hotel.id, images = hotel.image_urls.len(), "Hotel created");
        Ok(hotel)
    }

    /// Update a hotel in two persisted steps.
    ///
    /// The scalar fields are saved first; the new image batch is uploaded
    /// afterwards and only the image list is written in a second step, on top of
    /// whatever the record holds by then. When the upload fails the first write
    /// stays committed and the image list is left untouched. New images come
    /// first, followed by the retained ones.
    #[instrument(
        name = "Updating hotel",
        skip(self, details, retained_image_urls, files),
        fields(retained = retained_image_urls.len(), files = files.len())
    )]
    pub async fn update_hotel(
        &self,
        owner_id: UserId,
        hotel_id: HotelId,
        details: HotelDetails,
        retained_image_urls: Vec<String>,
        files: Vec<ImageFile>,
    ) -> Result<Arc<Hotel>, HotelError> {
        if files.is_empty() && retained_image_urls.is_empty() {
            return Err(ValidationErrors::single("imageUrls", "At least one image is required").into());
        }

        self.store
            .update_details(owner_id, hotel_id, details, Utc::now())?
            .ok_or(HotelError::NotFound)?;

        let new_urls = self.ingest(&files).await.inspect_err(|_| {
            warn!(%hotel_id, "Image ingestion failed after field update was saved");
        })?;

        let mut image_urls = new_urls;
        image_urls.extend(retained_image_urls);

        let hotel = self
            .store
            .replace_images(owner_id, hotel_id, image_urls)?
            .ok_or(HotelError::NotFound)?;

        self.metrics.increment_hotels_updated();
        info!(%hotel_id, images = hotel.image_urls.len(), "Hotel updated");
        Ok(hotel)
    }

    pub fn list_hotels_by_owner(&self, owner_id: UserId) -> Vec<Arc<Hotel>> {
        self.store.list_by_owner(owner_id)
    }

    pub fn get_hotel_by_owner_and_id(&self, owner_id: UserId, hotel_id: HotelId) -> Result<Arc<Hotel>, HotelError> {
        self.store
            .find_owned(owner_id, hotel_id)
            .ok_or(HotelError::NotFound)
    }
}
