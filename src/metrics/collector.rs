use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::stores::hotel_store::HotelStore;
use crate::stores::user_store::UserStore;

pub struct Metrics {
    pub registrations: AtomicU64,
    pub successful_logins: AtomicU64,
    pub failed_logins: AtomicU64,
    pub rejected_sessions: AtomicU64,
    pub hotels_created: AtomicU64,
    pub hotels_updated: AtomicU64,
    pub images_uploaded: AtomicU64,
    pub failed_ingestions: AtomicU64,
    pub start_time: i64,
}

#[derive(Debug, Clone, Serialize, serde::Deserialize)]
pub struct MetricsSnapshot {
    pub registrations: u64,
    pub successful_logins: u64,
    pub failed_logins: u64,
    pub login_success_rate: f64,
    pub rejected_sessions: u64,
    pub hotels_created: u64,
    pub hotels_updated: u64,
    pub images_uploaded: u64,
    pub failed_ingestions: u64,
    #[serde(rename = "stored_users")]
    pub users: usize,
    #[serde(rename = "stored_hotels")]
    pub hotels: usize,
    pub uptime_seconds: i64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            registrations: AtomicU64::new(0),
            successful_logins: AtomicU64::new(0),
            failed_logins: AtomicU64::new(0),
            rejected_sessions: AtomicU64::new(0),
            hotels_created: AtomicU64::new(0),
            hotels_updated: AtomicU64::new(0),
            images_uploaded: AtomicU64::new(0),
            failed_ingestions: AtomicU64::new(0),
            start_time: chrono::Utc::now().timestamp(),
        }
    }

    pub fn increment_registrations(&self) {
        self.registrations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_successful_logins(&self) {
        self.successful_logins.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failed_logins(&self) {
        self.failed_logins.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rejected_sessions(&self) {
        self.rejected_sessions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_hotels_created(&self) {
        self.hotels_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_hotels_updated(&self) {
        self.hotels_updated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_images_uploaded(&self, count: usize) {
        self.images_uploaded.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn increment_failed_ingestions(&self) {
        self.failed_ingestions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self, users: &UserStore, hotels: &HotelStore) -> MetricsSnapshot {
        let successful_logins = self.successful_logins.load(Ordering::Relaxed);
        let failed_logins = self.failed_logins.load(Ordering::Relaxed);
        let attempts = successful_logins + failed_logins;

        let login_success_rate = if attempts > 0 {
            (successful_logins as f64 / attempts as f64) * 100.0
        } else {
            0.0
        };

        MetricsSnapshot {
            registrations: self.registrations.load(Ordering::Relaxed),
            successful_logins,
            failed_logins,
            login_success_rate,
            rejected_sessions: self.rejected_sessions.load(Ordering::Relaxed),
            hotels_created: self.hotels_created.load(Ordering::Relaxed),
            hotels_updated: self.hotels_updated.load(Ordering::Relaxed),
            images_uploaded: self.images_uploaded.load(Ordering::Relaxed),
            failed_ingestions: self.failed_ingestions.load(Ordering::Relaxed),
            users: users.len(),
            hotels: hotels.len(),
            uptime_seconds: chrono::Utc::now().timestamp() - self.start_time,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
