// Application state (AppState)

use crate::api::image_host::ImageHost;
use crate::core::config::Config;
use crate::images::pipeline::ImageIngestor;
use crate::metrics::collector::Metrics;
use crate::security::token::TokenService;
use crate::services::accounts::AccountService;
use crate::services::hotels::HotelManager;
use crate::stores::{hotel_store::HotelStore, user_store::UserStore};
use crate::wal::wal::Wal;
use std::sync::Arc;

/// Shared application state
///
/// Built once at startup from the loaded [`Config`]; nothing below reads
/// configuration from the environment afterwards.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserStore>,

    pub hotels: Arc<HotelStore>,

    /// Session credential issuing and verification
    pub tokens: Arc<TokenService>,

    pub accounts: Arc<AccountService>,

    /// Hotel create/update orchestration
    pub hotel_manager: Arc<HotelManager>,

    pub metrics: Arc<Metrics>,

    /// Write-Ahead Log shared by both stores
    pub wal: Arc<Wal>,

    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, wal: Wal, image_host: Arc<dyn ImageHost>) -> Self {
        let config = Arc::new(config);
        let wal = Arc::new(wal);
        let metrics = Arc::new(Metrics::new());

        let users = Arc::new(UserStore::new(Arc::clone(&wal)));
        let hotels = Arc::new(HotelStore::new(Arc::clone(&wal)));
        let tokens = Arc::new(TokenService::new(config.auth.jwt_secret.as_bytes()));

        let accounts = Arc::new(AccountService::new(
            Arc::clone(&users),
            Arc::clone(&metrics),
            config.auth.bcrypt_cost,
        ));

        let hotel_manager = Arc::new(HotelManager::new(
            Arc::clone(&hotels),
            ImageIngestor::new(image_host),
            Arc::clone(&metrics),
        ));

        Self {
            users,
            hotels,
            tokens,
            accounts,
            hotel_manager,
            metrics,
            wal,
            config,
        }
    }
}
