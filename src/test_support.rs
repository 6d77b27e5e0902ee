// Shared fixtures for unit and router tests

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use axum::{body::Body, response::Response};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use http_body_util::BodyExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use crate::api::image_host::ImageHost;
use crate::core::config::{
    AdminConfig, AuthConfig, Config, Environment, ImageHostConfig, LoggingConfig, ServerConfig,
    StorageConfig, UploadConfig,
};
use crate::core::state::AppState;
use crate::images::pipeline::ImageFile;
use crate::models::account::RegisterRequest;
use crate::models::hotel::HotelDetails;
use crate::models::user::UserId;
use crate::security::session::SESSION_COOKIE;
use crate::wal::wal::Wal;

pub const TEST_ADMIN_KEY: &str = "test-api-key";
pub const TEST_PASSWORD: &str = "password123";

/// In-memory image host.
///
/// The payload of every uploaded file is interpreted as its name. A name
/// containing `delay=<ms>` sleeps that long before answering; a name starting
/// with `fail` is rejected. Everything else is stored under [`Self::url_for`].
#[derive(Default)]
pub struct FakeImageHost {
    pub calls: AtomicUsize,
    completed: Mutex<Vec<String>>,
    seen: Mutex<Vec<String>>,
}

impl FakeImageHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(name: &str) -> ImageFile {
        ImageFile::new(name.as_bytes().to_vec(), "image/png")
    }

    pub fn url_for(name: &str) -> String {
        format!("https://img.test/{}", name)
    }

    /// Names of settled uploads, failures included, in the order they settled
    pub fn completion_order(&self) -> Vec<String> {
        self.completed.lock().map(|names| names.clone()).unwrap_or_default()
    }

    pub fn seen_uris(&self) -> Vec<String> {
        self.seen.lock().map(|uris| uris.clone()).unwrap_or_default()
    }

    fn delay_of(name: &str) -> Option<Duration> {
        name.split(';')
            .find_map(|part| part.strip_prefix("delay="))
            .and_then(|ms| ms.parse().ok())
            .map(Duration::from_millis)
    }
}

#[async_trait]
impl ImageHost for FakeImageHost {
    async fn upload(&self, data_uri: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(data_uri.to_string());
        }

        let (_, payload) = data_uri
            .split_once(";base64,")
            .ok_or_else(|| anyhow!("not a base64 data URI"))?;
        let name = String::from_utf8(STANDARD.decode(payload)?).context("payload is not a name")?;

        if let Some(delay) = Self::delay_of(&name) {
            tokio::time::sleep(delay).await;
        }

        if let Ok(mut completed) = self.completed.lock() {
            completed.push(name.clone());
        }

        if name.starts_with("fail") {
            bail!("image host rejected {}", name);
        }

        Ok(Self::url_for(&name))
    }
}

pub fn sample_details(name: &str) -> HotelDetails {
    HotelDetails {
        name: name.to_string(),
        city: "Lisbon".to_string(),
        country: "Portugal".to_string(),
        description: "Rooms over the river".to_string(),
        hotel_type: "Boutique".to_string(),
        star_rating: 4,
        price_per_night: 120.0,
        facilities: vec!["Free WiFi".to_string(), "Parking".to_string()],
        adult_count: 2,
        child_count: 1,
    }
}

pub fn create_test_config(wal_path: PathBuf) -> Config {
    Config {
        server: ServerConfig {
            port: Some(7000),
            unix_socket: None,
            num_threads: 2,
            environment: Environment::Development,
            frontend_url: None,
        },
        auth: AuthConfig {
            jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
            bcrypt_cost: 4,
        },
        uploads: UploadConfig {
            max_files: 6,
            max_file_size: 1024 * 1024,
        },
        image_host: ImageHostConfig {
            upload_url: "http://127.0.0.1:9/upload".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            timeout_secs: 5,
        },
        storage: StorageConfig { wal_path },
        admin: AdminConfig {
            api_key: TEST_ADMIN_KEY.to_string(),
        },
        logging: LoggingConfig {
            level: "info".to_string(),
            format: "json".to_string(),
            console: false,
        },
    }
}

/// A full application wired to a [`FakeImageHost`] and a throwaway WAL
pub struct TestContext {
    pub state: Arc<AppState>,
    pub host: Arc<FakeImageHost>,
    _dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let wal_path = temp_dir.path().join("test.wal");
        let mut config = create_test_config(wal_path.clone());
        adjust(&mut config);

        let wal = Wal::new(wal_path).unwrap();
        let host = Arc::new(FakeImageHost::new());
        let state = AppState::new(config, wal, Arc::clone(&host) as Arc<dyn ImageHost>);

        Self {
            state: Arc::new(state),
            host,
            _dir: temp_dir,
        }
    }

    pub fn router(&self) -> axum::Router {
        crate::core::routes::build_router(Arc::clone(&self.state))
    }

    /// Register an account directly through the service and return its id with
    /// a ready-to-send `Cookie` header value.
    pub async fn signed_in_user(&self, email: &str) -> (UserId, String) {
        let user = self
            .state
            .accounts
            .register(RegisterRequest {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: email.to_string(),
                password: TEST_PASSWORD.to_string(),
            })
            .await
            .unwrap();
        let token = self.state.tokens.issue(user.id).unwrap();

        (user.id, cookie_header(&token))
    }
}

pub fn cookie_header(token: &str) -> String {
    format!("{}={}", SESSION_COOKIE, token)
}

/// Pull the session token out of a response's `Set-Cookie` header
pub fn session_token(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(axum::http::header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| value.strip_prefix(&format!("{}=", SESSION_COOKIE)))
        .map(|rest| rest.split(';').next().unwrap_or_default().to_string())
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = Body::new(response.into_body()).collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Hand-built `multipart/form-data` body
pub struct MultipartBody {
    boundary: &'static str,
    buf: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: "hotel-form-boundary",
            buf: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: Option<&str>, bytes: &[u8]) -> Self {
        let mut head = format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            self.boundary, name, filename
        );
        if let Some(content_type) = content_type {
            head.push_str(&format!("Content-Type: {}\r\n", content_type));
        }
        head.push_str("\r\n");

        self.buf.extend_from_slice(head.as_bytes());
        self.buf.extend_from_slice(bytes);
        self.buf.extend_from_slice(b"\r\n");
        self
    }

    /// Text fields of a complete, valid hotel form
    pub fn hotel_fields(self, name: &str) -> Self {
        self.text("name", name)
            .text("city", "Lisbon")
            .text("country", "Portugal")
            .text("description", "Rooms over the river")
            .text("type", "Boutique")
            .text("pricePerNight", "120")
            .text("starRating", "4")
            .text("facilities", "Free WiFi")
            .text("facilities", "Parking")
            .text("adultCount", "2")
            .text("childCount", "1")
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn finish(mut self) -> (String, Vec<u8>) {
        let content_type = self.content_type();
        self.buf
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (content_type, self.buf)
    }
}
