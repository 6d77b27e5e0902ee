use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;

use crate::core::config::ImageHostConfig;

/// Remote image hosting. Takes a base64 data URI and returns the public URL of
/// the stored image.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, data_uri: &str) -> Result<String>;
}

/// Signed-upload client for a Cloudinary-compatible image host
pub struct CloudImageHost {
    client: reqwest::Client,
    upload_url: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: Option<String>,
}

impl CloudImageHost {
    pub fn new(config: &ImageHostConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            upload_url: config.upload_url.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    /// hex(sha256("timestamp=<ts><secret>")): the only signed parameter is the timestamp
    fn sign(&self, timestamp: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("timestamp={}{}", timestamp, self.api_secret).as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl ImageHost for CloudImageHost {
    async fn upload(&self, data_uri: &str) -> Result<String> {
        let timestamp = Utc::now().timestamp();
        let timestamp_str = timestamp.to_string();
        let signature = self.sign(timestamp);

        let form = [
            ("file", data_uri),
            ("api_key", self.api_key.as_str()),
            ("timestamp", timestamp_str.as_str()),
            ("signature_algorithm", "sha256"),
            ("signature", signature.as_str()),
        ];

        let response = self
            .client
            .post(&self.upload_url)
            .form(&form)
            .send()
            .await
            .context("Failed to send upload to image host")?;

        if !response.status().is_success() {
            bail!("Image host returned error status: {}", response.status());
        }

        let body = response
            .json::<UploadResponse>()
            .await
            .context("Failed to parse image host response")?;

        match body.url {
            Some(url) if !url.is_empty() => Ok(url),
            _ => bail!("Image host response did not include a url"),
        }
    }
}
