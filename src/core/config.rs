use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub uploads: UploadConfig,
    pub image_host: ImageHostConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub admin: AdminConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: Option<u16>,
    pub unix_socket: Option<PathBuf>,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
    #[serde(default = "default_environment")]
    pub environment: Environment,
    /// Browser origin allowed to call the API with cookies
    pub frontend_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageHostConfig {
    pub upload_url: String,
    pub api_key: String,
    pub api_secret: String,
    #[serde(default = "default_upload_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_wal_path")]
    pub wal_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub console: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            max_file_size: default_max_file_size(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            wal_path: default_wal_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            console: false,
        }
    }
}

fn default_num_threads() -> usize {
    num_cpus::get()
}

fn default_environment() -> Environment {
    Environment::Development
}

fn default_bcrypt_cost() -> u32 {
    8
}

fn default_max_files() -> usize {
    6
}

fn default_max_file_size() -> usize {
    5 * 1024 * 1024 // 5 MiB
}

fn default_upload_timeout() -> u64 {
    30
}

fn default_wal_path() -> PathBuf {
    PathBuf::from("hotels.wal")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    /// Session cookies only carry the `Secure` flag in production
    pub fn secure_cookies(&self) -> bool {
        self.server.environment == Environment::Production
    }

    /// Upper bound for a multipart hotel request: every allowed file at full size plus
    /// headroom for the text fields.
    pub fn max_hotel_body_bytes(&self) -> usize {
        self.uploads.max_files * self.uploads.max_file_size + 1024 * 1024
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port.is_none() && self.server.unix_socket.is_none() {
            bail!("Either port or unix_socket must be specified in server config");
        }

        if self.server.port == Some(0) {
            bail!("Server port must be greater than 0");
        }

        if self.server.num_threads == 0 {
            bail!("num_threads must be greater than 0");
        }

        if self.auth.jwt_secret.len() < 32 {
            bail!("jwt_secret must be at least 32 bytes long");
        }

        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            bail!(
                "bcrypt_cost must be between 4 and 31, got {}",
                self.auth.bcrypt_cost
            );
        }

        if self.uploads.max_files == 0 {
            bail!("max_files must be greater than 0");
        }

        if self.uploads.max_file_size == 0 {
            bail!("max_file_size must be greater than 0");
        }

        if self.image_host.upload_url.is_empty() {
            bail!("image_host.upload_url must not be empty");
        }

        if self.image_host.api_key.is_empty() || self.image_host.api_secret.is_empty() {
            bail!("image_host.api_key and image_host.api_secret must not be empty");
        }

        if self.image_host.timeout_secs == 0 {
            bail!("image_host.timeout_secs must be greater than 0");
        }

        if self.admin.api_key.is_empty() {
            bail!("admin.api_key must not be empty");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        Ok(())
    }
}
