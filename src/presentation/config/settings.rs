use std::time::Duration;

use config::{Config, ConfigError, File};
use serde::Deserialize;

use super::Environment;
use crate::application::services::{
    DEFAULT_HOSTED_RETENTION, DEFAULT_LOCAL_RETENTION, DEFAULT_POLL_INTERVAL, PollPolicy,
};
use crate::infrastructure::HttpTimeouts;
use crate::infrastructure::http_timeouts::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub dubbing: DubbingSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Layers `appsettings.<env>` (optional), `APP_*` variables and the legacy
    /// `PORT` / `ELEVENLABS_API_KEY` variables, in increasing precedence.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(
                File::with_name(&format!(
                    "appsettings.{}",
                    environment.as_str()
                ))
                .required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        if let Ok(port) = std::env::var("PORT") {
            builder = builder.set_override("server.port", port)?;
        }
        if let Ok(api_key) = std::env::var("ELEVENLABS_API_KEY") {
            builder = builder.set_override("dubbing.api_key", api_key)?;
        }

        builder.build()?.try_deserialize()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_upload_mb: usize,
}

impl ServerSettings {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_upload_mb: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DubbingProviderSetting {
    #[serde(rename = "elevenlabs")]
    ElevenLabs,
    Mock,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DubbingSettings {
    pub provider: DubbingProviderSetting,
    pub api_key: String,
    pub base_url: String,
    pub watermark: bool,
    pub poll_interval_secs: u64,
    pub max_poll_attempts: Option<u32>,
    pub max_poll_duration_secs: Option<u64>,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
}

impl DubbingSettings {
    pub fn poll_policy(&self) -> PollPolicy {
        let mut policy = PollPolicy::every(Duration::from_secs(self.poll_interval_secs));
        if let Some(attempts) = self.max_poll_attempts {
            policy = policy.with_max_attempts(attempts);
        }
        if let Some(secs) = self.max_poll_duration_secs {
            policy = policy.with_max_duration(Duration::from_secs(secs));
        }
        policy
    }

    pub fn timeouts(&self) -> HttpTimeouts {
        HttpTimeouts::from_secs(self.connect_timeout_secs, self.read_timeout_secs)
    }
}

impl Default for DubbingSettings {
    fn default() -> Self {
        Self {
            provider: DubbingProviderSetting::ElevenLabs,
            api_key: String::new(),
            base_url: "https://api.elevenlabs.io".to_string(),
            watermark: true,
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            max_poll_attempts: None,
            max_poll_duration_secs: None,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT.as_secs(),
            read_timeout_secs: DEFAULT_READ_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProviderSetting {
    Local,
    Memory,
    Cloudinary,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub provider: StorageProviderSetting,
    pub local_path: String,
    pub retention_secs: Option<u64>,
    pub cloudinary: Option<CloudinarySettings>,
}

impl StorageSettings {
    /// Configured retention, else short for disk and long for hosted output.
    pub fn retention(&self) -> Duration {
        match (self.retention_secs, self.provider) {
            (Some(secs), _) => Duration::from_secs(secs),
            (None, StorageProviderSetting::Local) => DEFAULT_LOCAL_RETENTION,
            (None, _) => DEFAULT_HOSTED_RETENTION,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: StorageProviderSetting::Local,
            local_path: "./data".to_string(),
            retention_secs: None,
            cloudinary: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudinarySettings {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    #[serde(default = "default_cloudinary_folder")]
    pub folder: String,
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub delivery_base_url: Option<String>,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
}

impl CloudinarySettings {
    pub fn timeouts(&self) -> HttpTimeouts {
        HttpTimeouts::from_secs(self.connect_timeout_secs, self.read_timeout_secs)
    }
}

fn default_cloudinary_folder() -> String {
    "neurodub".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT.as_secs()
}

fn default_read_timeout_secs() -> u64 {
    DEFAULT_READ_TIMEOUT.as_secs()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            enable_json: false,
        }
    }
}
