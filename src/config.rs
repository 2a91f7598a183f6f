use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::errors::PitwallError;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_DIR_NAME: &str = "pitwall";

/// Environment variable overriding the client identity.
const CLIENT_ID_ENV_VAR: &str = "PITWALL_CLIENT_ID";
/// Prefix for the generated default client identity.
const CLIENT_ID_PREFIX: &str = "pitwall";

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 250;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the pit wall server
    pub server_url: String,
    /// Sampling period in milliseconds
    pub sample_interval_ms: u64,
    /// Optional fixed client identity; generated when absent
    pub client_id: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            client_id: None,
        }
    }
}

impl AppConfig {
    /// Load the config file from the platform config directory, if present.
    ///
    /// A missing or malformed file is not an error; the caller falls back to
    /// defaults so the sampler can always start.
    pub fn from_local_file() -> Option<Self> {
        let config_path = dirs::config_dir()?
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return None;
        }
        match Self::load(&config_path) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("ignoring unreadable config file: {}", e);
                None
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, PitwallError> {
        let file =
            std::fs::File::open(path).map_err(|e| PitwallError::ConfigIOError { source: e })?;
        serde_json::from_reader(file).map_err(|e| PitwallError::ConfigSerializeError { source: e })
    }

    pub fn save(&self) -> Result<(), PitwallError> {
        let config_path = dirs::config_dir()
            .ok_or(PitwallError::NoConfigDir)?
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME);
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), PitwallError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| PitwallError::ConfigIOError { source: e })?;
            }
        }

        let file =
            std::fs::File::create(path).map_err(|e| PitwallError::ConfigIOError { source: e })?;
        serde_json::to_writer(file, self)
            .map_err(|e| PitwallError::ConfigSerializeError { source: e })
    }

    /// Resolve the stable client identity for this process.
    ///
    /// Precedence: environment override, then the configured value, then a
    /// generated `pitwall_<pid>` default. Constant for the process lifetime.
    pub fn resolve_client_id(&self) -> String {
        if let Ok(id) = std::env::var(CLIENT_ID_ENV_VAR) {
            if !id.is_empty() {
                return id;
            }
        }
        self.client_id
            .clone()
            .unwrap_or_else(|| format!("{}_{}", CLIENT_ID_PREFIX, std::process::id()))
    }
}
