use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Which document store backs the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    /// Turso/libSQL, requires the `db` feature
    Libsql,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(StorageBackend::Memory),
            "libsql" | "turso" | "db" => Ok(StorageBackend::Libsql),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub port: u16,
    pub storage: StorageBackend,
    /// Object store directory; in-memory when unset
    pub blob_dir: Option<PathBuf>,
    /// Root holding `Documentos-Digitales/<PATENTE>/...`
    pub media_root: PathBuf,
    pub log_dir: PathBuf,
    pub max_upload_mb: usize,
    /// Base URL the CLI client talks to
    pub api_url: String,
    /// Allowed CORS origins; empty means any
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            storage: StorageBackend::Memory,
            blob_dir: None,
            media_root: PathBuf::from("media"),
            log_dir: PathBuf::from("logs"),
            max_upload_mb: 50,
            api_url: "http://127.0.0.1:8000".to_string(),
            cors_origins: Vec::new(),
        }
    }
}

impl Config {
    /// Load `FLOTA_CONFIG` (or `flota.toml` when present), then apply
    /// `FLOTA_*` environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var("FLOTA_CONFIG").ok();
        let config_path = explicit.clone().unwrap_or_else(|| "flota.toml".to_string());

        let mut config = match fs::read_to_string(&config_path) {
            Ok(content) => Self::from_toml_str(&content)?,
            Err(e) if explicit.is_none() && e.kind() == std::io::ErrorKind::NotFound => {
                Self::default()
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: config_path,
                    source,
                })
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply overrides from any key lookup (the environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("FLOTA_PORT") {
            self.port = value.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "FLOTA_PORT",
                value,
            })?;
        }
        if let Some(value) = lookup("FLOTA_STORAGE") {
            self.storage = value.parse().map_err(|value| ConfigError::Invalid {
                key: "FLOTA_STORAGE",
                value,
            })?;
        }
        if let Some(value) = lookup("FLOTA_BLOB_DIR") {
            self.blob_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup("FLOTA_MEDIA_ROOT") {
            self.media_root = PathBuf::from(value);
        }
        if let Some(value) = lookup("FLOTA_LOG_DIR") {
            self.log_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("FLOTA_MAX_UPLOAD_MB") {
            self.max_upload_mb = value.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "FLOTA_MAX_UPLOAD_MB",
                value,
            })?;
        }
        if let Some(value) = lookup("FLOTA_API_URL") {
            self.api_url = value;
        }
        Ok(())
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}
