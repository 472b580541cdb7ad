//! Environment-driven configuration
//!
//! | Variable | Default |
//! |----------|---------|
//! | `ENV` | development |
//! | `PORT` | 8080 |
//! | `DATABASE_URL` | humanmark.db |
//! | `HIVE_API_KEY` | (none) |
//! | `OPENAI_API_KEY` | (none) |
//! | `GPTZERO_API_KEY` | (none) |
//! | `MAX_UPLOAD_SIZE` | 104857600 (100 MB) |
//! | `LOG_LEVEL` | info |
//! | `DETECTOR_TIMEOUT_SECS` | 30 |
//!
//! Unparseable numbers fall back to the default. Everything else is checked
//! by [`Config::validate`], which reports all problems at once.

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_DB_PATH: &str = "humanmark.db";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 100 * 1024 * 1024;
pub const DEFAULT_DETECTOR_TIMEOUT_SECS: u64 = 30;

const MIN_UPLOAD_SIZE: u64 = 1024;
const MAX_UPLOAD_SIZE: u64 = 1024 * 1024 * 1024;
const ENVIRONMENTS: &[&str] = &["development", "staging", "production"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration errors:\n  - {}", .0.join("\n  - "))]
    Invalid(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub port: u16,
    /// `None` means the default local path
    pub database_url: Option<String>,
    pub hive_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub gptzero_api_key: Option<String>,
    pub max_upload_size: u64,
    pub log_level: String,
    pub detector_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: DEFAULT_PORT,
            database_url: None,
            hive_api_key: None,
            openai_api_key: None,
            gptzero_api_key: None,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            log_level: "info".to_string(),
            detector_timeout_secs: DEFAULT_DETECTOR_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key -> value source; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            environment: get("ENV").unwrap_or(defaults.environment),
            port: get("PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.port),
            database_url: get("DATABASE_URL"),
            hive_api_key: get("HIVE_API_KEY"),
            openai_api_key: get("OPENAI_API_KEY"),
            gptzero_api_key: get("GPTZERO_API_KEY"),
            max_upload_size: get("MAX_UPLOAD_SIZE")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.max_upload_size),
            log_level: get("LOG_LEVEL").unwrap_or(defaults.log_level),
            detector_timeout_secs: get("DETECTOR_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.detector_timeout_secs),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("invalid port: 0 (must be 1-65535)".to_string());
        }

        if !ENVIRONMENTS.contains(&self.environment.as_str()) {
            errors.push(format!(
                "invalid environment: {} (must be development, staging, or production)",
                self.environment
            ));
        }

        if self.is_production() && self.database_url.is_none() {
            errors.push("DATABASE_URL is required in production".to_string());
        }

        if self.max_upload_size < MIN_UPLOAD_SIZE {
            errors.push(format!(
                "MAX_UPLOAD_SIZE too small: {} (minimum {})",
                self.max_upload_size, MIN_UPLOAD_SIZE
            ));
        }
        if self.max_upload_size > MAX_UPLOAD_SIZE {
            errors.push(format!(
                "MAX_UPLOAD_SIZE too large: {} (maximum 1GB)",
                self.max_upload_size
            ));
        }

        if self.detector_timeout_secs == 0 {
            errors.push("DETECTOR_TIMEOUT_SECS must be at least 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn database_path(&self) -> &str {
        self.database_url.as_deref().unwrap_or(DEFAULT_DB_PATH)
    }

    pub fn detector_timeout(&self) -> Duration {
        Duration::from_secs(self.detector_timeout_secs)
    }

    pub fn has_external_detectors(&self) -> bool {
        self.hive_api_key.is_some() || self.openai_api_key.is_some() || self.gptzero_api_key.is_some()
    }
}
