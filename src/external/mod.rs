//! Optional third-party detectors
//!
//! Each client wraps one hosted AI-content detector and reports a single
//! AI probability in [0,1]. The orchestrator treats them as extra opinions:
//! a failing client is logged and skipped, never fatal.
//!
//! | Detector | Text | Image | Audio | Video |
//! |----------|------|-------|-------|-------|
//! | Hive     | yes  | yes   | yes   | URL only |
//! | GPTZero  | yes  | -     | -     | -     |
//! | OpenAI   | yes  | -     | -     | -     |
//!
//! Clients are only built for the API keys that are configured.

pub mod fetch;
pub mod gptzero;
pub mod hive;
pub mod openai;

pub use fetch::Fetcher;
pub use gptzero::GptZero;
pub use hive::Hive;
pub use openai::OpenAi;

use crate::classify::ContentCategory;
use crate::config::Config;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExternalError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {0}")]
    Status(u16),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("content exceeds the {0} byte limit")]
    TooLarge(u64),

    #[error("request is missing {0}")]
    Missing(&'static str),
}

/// What a detector gets to look at
#[derive(Debug, Clone, Copy)]
pub struct Payload<'a> {
    pub category: ContentCategory,
    pub text: Option<&'a str>,
    pub data: Option<&'a [u8]>,
    pub url: Option<&'a str>,
}

impl<'a> Payload<'a> {
    pub fn text(text: &'a str) -> Self {
        Self {
            category: ContentCategory::Text,
            text: Some(text),
            data: None,
            url: None,
        }
    }

    pub fn media(category: ContentCategory, data: &'a [u8]) -> Self {
        Self {
            category,
            text: None,
            data: Some(data),
            url: None,
        }
    }

    pub fn with_url(mut self, url: Option<&'a str>) -> Self {
        self.url = url;
        self
    }
}

/// A hosted detector the orchestrator can consult
pub trait ExternalDetector: Send + Sync {
    /// Name used for reliability weighting and in `DetectionResult::detectors`
    fn name(&self) -> &'static str;

    fn supports(&self, category: ContentCategory) -> bool;

    /// AI probability in [0,1]
    fn score(&self, payload: &Payload<'_>) -> Result<f64, ExternalError>;
}

pub(crate) fn client(timeout: Duration) -> Result<reqwest::blocking::Client, ExternalError> {
    Ok(reqwest::blocking::Client::builder().timeout(timeout).build()?)
}

/// Build a client for every configured API key
pub fn from_config(config: &Config) -> Result<Vec<Box<dyn ExternalDetector>>, ExternalError> {
    let timeout = config.detector_timeout();
    let mut detectors: Vec<Box<dyn ExternalDetector>> = Vec::new();

    if let Some(key) = config.hive_api_key.as_deref() {
        detectors.push(Box::new(Hive::new(key, timeout)?));
    }
    if let Some(key) = config.gptzero_api_key.as_deref() {
        detectors.push(Box::new(GptZero::new(key, timeout)?));
    }
    if let Some(key) = config.openai_api_key.as_deref() {
        detectors.push(Box::new(OpenAi::new(key, timeout)?));
    }

    Ok(detectors)
}

/// Map a non-2xx response to `ExternalError::Status`
pub(crate) fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, ExternalError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ExternalError::Status(status.as_u16()));
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_keys_no_detectors() {
        let config = Config::default();
        let detectors = from_config(&config).unwrap();
        assert!(detectors.is_empty());
    }

    #[test]
    fn test_each_key_adds_a_detector() {
        let config = Config {
            hive_api_key: Some("h".to_string()),
            openai_api_key: Some("o".to_string()),
            ..Config::default()
        };
        let detectors = from_config(&config).unwrap();
        let names: Vec<&str> = detectors.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["hive", "openai"]);
    }

    #[test]
    fn test_payload_builders() {
        let p = Payload::text("hello");
        assert_eq!(p.category, ContentCategory::Text);
        assert!(p.data.is_none());

        let p = Payload::media(ContentCategory::Video, b"data").with_url(Some("https://x/v.mp4"));
        assert_eq!(p.url, Some("https://x/v.mp4"));
        assert_eq!(p.data, Some(&b"data"[..]));
    }
}
