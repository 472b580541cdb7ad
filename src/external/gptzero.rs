//! GPTZero text classifier

use super::{check_status, client, ExternalDetector, ExternalError, Payload};
use crate::classify::ContentCategory;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const GPTZERO_API_URL: &str = "https://api.gptzero.me/v2/predict/text";

pub struct GptZero {
    client: Client,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GptZeroResponse {
    #[serde(default)]
    documents: Vec<GptZeroDocument>,
}

#[derive(Debug, Deserialize)]
struct GptZeroDocument {
    #[serde(default)]
    completely_generated_prob: f64,
}

impl GptZero {
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self, ExternalError> {
        Ok(Self {
            client: client(timeout)?,
            api_key: api_key.to_string(),
        })
    }
}

fn first_score(response: GptZeroResponse) -> Result<f64, ExternalError> {
    response
        .documents
        .first()
        .map(|d| d.completely_generated_prob.clamp(0.0, 1.0))
        .ok_or_else(|| ExternalError::Decode("no result from GPTZero".to_string()))
}

impl ExternalDetector for GptZero {
    fn name(&self) -> &'static str {
        "gptzero"
    }

    fn supports(&self, category: ContentCategory) -> bool {
        category == ContentCategory::Text
    }

    fn score(&self, payload: &Payload<'_>) -> Result<f64, ExternalError> {
        let text = payload.text.ok_or(ExternalError::Missing("text"))?;

        let response = self
            .client
            .post(GPTZERO_API_URL)
            .header("x-api-key", &self.api_key)
            .json(&json!({ "document": text }))
            .send()?;

        let parsed: GptZeroResponse = check_status(response)?.json()?;
        first_score(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_only() {
        let d = GptZero::new("key", Duration::from_secs(1)).unwrap();
        assert!(d.supports(ContentCategory::Text));
        assert!(!d.supports(ContentCategory::Image));
        assert!(!d.supports(ContentCategory::Video));
    }

    #[test]
    fn test_parse_document_probability() {
        let raw = r#"{"documents":[{"completely_generated_prob":0.42,"average_generated_prob":0.3}]}"#;
        let parsed: GptZeroResponse = serde_json::from_str(raw).unwrap();
        assert!((first_score(parsed).unwrap() - 0.42).abs() < 1e-9);
    }

    #[test]
    fn test_no_documents_is_error() {
        let parsed: GptZeroResponse = serde_json::from_str("{}").unwrap();
        assert!(first_score(parsed).is_err());
    }

    #[test]
    fn test_missing_text() {
        let d = GptZero::new("key", Duration::from_secs(1)).unwrap();
        let payload = Payload::media(ContentCategory::Text, b"raw");
        assert!(matches!(d.score(&payload), Err(ExternalError::Missing("text"))));
    }
}
