//! Hive AI-generated content classifier
//!
//! One endpoint serves every modality; the body key picks the model:
//! `text_data` for text, base64 `image`/`audio` for media and `url` for
//! video (Hive fetches the video itself).

use super::{check_status, client, ExternalDetector, ExternalError, Payload};
use crate::classify::ContentCategory;
use base64::Engine;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const HIVE_API_URL: &str = "https://api.thehive.ai/api/v2/task/sync";

pub struct Hive {
    client: Client,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct HiveResponse {
    #[serde(default)]
    status: Vec<HiveStatus>,
}

#[derive(Debug, Deserialize)]
struct HiveStatus {
    response: HiveResult,
}

#[derive(Debug, Deserialize)]
struct HiveResult {
    #[serde(default)]
    ai_generated: f64,
}

impl Hive {
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self, ExternalError> {
        Ok(Self {
            client: client(timeout)?,
            api_key: api_key.to_string(),
        })
    }
}

fn request_body(payload: &Payload<'_>) -> Result<Value, ExternalError> {
    let b64 = |data: &[u8]| base64::engine::general_purpose::STANDARD.encode(data);

    match payload.category {
        ContentCategory::Text => {
            let text = payload.text.ok_or(ExternalError::Missing("text"))?;
            Ok(json!({ "text_data": text }))
        }
        ContentCategory::Image => {
            let data = payload.data.ok_or(ExternalError::Missing("image data"))?;
            Ok(json!({ "image": b64(data) }))
        }
        ContentCategory::Audio => {
            let data = payload.data.ok_or(ExternalError::Missing("audio data"))?;
            Ok(json!({ "audio": b64(data) }))
        }
        ContentCategory::Video => {
            let url = payload.url.ok_or(ExternalError::Missing("video url"))?;
            Ok(json!({ "url": url }))
        }
        ContentCategory::Unknown => Err(ExternalError::Missing("content category")),
    }
}

fn first_score(response: HiveResponse) -> Result<f64, ExternalError> {
    response
        .status
        .first()
        .map(|s| s.response.ai_generated.clamp(0.0, 1.0))
        .ok_or_else(|| ExternalError::Decode("no result from Hive".to_string()))
}

impl ExternalDetector for Hive {
    fn name(&self) -> &'static str {
        "hive"
    }

    fn supports(&self, category: ContentCategory) -> bool {
        category.is_known()
    }

    fn score(&self, payload: &Payload<'_>) -> Result<f64, ExternalError> {
        let body = request_body(payload)?;

        let response = self
            .client
            .post(HIVE_API_URL)
            .header("Authorization", format!("Token {}", self.api_key))
            .json(&body)
            .send()?;

        let parsed: HiveResponse = check_status(response)?.json()?;
        first_score(parsed)
    }
}
