//! OpenAI chat model used as a text judge
//!
//! The model is asked for a JSON object `{"ai_probability": f, "reasoning": s}`
//! and JSON output mode is requested so the reply parses directly.

use super::{check_status, client, ExternalDetector, ExternalError, Payload};
use crate::classify::ContentCategory;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-4o-mini";
const MAX_CHARS: usize = 4000;

const SYSTEM_PROMPT: &str = "You are an AI content detector. Analyze the text and determine if it was written by an AI or a human.

Respond with ONLY a JSON object:
{\"ai_probability\": 0.0-1.0, \"reasoning\": \"brief explanation\"}

ai_probability should be:
- 0.0-0.3: Clearly human-written
- 0.3-0.5: Probably human-written
- 0.5-0.7: Uncertain
- 0.7-0.9: Probably AI-generated
- 0.9-1.0: Clearly AI-generated";

pub struct OpenAi {
    client: Client,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct Verdict {
    ai_probability: f64,
}

impl OpenAi {
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self, ExternalError> {
        Ok(Self {
            client: client(timeout)?,
            api_key: api_key.to_string(),
        })
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn request_body(text: &str) -> Value {
    json!({
        "model": MODEL,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": truncate_chars(text, MAX_CHARS) },
        ],
        "response_format": { "type": "json_object" },
        "temperature": 0.1,
    })
}

fn parse_reply(response: ChatResponse) -> Result<f64, ExternalError> {
    let content = response
        .choices
        .first()
        .map(|c| c.message.content.as_str())
        .ok_or_else(|| ExternalError::Decode("no choices from OpenAI".to_string()))?;

    let verdict: Verdict =
        serde_json::from_str(content).map_err(|e| ExternalError::Decode(e.to_string()))?;
    Ok(verdict.ai_probability.clamp(0.0, 1.0))
}

impl ExternalDetector for OpenAi {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn supports(&self, category: ContentCategory) -> bool {
        category == ContentCategory::Text
    }

    fn score(&self, payload: &Payload<'_>) -> Result<f64, ExternalError> {
        let text = payload.text.ok_or(ExternalError::Missing("text"))?;

        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body(text))
            .send()?;

        let parsed: ChatResponse = check_status(response)?.json()?;
        parse_reply(parsed)
    }
}
