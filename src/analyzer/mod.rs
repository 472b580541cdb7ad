//! Core analysis engine
//!
//! # How Detection Works
//!
//! Every input goes through the same four steps:
//!
//! 1. **Classify**: pick text, image, audio or video from the content-type
//!    hint, the text field, the filename, the URL or the magic bytes.
//! 2. **Extract**: parse the container (EXIF, PNG chunks, ID3, RIFF, FLAC
//!    metadata blocks, MP4 atoms, EBML) for technical metadata.
//! 3. **Score**: compute a fixed set of signals in [0,1] and combine them
//!    with the modality's weight table.
//! 4. **Fuse**: the internal score is one opinion. Any configured external
//!    detectors add theirs, and a reliability-weighted mean gives the final
//!    AI score.
//!
//! ## Verdict
//!
//! | ai_score | human | confidence |
//! |----------|-------|------------|
//! | 0.0 | true | 1.0 |
//! | 0.3 | true | 0.4 |
//! | 0.5 | false | 0.0 |
//! | 0.9 | false | 0.8 |
//!
//! `confidence = |ai_score - 0.5| * 2`: how far the score is from a coin flip.

pub mod aggregate;
pub mod audio;
pub mod image;
pub mod markers;
pub mod stats;
pub mod text;
pub mod video;

use crate::classify::{self, ContentCategory, Hints};
use crate::external::{ExternalDetector, ExternalError, Fetcher, Payload};
use aggregate::{fuse, Opinion, INTERNAL_DETECTOR};
use rayon::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::path::Path;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("no content provided")]
    NoContent,

    #[error("failed to fetch content: {0}")]
    Fetch(#[from] ExternalError),
}

/// One piece of content to analyze
///
/// At least one of text, bytes or URL must be present.
#[derive(Debug, Clone, Default)]
pub struct AnalysisInput {
    pub text: Option<String>,
    pub data: Option<Vec<u8>>,
    pub url: Option<String>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

impl AnalysisInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: Some(data.into()),
            ..Self::default()
        }
    }

    /// Read a file and use its name as the filename hint
    pub fn from_path<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let input = Self::bytes(data);
        Ok(match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => input.with_filename(name),
            None => input,
        })
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    fn non_empty_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }

    fn non_empty_data(&self) -> Option<&[u8]> {
        self.data.as_deref().filter(|d| !d.is_empty())
    }

    fn non_empty_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.trim().is_empty())
    }

    pub fn has_content(&self) -> bool {
        self.non_empty_text().is_some()
            || self.non_empty_data().is_some()
            || self.non_empty_url().is_some()
    }

    /// Category hint from `content_type`: a category name or a MIME type
    fn explicit_category(&self) -> Option<ContentCategory> {
        let hint = self.content_type.as_deref()?;
        let category = ContentCategory::parse(hint);
        if category.is_known() {
            Some(category)
        } else {
            Some(classify::from_mime(hint))
        }
    }

    pub fn category(&self) -> ContentCategory {
        classify::classify(&Hints {
            explicit: self.explicit_category(),
            has_text: self.non_empty_text().is_some(),
            filename: self.filename.as_deref(),
            url: self.non_empty_url(),
            data: self.non_empty_data(),
        })
    }

    /// Hex SHA-256 of the text, else the bytes, else the URL
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        if let Some(text) = self.non_empty_text() {
            hasher.update(text.as_bytes());
        } else if let Some(data) = self.non_empty_data() {
            hasher.update(data);
        } else if let Some(url) = self.non_empty_url() {
            hasher.update(url.as_bytes());
        }
        hex(&hasher.finalize())
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Per-modality forensic detail
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ForensicReport {
    Text(text::TextAnalysis),
    Image(image::ImageAnalysis),
    Audio(audio::AudioAnalysis),
    Video(video::VideoAnalysis),
}

impl ForensicReport {
    pub fn ai_score(&self) -> f64 {
        match self {
            ForensicReport::Text(a) => a.ai_score,
            ForensicReport::Image(a) => a.ai_score,
            ForensicReport::Audio(a) => a.ai_score,
            ForensicReport::Video(a) => a.ai_score,
        }
    }

    /// Named signals, for verbose output
    pub fn signals(&self) -> Vec<(&'static str, f64)> {
        match self {
            ForensicReport::Text(a) => a.signals.pairs(),
            ForensicReport::Image(a) => a.signals.pairs(),
            ForensicReport::Audio(a) => a.signals.pairs(),
            ForensicReport::Video(a) => a.signals.pairs(),
        }
    }
}

/// The verdict for one input
#[derive(Debug, Clone, Serialize)]
pub struct DetectionResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub human: bool,
    pub confidence: f64,
    pub content_type: ContentCategory,
    pub ai_score: f64,
    pub detectors: Vec<String>,
    pub content_hash: String,
    pub processing_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ForensicReport>,
}

impl DetectionResult {
    pub fn without_details(mut self) -> Self {
        self.details = None;
        self
    }
}

pub fn is_human(ai_score: f64) -> bool {
    ai_score < 0.5
}

pub fn confidence(ai_score: f64) -> f64 {
    ((ai_score - 0.5).abs() * 2.0).clamp(0.0, 1.0)
}

/// Runs the forensic engines plus any configured external detectors
#[derive(Default)]
pub struct Analyzer {
    detectors: Vec<Box<dyn ExternalDetector>>,
    fetcher: Option<Fetcher>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_detectors(mut self, detectors: Vec<Box<dyn ExternalDetector>>) -> Self {
        self.detectors = detectors;
        self
    }

    /// Allow URL-only inputs by downloading them
    pub fn with_fetcher(mut self, fetcher: Fetcher) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn detector_names(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    pub fn analyze(&self, input: &AnalysisInput) -> Result<DetectionResult, AnalysisError> {
        let start = Instant::now();

        if !input.has_content() {
            return Err(AnalysisError::NoContent);
        }

        let category = input.category();
        let url = input.non_empty_url();

        let (report, opinions) = match category {
            ContentCategory::Unknown => {
                let hint = input
                    .content_type
                    .clone()
                    .or_else(|| input.filename.clone())
                    .unwrap_or_else(|| "unknown".to_string());
                return Err(AnalysisError::UnsupportedContentType(hint));
            }
            ContentCategory::Text => {
                let text = self.text_payload(input)?;
                let report = ForensicReport::Text(text::analyze(&text));
                let payload = Payload::text(&text).with_url(url);
                let opinions = self.opinions(&report, &payload);
                (report, opinions)
            }
            _ => {
                let data = self.binary_payload(input, category)?;
                let report = match category {
                    ContentCategory::Image => ForensicReport::Image(image::analyze(&data)),
                    ContentCategory::Audio => ForensicReport::Audio(audio::analyze(&data)),
                    _ => ForensicReport::Video(video::analyze(&data)),
                };
                let payload = Payload::media(category, &data).with_url(url);
                let opinions = self.opinions(&report, &payload);
                (report, opinions)
            }
        };

        let ai_score = fuse(&opinions, category);

        Ok(DetectionResult {
            id: None,
            human: is_human(ai_score),
            confidence: confidence(ai_score),
            content_type: category,
            ai_score,
            detectors: opinions.into_iter().map(|o| o.detector).collect(),
            content_hash: input.content_hash(),
            processing_time_ms: start.elapsed().as_millis() as u64,
            details: Some(report),
        })
    }

    fn text_payload<'a>(&self, input: &'a AnalysisInput) -> Result<Cow<'a, str>, AnalysisError> {
        let text = if let Some(text) = input.non_empty_text() {
            Cow::Borrowed(text)
        } else if let Some(data) = input.non_empty_data() {
            String::from_utf8_lossy(data)
        } else {
            match (input.non_empty_url(), &self.fetcher) {
                (Some(url), Some(fetcher)) => Cow::Owned(fetcher.fetch_text(url)?),
                _ => return Err(AnalysisError::NoContent),
            }
        };

        if text.trim().is_empty() {
            return Err(AnalysisError::NoContent);
        }
        Ok(text)
    }

    fn binary_payload<'a>(
        &self,
        input: &'a AnalysisInput,
        category: ContentCategory,
    ) -> Result<Cow<'a, [u8]>, AnalysisError> {
        if let Some(data) = input.non_empty_data() {
            return Ok(Cow::Borrowed(data));
        }

        match (input.non_empty_url(), &self.fetcher) {
            (Some(url), Some(fetcher)) => Ok(Cow::Owned(fetcher.fetch(url, category)?)),
            _ => Err(AnalysisError::NoContent),
        }
    }

    /// Internal opinion first, then every external detector that answered
    fn opinions(&self, report: &ForensicReport, payload: &Payload<'_>) -> Vec<Opinion> {
        let internal = report.ai_score();
        debug!(
            category = %payload.category,
            score = internal,
            "forensic analysis complete"
        );

        let external: Vec<Opinion> = self
            .detectors
            .par_iter()
            .filter(|d| d.supports(payload.category))
            .filter_map(|d| match d.score(payload) {
                Ok(score) => {
                    debug!(detector = d.name(), score, "external detector answered");
                    Some(Opinion::new(d.name(), score))
                }
                Err(e) => {
                    warn!(detector = d.name(), error = %e, "external detector failed");
                    None
                }
            })
            .collect();

        let mut opinions = Vec::with_capacity(external.len() + 1);
        opinions.push(Opinion::new(INTERNAL_DETECTOR, internal));
        opinions.extend(external);
        opinions
    }
}
