//! Content category detection
//!
//! Decides which engine handles an input. Sources are consulted in priority
//! order and each one falls through when it can't decide:
//!
//! 1. explicit hint
//! 2. text present
//! 3. filename extension
//! 4. URL extension (query string ignored)
//! 5. magic bytes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    Text,
    Image,
    Audio,
    Video,
    #[default]
    Unknown,
}

impl ContentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentCategory::Text => "text",
            ContentCategory::Image => "image",
            ContentCategory::Audio => "audio",
            ContentCategory::Video => "video",
            ContentCategory::Unknown => "unknown",
        }
    }

    /// Parse a category name as used by the API and the database
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => ContentCategory::Text,
            "image" => ContentCategory::Image,
            "audio" => ContentCategory::Audio,
            "video" => ContentCategory::Video,
            _ => ContentCategory::Unknown,
        }
    }

    pub fn is_known(&self) -> bool {
        *self != ContentCategory::Unknown
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Everything the classifier may look at
#[derive(Debug, Clone, Copy, Default)]
pub struct Hints<'a> {
    pub explicit: Option<ContentCategory>,
    pub has_text: bool,
    pub filename: Option<&'a str>,
    pub url: Option<&'a str>,
    pub data: Option<&'a [u8]>,
}

pub fn classify(hints: &Hints<'_>) -> ContentCategory {
    if let Some(c) = hints.explicit.filter(|c| c.is_known()) {
        return c;
    }

    if hints.has_text {
        return ContentCategory::Text;
    }

    let by_name = hints.filename.map(from_filename).filter(|c| c.is_known());
    let by_url = || hints.url.map(from_url).filter(|c| c.is_known());
    let by_bytes = || hints.data.map(from_magic_bytes).filter(|c| c.is_known());

    by_name
        .or_else(by_url)
        .or_else(by_bytes)
        .unwrap_or(ContentCategory::Unknown)
}

pub fn from_filename(name: &str) -> ContentCategory {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "txt" | "md" | "html" | "htm" | "json" | "xml" | "csv" => ContentCategory::Text,
        "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp" | "svg" => ContentCategory::Image,
        "mp3" | "wav" | "flac" | "ogg" | "m4a" | "aac" => ContentCategory::Audio,
        "mp4" | "mov" | "avi" | "webm" | "mkv" | "wmv" => ContentCategory::Video,
        _ => ContentCategory::Unknown,
    }
}

pub fn from_url(url: &str) -> ContentCategory {
    let path = url.split('?').next().unwrap_or(url);
    from_filename(path)
}

pub fn from_mime(mime: &str) -> ContentCategory {
    let mime = mime.to_ascii_lowercase();
    let mime = mime.split(';').next().unwrap_or("").trim();

    if mime.starts_with("text/") {
        ContentCategory::Text
    } else if mime.starts_with("image/") {
        ContentCategory::Image
    } else if mime.starts_with("audio/") {
        ContentCategory::Audio
    } else if mime.starts_with("video/") {
        ContentCategory::Video
    } else if mime == "application/json" || mime == "application/xml" {
        ContentCategory::Text
    } else {
        ContentCategory::Unknown
    }
}

pub fn from_magic_bytes(data: &[u8]) -> ContentCategory {
    if data.len() < 4 {
        return ContentCategory::Unknown;
    }

    let riff_kind = if data.len() >= 12 && &data[0..4] == b"RIFF" {
        Some(&data[8..12])
    } else {
        None
    };

    // JPEG
    if data[..3] == [0xFF, 0xD8, 0xFF] {
        return ContentCategory::Image;
    }
    // PNG
    if data[..4] == [0x89, b'P', b'N', b'G'] {
        return ContentCategory::Image;
    }
    // GIF
    if &data[..4] == b"GIF8" {
        return ContentCategory::Image;
    }
    if riff_kind == Some(&b"WEBP"[..]) {
        return ContentCategory::Image;
    }
    // MPEG audio frame sync or ID3v2
    if (data[0] == 0xFF && data[1] & 0xE0 == 0xE0) || &data[..3] == b"ID3" {
        return ContentCategory::Audio;
    }
    // ISO base media (mp4/mov/m4a all land here)
    if data.len() >= 8 && &data[4..8] == b"ftyp" {
        return ContentCategory::Video;
    }
    if riff_kind == Some(&b"WAVE"[..]) {
        return ContentCategory::Audio;
    }

    ContentCategory::Unknown
}
