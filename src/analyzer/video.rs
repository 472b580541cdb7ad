//! Video forensics
//!
//! Generated clips tend to be short, silent and muxed by a handful of tools
//! that leave their name behind. This engine walks the container far enough
//! to find tracks and tool stamps, then adds coarse byte statistics.
//!
//! | Signal | Weight | |
//! |--------|--------|-|
//! | metadata | 25% | AI stamps, missing audio, encoder family |
//! | container | 20% | missing `moov`/`mdat` or EBML Segment |
//! | audio_presence | 15% | a sound track at all |
//! | temporal_pattern | 15% | repeated content across distant regions |
//! | encoding | 15% | standard codec fourccs present |
//! | bitrate | 10% | entropy drift across the file |

use super::aggregate::{aggregate, WeightTable};
use super::markers::{any_of, has_ai_video_marker, video_encoder, AI_VIDEO_TOOLS, PRO_VIDEO_ENCODERS};
use super::stats::{contains, entropy, head, similarity, variance};
use crate::container::{mp4, riff};
use serde::Serialize;

pub const WEIGHTS: WeightTable = &[
    ("metadata", 0.25),
    ("container", 0.20),
    ("audio_presence", 0.15),
    ("temporal_pattern", 0.15),
    ("encoding", 0.15),
    ("bitrate", 0.10),
];

const CODEC_FOURCCS: &[&[u8]] = &[b"avc1", b"h264", b"hvc1", b"hevc", b"vp09", b"av01"];

const EBML_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];
const EBML_SEGMENT: [u8; 4] = [0x18, 0x53, 0x80, 0x67];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoFormat {
    Mp4,
    Mov,
    WebM,
    Mkv,
    Avi,
    Flv,
    Ts,
    #[default]
    Unknown,
}

impl VideoFormat {
    pub fn sniff(data: &[u8]) -> Self {
        if data.len() < 12 {
            return VideoFormat::Unknown;
        }

        if &data[4..8] == b"ftyp" {
            return match &data[8..12] {
                b"qt  " => VideoFormat::Mov,
                _ => VideoFormat::Mp4,
            };
        }

        if data.starts_with(&EBML_MAGIC) {
            return if contains(head(data, 100), b"webm") {
                VideoFormat::WebM
            } else {
                VideoFormat::Mkv
            };
        }

        if data.starts_with(b"RIFF") && &data[8..12] == b"AVI " {
            VideoFormat::Avi
        } else if data.starts_with(b"FLV") {
            VideoFormat::Flv
        } else if data.len() > 376 && data[0] == 0x47 && data[188] == 0x47 && data[376] == 0x47 {
            VideoFormat::Ts
        } else {
            VideoFormat::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoFormat::Mp4 => "mp4",
            VideoFormat::Mov => "mov",
            VideoFormat::WebM => "webm",
            VideoFormat::Mkv => "mkv",
            VideoFormat::Avi => "avi",
            VideoFormat::Flv => "flv",
            VideoFormat::Ts => "ts",
            VideoFormat::Unknown => "unknown",
        }
    }

    fn is_iso_bmff(&self) -> bool {
        matches!(self, VideoFormat::Mp4 | VideoFormat::Mov)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VideoMetadata {
    pub format: VideoFormat,
    pub has_audio: bool,
    pub has_video: bool,
    pub encoder: Option<String>,
    pub is_ai_marked: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VideoStats {
    pub file_size: usize,
    /// Number of top-level `mdat` atoms
    pub chunk_count: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VideoSignals {
    pub metadata: f64,
    pub container: f64,
    pub audio_presence: f64,
    pub temporal_pattern: f64,
    pub encoding: f64,
    pub bitrate: f64,
}

impl VideoSignals {
    pub fn pairs(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("metadata", self.metadata),
            ("container", self.container),
            ("audio_presence", self.audio_presence),
            ("temporal_pattern", self.temporal_pattern),
            ("encoding", self.encoding),
            ("bitrate", self.bitrate),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VideoAnalysis {
    pub ai_score: f64,
    pub signals: VideoSignals,
    pub metadata: VideoMetadata,
    pub stats: VideoStats,
}

pub fn analyze(data: &[u8]) -> VideoAnalysis {
    let (metadata, stats) = extract_metadata(data, VideoFormat::sniff(data));

    let signals = VideoSignals {
        metadata: metadata_score(&metadata),
        container: container(data, metadata.format),
        audio_presence: if metadata.has_audio { 0.3 } else { 0.7 },
        temporal_pattern: temporal_pattern(data),
        encoding: encoding(data, metadata.format),
        bitrate: bitrate(data),
    };

    VideoAnalysis {
        ai_score: aggregate(&signals.pairs(), WEIGHTS),
        signals,
        metadata,
        stats,
    }
}

// ============================================================================
// Metadata extraction
// ============================================================================

pub fn extract_metadata(data: &[u8], format: VideoFormat) -> (VideoMetadata, VideoStats) {
    let mut meta = VideoMetadata {
        format,
        ..Default::default()
    };
    let mut stats = VideoStats {
        file_size: data.len(),
        chunk_count: 0,
    };

    match format {
        VideoFormat::Mp4 | VideoFormat::Mov => read_iso_bmff(data, &mut meta, &mut stats),
        VideoFormat::WebM => read_webm(data, &mut meta),
        VideoFormat::Avi => read_avi(data, &mut meta),
        _ => {}
    }

    (meta, stats)
}

/// Encoder and AI stamp from a metadata payload; a missing encoder never
/// clears one found earlier
fn scan_tags(payload: &[u8], meta: &mut VideoMetadata) {
    if let Some(enc) = video_encoder(payload) {
        meta.encoder = Some(enc.to_string());
    }
    if has_ai_video_marker(payload) {
        meta.is_ai_marked = true;
    }
}

fn read_iso_bmff(data: &[u8], meta: &mut VideoMetadata, stats: &mut VideoStats) {
    meta.has_video = true;

    for atom in mp4::atoms(data) {
        match &atom.kind {
            b"moov" => read_movie(atom, meta),
            b"mdat" => stats.chunk_count += 1,
            b"ftyp" => {
                if has_ai_video_marker(atom.head(100)) {
                    meta.is_ai_marked = true;
                }
            }
            b"udta" => scan_tags(atom.head(500), meta),
            _ => {}
        }
    }
}

fn read_movie(parent: mp4::Atom<'_>, meta: &mut VideoMetadata) {
    for atom in parent.children() {
        match &atom.kind {
            b"trak" => {
                if contains(atom.bytes, b"soun") {
                    meta.has_audio = true;
                }
                if contains(atom.bytes, b"vide") {
                    meta.has_video = true;
                }
            }
            b"meta" => scan_tags(atom.head(1000), meta),
            b"udta" => {
                scan_tags(atom.head(500), meta);
                read_movie(atom, meta);
            }
            _ => {}
        }
    }
}

fn read_webm(data: &[u8], meta: &mut VideoMetadata) {
    meta.has_video = true;
    meta.has_audio = data.contains(&0x81);
    scan_tags(head(data, 2000), meta);
}

fn read_avi(data: &[u8], meta: &mut VideoMetadata) {
    meta.has_video = true;
    meta.has_audio = riff::avi_has_audio(data);
    if data.len() > 500 {
        scan_tags(&data[..500], meta);
    }
}

// ============================================================================
// Signals
// ============================================================================

fn metadata_score(meta: &VideoMetadata) -> f64 {
    let mut score: f64 = 0.5;

    if meta.is_ai_marked {
        score += 0.4;
    }
    if !meta.has_audio {
        score += 0.15;
    }

    let encoder = meta.encoder.as_deref().unwrap_or_default().to_lowercase();
    if any_of(&encoder, AI_VIDEO_TOOLS) {
        score += 0.3;
    }
    if any_of(&encoder, PRO_VIDEO_ENCODERS) {
        score -= 0.1;
    }

    score.clamp(0.0, 1.0)
}

fn container(data: &[u8], format: VideoFormat) -> f64 {
    if data.len() < 1000 {
        return 0.5;
    }

    let mut score: f64 = 0.5;

    if format.is_iso_bmff() {
        if !contains(head(data, 100_000), b"moov") {
            score += 0.2;
        }
        if !contains(data, b"mdat") {
            score += 0.2;
        }
    } else if format == VideoFormat::WebM && !contains(head(data, 1000), &EBML_SEGMENT) {
        score += 0.2;
    }

    score.min(1.0)
}

/// Distant regions that look alike suggest looped or interpolated frames
fn temporal_pattern(data: &[u8]) -> f64 {
    const REGIONS: usize = 5;

    if data.len() < 10_000 {
        return 0.5;
    }

    let size = data.len() / (REGIONS + 1);
    let samples: Vec<&[u8]> = (1..=REGIONS)
        .map(|i| {
            let start = i * size;
            &data[start..start + 1000.min(data.len() - start)]
        })
        .collect();

    let mut total = 0.0;
    let mut comparisons = 0usize;
    for i in 0..samples.len() - 1 {
        for j in i + 1..samples.len() {
            let sim = similarity(samples[i], samples[j]);
            if sim > 0.5 {
                total += sim;
            }
            comparisons += 1;
        }
    }

    if total / comparisons as f64 > 0.3 {
        0.7
    } else {
        0.4
    }
}

fn encoding(data: &[u8], format: VideoFormat) -> f64 {
    if CODEC_FOURCCS.iter().any(|cc| contains(data, cc)) {
        0.45
    } else if format.is_iso_bmff() || format == VideoFormat::WebM {
        0.6
    } else {
        0.5
    }
}

fn bitrate(data: &[u8]) -> f64 {
    if data.len() < 100_000 {
        return 0.6;
    }

    let chunk = data.len() / 5;
    let entropies: Vec<f64> = data.chunks_exact(chunk).take(5).map(entropy).collect();

    if variance(&entropies) > 0.1 {
        0.6
    } else {
        0.4
    }
}
