//! Audio forensics
//!
//! Container metadata plus coarse byte statistics. Nothing here decodes
//! samples: the strongest evidence in practice is what the producing tool
//! wrote into the tags, and TTS/music generators are not shy about it.
//!
//! # Formats
//!
//! - **MP3**: ID3v2 text frames, first frame header, ID3v1 trailer
//! - **WAV**: `fmt ` chunk and the first `LIST` (INFO) chunk
//! - **FLAC**: STREAMINFO and the Vorbis comment block
//! - **OGG/Opus**: codec id headers and comment text
//! - **M4A/AAC**: a text scan of the first 10KB (ilst atoms)
//!
//! # Signals
//!
//! | Signal | Weight | |
//! |--------|--------|-|
//! | metadata | 25% | AI/recording markers, ID3 presence, AI encoder |
//! | format | 15% | odd sample rates, overkill resolution, mono |
//! | pattern | 20% | entropy swings across the file body |
//! | quality | 15% | extreme bitrates, tiny files |
//! | ai_signature | 15% | generator names anywhere in the first 50KB |
//! | noise_profile | 10% | repeated 100-byte windows |

use super::aggregate::{aggregate, WeightTable};
use super::markers::{
    any_of, audio_encoder, has_ai_audio_marker, has_recording_marker, AI_AUDIO_SIGNATURES,
    AI_AUDIO_TOOLS,
};
use super::stats::{contains, entropy, head, lower_text, similarity, variance};
use crate::container::{flac, mp3, riff};
use serde::Serialize;

pub const WEIGHTS: WeightTable = &[
    ("metadata", 0.25),
    ("format", 0.15),
    ("pattern", 0.20),
    ("quality", 0.15),
    ("ai_signature", 0.15),
    ("noise_profile", 0.10),
];

const STANDARD_SAMPLE_RATES: &[u32] = &[44100, 48000, 96000, 22050, 16000];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    Wav,
    Flac,
    Ogg,
    Opus,
    M4a,
    Aac,
    #[default]
    Unknown,
}

impl AudioFormat {
    /// Identify the container. Opus is only distinguished after parsing.
    pub fn sniff(data: &[u8]) -> Self {
        if data.len() < 12 {
            return AudioFormat::Unknown;
        }

        if (data[0] == 0xFF && data[1] & 0xE0 == 0xE0) || data.starts_with(b"ID3") {
            AudioFormat::Mp3
        } else if data.starts_with(b"RIFF") && &data[8..12] == b"WAVE" {
            AudioFormat::Wav
        } else if data.starts_with(b"fLaC") {
            AudioFormat::Flac
        } else if data.starts_with(b"OggS") {
            AudioFormat::Ogg
        } else if &data[4..8] == b"ftyp" {
            AudioFormat::M4a
        } else if data[0] == 0xFF && data[1] & 0xF0 == 0xF0 {
            // ADTS; already caught by the MP3 sync test above
            AudioFormat::Aac
        } else {
            AudioFormat::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
            AudioFormat::Flac => "flac",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Opus => "opus",
            AudioFormat::M4a => "m4a",
            AudioFormat::Aac => "aac",
            AudioFormat::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AudioMetadata {
    pub format: AudioFormat,
    pub sample_rate: u32,
    pub channels: u32,
    pub bit_depth: u32,
    /// kbps
    pub bitrate: u32,
    pub has_id3: bool,
    pub encoder: Option<String>,
    pub is_ai_marked: bool,
    pub has_recording_marker: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AudioStats {
    pub file_size: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AudioSignals {
    pub metadata: f64,
    pub format: f64,
    pub pattern: f64,
    pub quality: f64,
    pub ai_signature: f64,
    pub noise_profile: f64,
}

impl AudioSignals {
    pub fn pairs(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("metadata", self.metadata),
            ("format", self.format),
            ("pattern", self.pattern),
            ("quality", self.quality),
            ("ai_signature", self.ai_signature),
            ("noise_profile", self.noise_profile),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AudioAnalysis {
    pub ai_score: f64,
    pub signals: AudioSignals,
    pub metadata: AudioMetadata,
    pub stats: AudioStats,
}

pub fn analyze(data: &[u8]) -> AudioAnalysis {
    let metadata = extract_metadata(data, AudioFormat::sniff(data));
    let stats = AudioStats {
        file_size: data.len(),
    };

    let signals = AudioSignals {
        metadata: metadata_score(&metadata),
        format: format_score(&metadata),
        pattern: pattern(data),
        quality: quality(&metadata, &stats),
        ai_signature: ai_signature(data, &metadata),
        noise_profile: noise_profile(data),
    };

    AudioAnalysis {
        ai_score: aggregate(&signals.pairs(), WEIGHTS),
        signals,
        metadata,
        stats,
    }
}

// ============================================================================
// Metadata extraction
// ============================================================================

pub fn extract_metadata(data: &[u8], format: AudioFormat) -> AudioMetadata {
    let mut meta = AudioMetadata {
        format,
        ..Default::default()
    };

    match format {
        AudioFormat::Mp3 => read_mp3(data, &mut meta),
        AudioFormat::Wav => read_wav(data, &mut meta),
        AudioFormat::Flac => read_flac(data, &mut meta),
        AudioFormat::Ogg | AudioFormat::Opus => read_ogg(data, &mut meta),
        AudioFormat::M4a | AudioFormat::Aac => read_m4a(data, &mut meta),
        AudioFormat::Unknown => {}
    }

    meta
}

fn encoder_name(text: &[u8]) -> Option<String> {
    audio_encoder(text).map(str::to_string)
}

fn read_mp3(data: &[u8], meta: &mut AudioMetadata) {
    let mut frames_from = 0;

    if let Some(tag) = mp3::Id3v2::parse(data) {
        meta.has_id3 = true;
        frames_from = tag.end(data.len());

        if let Some(body) = tag.body {
            meta.is_ai_marked = has_ai_audio_marker(body);
            meta.encoder = encoder_name(body);
            meta.has_recording_marker = has_recording_marker(body);
        }
    }

    if let Some(frame) = mp3::first_frame(data, frames_from) {
        meta.sample_rate = frame.sample_rate;
        meta.channels = frame.channel_mode.channels();
        meta.bitrate = frame.bitrate;
    }

    if mp3::has_id3v1(data) {
        meta.has_id3 = true;
    }
}

fn read_wav(data: &[u8], meta: &mut AudioMetadata) {
    let Some(fmt) = riff::wav_format(data) else {
        return;
    };

    if fmt.is_pcm() {
        meta.encoder = Some("PCM".to_string());
    }
    meta.channels = fmt.channels;
    meta.sample_rate = fmt.sample_rate;
    meta.bit_depth = fmt.bits_per_sample;

    if let Some(list) = riff::first_list(data) {
        meta.is_ai_marked = has_ai_audio_marker(list);
        meta.has_recording_marker = has_recording_marker(list);
    }
}

fn read_flac(data: &[u8], meta: &mut AudioMetadata) {
    let Some(info) = flac::stream_info(data) else {
        return;
    };

    meta.sample_rate = info.sample_rate;
    meta.channels = info.channels;
    meta.bit_depth = info.bits_per_sample;

    if let Some(comment) = flac::vorbis_comment(data) {
        meta.is_ai_marked = has_ai_audio_marker(comment);
        meta.encoder = encoder_name(comment);
    }
}

fn read_ogg(data: &[u8], meta: &mut AudioMetadata) {
    let headers = head(data, 1000);

    if contains(headers, b"vorbis") {
        meta.encoder = Some("Vorbis".to_string());
    }
    if contains(headers, b"OpusHead") {
        meta.format = AudioFormat::Opus;
        meta.encoder = Some("Opus".to_string());
    }

    if data.len() > 500 && has_ai_audio_marker(head(data, 5000)) {
        meta.is_ai_marked = true;
    }
}

fn read_m4a(data: &[u8], meta: &mut AudioMetadata) {
    let region = head(data, 10_000);
    meta.is_ai_marked = has_ai_audio_marker(region);
    meta.encoder = encoder_name(region);
}

// ============================================================================
// Signals
// ============================================================================

fn metadata_score(meta: &AudioMetadata) -> f64 {
    let mut score: f64 = 0.5;

    if meta.is_ai_marked {
        score += 0.35;
    }
    if meta.has_recording_marker {
        score -= 0.2;
    }
    if meta.has_id3 {
        score -= 0.1;
    }

    let encoder = meta.encoder.as_deref().unwrap_or_default().to_lowercase();
    if any_of(&encoder, AI_AUDIO_TOOLS) {
        score += 0.3;
    }

    score.clamp(0.0, 1.0)
}

/// Tops out at 0.8, no clamp needed
fn format_score(meta: &AudioMetadata) -> f64 {
    let mut score = 0.5;

    if meta.sample_rate > 0 && !STANDARD_SAMPLE_RATES.contains(&meta.sample_rate) {
        score += 0.1;
    }
    if meta.sample_rate >= 96_000 && meta.bit_depth >= 24 {
        score += 0.1;
    }
    if meta.channels == 1 {
        score += 0.1;
    }

    score
}

/// Entropy spread across four regions of the body
fn pattern(data: &[u8]) -> f64 {
    if data.len() < 5000 {
        return 0.5;
    }

    let region = data.len() / 5;
    let entropies: Vec<f64> = (1..5)
        .map(|i| i * region)
        .filter(|&start| start < data.len())
        .map(|start| entropy(&data[start..start + 2000.min(data.len() - start)]))
        .collect();

    if entropies.len() < 2 {
        return 0.5;
    }

    if variance(&entropies) > 0.05 {
        0.6
    } else {
        0.4
    }
}

fn quality(meta: &AudioMetadata, stats: &AudioStats) -> f64 {
    let mut score = 0.5;

    if meta.bitrate > 0 && meta.bitrate < 64 {
        score += 0.1;
    }
    if meta.bitrate > 320 {
        score += 0.1;
    }
    if stats.file_size > 0 && stats.file_size < 10_000 {
        score += 0.2;
    }

    score
}

fn ai_signature(data: &[u8], meta: &AudioMetadata) -> f64 {
    let mut score: f64 = 0.0;

    if any_of(&lower_text(head(data, 50_000)), AI_AUDIO_SIGNATURES) {
        score += 0.3;
    }
    if meta.is_ai_marked {
        score += 0.4;
    }

    score.min(1.0)
}

/// Many byte-identical neighbouring windows point at synthetic silence/tones
fn noise_profile(data: &[u8]) -> f64 {
    const WINDOW: usize = 100;

    if data.len() < 10_000 {
        return 0.5;
    }

    let start = data.len() / 3;
    let sample = &data[start..start + 5000.min(data.len() - start)];

    let repeats = (0..)
        .step_by(WINDOW)
        .take_while(|&i| i + 2 * WINDOW < sample.len())
        .filter(|&i| similarity(&sample[i..i + WINDOW], &sample[i + WINDOW..i + 2 * WINDOW]) > 0.9)
        .count();

    if repeats > 5 {
        0.7
    } else {
        0.4
    }
}
