//! Image forensics
//!
//! Works on the encoded file, never on decoded pixels. The container tells us
//! where the picture came from (EXIF camera tags, generator stamps in PNG
//! text chunks, quantization tables), and byte statistics over the
//! compressed stream stand in for texture and noise analysis.
//!
//! | Signal | Weight | Looks at |
//! |--------|--------|----------|
//! | metadata | 25% | EXIF, camera make, GPS, generator software |
//! | color_distribution | 20% | entropy of a 1000-byte sample |
//! | edge_consistency | 15% | near-identical distant regions |
//! | noise_pattern | 15% | local variance in 16-byte windows |
//! | compression_artifacts | 15% | JPEG quantization table level |
//! | symmetry | 10% | early region vs middle region similarity |

use super::aggregate::{aggregate, WeightTable};
use super::markers::{any_of, AI_GENERATOR_LABEL, AI_IMAGE_GENERATORS, AI_PNG_GENERATORS};
use super::stats::{entropy, mean, similarity, variance};
use crate::container::{jpeg, png};
use serde::Serialize;

pub const WEIGHTS: WeightTable = &[
    ("metadata", 0.25),
    ("color_distribution", 0.20),
    ("edge_consistency", 0.15),
    ("noise_pattern", 0.15),
    ("compression_artifacts", 0.15),
    ("symmetry", 0.10),
];

const CAMERA_MAKES: &[&str] = &["Apple", "Canon", "Nikon", "Sony", "Samsung", "Google"];

const EDITORS: &[&str] = &["Photoshop", "GIMP", "Lightroom"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
    Bmp,
    #[default]
    Unknown,
}

impl ImageFormat {
    pub fn sniff(data: &[u8]) -> Self {
        if data.len() < 8 {
            return ImageFormat::Unknown;
        }

        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            ImageFormat::Jpeg
        } else if data.starts_with(&png::SIGNATURE) {
            ImageFormat::Png
        } else if data.starts_with(b"GIF8") {
            ImageFormat::Gif
        } else if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            ImageFormat::WebP
        } else if data.starts_with(b"BM") {
            ImageFormat::Bmp
        } else {
            ImageFormat::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::WebP => "webp",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImageMetadata {
    pub has_exif: bool,
    pub camera_make: Option<String>,
    pub software: Option<String>,
    pub has_gps: bool,
    pub is_screenshot: bool,
    pub file_format: ImageFormat,
}

impl ImageMetadata {
    pub fn is_ai_generated(&self) -> bool {
        self.software.as_deref() == Some(AI_GENERATOR_LABEL)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImageStats {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u32,
    pub channels: u32,
    pub file_size: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImageSignals {
    pub metadata: f64,
    pub color_distribution: f64,
    pub edge_consistency: f64,
    pub noise_pattern: f64,
    pub compression_artifacts: f64,
    pub symmetry: f64,
}

impl ImageSignals {
    pub fn pairs(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("metadata", self.metadata),
            ("color_distribution", self.color_distribution),
            ("edge_consistency", self.edge_consistency),
            ("noise_pattern", self.noise_pattern),
            ("compression_artifacts", self.compression_artifacts),
            ("symmetry", self.symmetry),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImageAnalysis {
    pub ai_score: f64,
    pub signals: ImageSignals,
    pub metadata: ImageMetadata,
    pub stats: ImageStats,
}

pub fn analyze(data: &[u8]) -> ImageAnalysis {
    let format = ImageFormat::sniff(data);
    let metadata = extract_metadata(data, format);
    let stats = image_stats(data, format);

    let signals = ImageSignals {
        metadata: metadata_score(&metadata),
        color_distribution: color_distribution(data, format),
        edge_consistency: edge_consistency(data),
        noise_pattern: noise_pattern(data),
        compression_artifacts: compression_artifacts(data, format),
        symmetry: symmetry(data),
    };

    ImageAnalysis {
        ai_score: aggregate(&signals.pairs(), WEIGHTS),
        signals,
        metadata,
        stats,
    }
}

// ============================================================================
// Metadata extraction
// ============================================================================

pub fn extract_metadata(data: &[u8], format: ImageFormat) -> ImageMetadata {
    let mut meta = match format {
        ImageFormat::Jpeg => jpeg_metadata(data),
        ImageFormat::Png => png_metadata(data),
        _ => ImageMetadata::default(),
    };
    meta.file_format = format;
    meta
}

fn jpeg_metadata(data: &[u8]) -> ImageMetadata {
    let mut meta = ImageMetadata::default();

    if let Some(app1) = jpeg::first_app1(data).filter(|s| jpeg::is_exif(s)) {
        meta.has_exif = true;

        let text = String::from_utf8_lossy(app1);
        meta.camera_make = CAMERA_MAKES
            .iter()
            .find(|m| text.contains(*m))
            .map(|m| m.to_string());

        meta.software = EDITORS
            .iter()
            .find(|e| text.contains(*e))
            .map(|e| e.to_string())
            .or_else(|| any_of(&text, AI_IMAGE_GENERATORS).then(|| AI_GENERATOR_LABEL.to_string()));

        meta.has_gps = text.contains("GPS");
    }

    meta.is_screenshot = meta.software.is_none() && !meta.has_exif;
    meta
}

fn png_metadata(data: &[u8]) -> ImageMetadata {
    let mut meta = ImageMetadata::default();

    for chunk in png::chunks(data) {
        if chunk.is_text() {
            meta.has_exif = true;
        }

        if let Some(payload) = chunk.payload {
            if any_of(&String::from_utf8_lossy(payload), AI_PNG_GENERATORS) {
                meta.software = Some(AI_GENERATOR_LABEL.to_string());
            }
        }
    }

    meta
}

pub fn image_stats(data: &[u8], format: ImageFormat) -> ImageStats {
    let mut stats = ImageStats {
        file_size: data.len(),
        ..Default::default()
    };

    match format {
        ImageFormat::Jpeg => {
            if let Some(frame) = jpeg::frame_info(data) {
                stats.width = frame.width;
                stats.height = frame.height;
                stats.bit_depth = frame.bit_depth;
                stats.channels = frame.channels;
            }
        }
        ImageFormat::Png => {
            let header = png::header(data);
            stats.width = header.width;
            stats.height = header.height;
            stats.bit_depth = header.bit_depth;
        }
        _ => {}
    }

    stats
}

// ============================================================================
// Signals
// ============================================================================

fn metadata_score(meta: &ImageMetadata) -> f64 {
    let mut score: f64 = 0.5;

    if meta.has_exif {
        score -= 0.2;
    } else {
        score += 0.2;
    }
    if meta.camera_make.is_some() {
        score -= 0.2;
    }
    if meta.has_gps {
        score -= 0.2;
    }
    if meta.is_ai_generated() {
        score += 0.4;
    }
    if meta.is_screenshot {
        score += 0.1;
    }

    score.clamp(0.0, 1.0)
}

/// Natural images compress to mid-high entropy; extremes are suspicious
fn color_distribution(data: &[u8], format: ImageFormat) -> f64 {
    if data.len() < 1000 {
        return 0.5;
    }

    let start = if format == ImageFormat::Png { 50 } else { 100 };
    let Some(sample) = data.get(start..start + 1000) else {
        return 0.5;
    };

    let e = entropy(sample);
    if !(0.6..=0.98).contains(&e) {
        0.7
    } else {
        0.4
    }
}

/// Repeated textures show up as near-identical distant byte regions
fn edge_consistency(data: &[u8]) -> f64 {
    const SAMPLE: usize = 256;

    if data.len() < 5000 {
        return 0.5;
    }

    let step = data.len() / 12;
    let samples: Vec<&[u8]> = (1000..)
        .step_by(step)
        .take_while(|&i| i + SAMPLE < data.len())
        .take(10)
        .map(|i| &data[i..i + SAMPLE])
        .collect();

    if samples.len() < 3 {
        return 0.5;
    }

    let mut similar = 0usize;
    for i in 0..samples.len() - 1 {
        for j in i + 1..samples.len() {
            if similarity(samples[i], samples[j]) > 0.9 {
                similar += 1;
            }
        }
    }

    let pairs = samples.len() * (samples.len() - 1) / 2;
    if similar as f64 / pairs as f64 > 0.3 {
        0.7
    } else {
        0.4
    }
}

/// Sensor noise is moderate and even; generated images are too clean or erratic
fn noise_pattern(data: &[u8]) -> f64 {
    const WINDOW: usize = 16;

    if data.len() < 2000 {
        return 0.5;
    }

    let sample = &data[500..1500];
    let variances: Vec<f64> = (0..)
        .step_by(WINDOW)
        .take_while(|&i| i + WINDOW < sample.len())
        .map(|i| {
            let window: Vec<f64> = sample[i..i + WINDOW].iter().map(|&b| b as f64).collect();
            variance(&window)
        })
        .collect();

    if variances.is_empty() {
        return 0.5;
    }

    let avg = mean(&variances);
    let spread = variance(&variances).sqrt() / (avg + 1.0);

    if avg < 10.0 {
        0.7
    } else if spread > 2.0 {
        0.6
    } else {
        0.4
    }
}

/// Quantization level: near-lossless or heavily crushed tables are atypical
/// for camera output
fn compression_artifacts(data: &[u8], format: ImageFormat) -> f64 {
    if format != ImageFormat::Jpeg {
        return 0.5;
    }

    match jpeg::quant_table_sum(data) {
        Some(sum) if sum < 200 => 0.7,
        Some(sum) if sum > 3000 => 0.6,
        Some(_) => 0.4,
        None => 0.5,
    }
}

fn symmetry(data: &[u8]) -> f64 {
    if data.len() < 2000 {
        return 0.5;
    }

    let mid = data.len() / 2;
    let Some(middle) = data.get(mid..mid + 500) else {
        return 0.5;
    };

    if similarity(&data[100..600], middle) > 0.7 {
        0.7
    } else {
        0.4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::aggregate::weights_sum;

    fn jfif(extra: usize) -> Vec<u8> {
        let mut d = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];
        d.extend(vec![0u8; extra]);
        d
    }

    fn exif_jpeg(exif: &[u8]) -> Vec<u8> {
        let mut d = vec![0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x00];
        d.extend_from_slice(b"Exif\0\0");
        d.extend_from_slice(exif);
        d.extend(vec![0u8; 200]);
        d
    }

    fn png_with(width: u32, height: u32, text: Option<&[u8]>) -> Vec<u8> {
        let mut d = png::SIGNATURE.to_vec();
        d.extend_from_slice(&13u32.to_be_bytes());
        d.extend_from_slice(b"IHDR");
        d.extend_from_slice(&width.to_be_bytes());
        d.extend_from_slice(&height.to_be_bytes());
        d.extend_from_slice(&[8, 6, 0, 0, 0]);
        d.extend_from_slice(&[0, 0, 0, 0]);
        if let Some(text) = text {
            d.extend_from_slice(&(text.len() as u32).to_be_bytes());
            d.extend_from_slice(b"tEXt");
            d.extend_from_slice(text);
            d.extend_from_slice(&[0, 0, 0, 0]);
        }
        d.extend_from_slice(&0u32.to_be_bytes());
        d.extend_from_slice(b"IEND");
        d.extend_from_slice(&[0, 0, 0, 0]);
        d
    }

    #[test]
    fn test_weights_sum_to_one() {
        assert!((weights_sum(WEIGHTS) - 1.0).abs() < 0.01);
    }

    // ==========================================================================
    // FORMAT SNIFFING
    // ==========================================================================

    #[test]
    fn test_sniff() {
        assert_eq!(ImageFormat::sniff(&jfif(0)), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::sniff(&png_with(1, 1, None)), ImageFormat::Png);
        assert_eq!(ImageFormat::sniff(b"GIF89a\0\0"), ImageFormat::Gif);
        assert_eq!(ImageFormat::sniff(b"RIFF\0\0\0\0WEBPVP8 "), ImageFormat::WebP);
        assert_eq!(ImageFormat::sniff(b"BM\0\0\0\0\0\0"), ImageFormat::Bmp);
        assert_eq!(ImageFormat::sniff(b"not an image"), ImageFormat::Unknown);
    }

    #[test]
    fn test_sniff_short_input_is_unknown() {
        for len in 0..8 {
            assert_eq!(ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0][..len]), ImageFormat::Unknown);
        }
    }

    // ==========================================================================
    // METADATA
    // ==========================================================================

    #[test]
    fn test_jfif_scenario() {
        // SCENARIO: JFIF header + 1000 zero bytes
        let result = analyze(&jfif(1000));
        assert_eq!(result.metadata.file_format.as_str(), "jpeg");
        assert!(!result.metadata.has_exif);
        assert!(result.metadata.is_screenshot);
    }

    #[test]
    fn test_camera_exif() {
        let meta = extract_metadata(&exif_jpeg(b"MM\0*Canon\0EOS R5\0GPSInfo"), ImageFormat::Jpeg);
        assert!(meta.has_exif);
        assert_eq!(meta.camera_make.as_deref(), Some("Canon"));
        assert!(meta.has_gps);
        assert!(!meta.is_screenshot);
        assert_eq!(metadata_score(&meta), 0.0);
    }

    #[test]
    fn test_editor_wins_over_generator() {
        let meta = extract_metadata(&exif_jpeg(b"Adobe Photoshop 2024 / Midjourney"), ImageFormat::Jpeg);
        assert_eq!(meta.software.as_deref(), Some("Photoshop"));
    }

    #[test]
    fn test_generator_in_exif() {
        let meta = extract_metadata(&exif_jpeg(b"Software\0DALL-E 3"), ImageFormat::Jpeg);
        assert!(meta.is_ai_generated());
        // 0.5 - 0.2 (exif) + 0.4 (generator)
        assert!((metadata_score(&meta) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_png_ihdr_scenario() {
        // SCENARIO: signature + IHDR 1024x768, depth 8
        let result = analyze(&png_with(1024, 768, None));
        assert_eq!(result.stats.width, 1024);
        assert_eq!(result.stats.height, 768);
        assert_eq!(result.stats.bit_depth, 8);
        assert_eq!(result.metadata.file_format, ImageFormat::Png);
    }

    #[test]
    fn test_png_generator_text_chunk() {
        let data = png_with(512, 512, Some(b"parameters\0a cat, Steps: 20, Stable Diffusion"));
        let meta = extract_metadata(&data, ImageFormat::Png);
        assert!(meta.has_exif);
        assert!(meta.is_ai_generated());
        assert!(!meta.is_screenshot);
    }

    #[test]
    fn test_no_metadata_score() {
        // No EXIF (+0.2), screenshot (+0.1)
        let meta = extract_metadata(&jfif(100), ImageFormat::Jpeg);
        assert!((metadata_score(&meta) - 0.8).abs() < 1e-9);
    }

    // ==========================================================================
    // SIGNALS
    // ==========================================================================

    #[test]
    fn test_jpeg_frame_stats() {
        let mut data = jfif(0);
        data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08, 0x02, 0xD0, 0x05, 0x00, 0x03]);
        data.extend(vec![0u8; 32]);

        let stats = image_stats(&data, ImageFormat::Jpeg);
        assert_eq!((stats.width, stats.height, stats.channels), (1280, 720, 3));
        assert_eq!(stats.file_size, data.len());
    }

    #[test]
    fn test_compression_levels() {
        let with_dqt = |value: u8| {
            let mut d = jfif(0);
            d.extend_from_slice(&[0xFF, 0xDB, 0x00, 0x43, 0x00]);
            d.extend(vec![value; 64]);
            d.extend(vec![0u8; 200]);
            d
        };

        assert_eq!(compression_artifacts(&with_dqt(1), ImageFormat::Jpeg), 0.7);
        assert_eq!(compression_artifacts(&with_dqt(20), ImageFormat::Jpeg), 0.4);
        assert_eq!(compression_artifacts(&with_dqt(60), ImageFormat::Jpeg), 0.6);
        assert_eq!(compression_artifacts(&jfif(500), ImageFormat::Jpeg), 0.5);
        assert_eq!(compression_artifacts(&with_dqt(1), ImageFormat::Png), 0.5);
    }

    #[test]
    fn test_flat_data_is_suspicious() {
        let data = vec![0u8; 6000];
        assert_eq!(color_distribution(&data, ImageFormat::Unknown), 0.7);
        assert_eq!(edge_consistency(&data), 0.7);
        assert_eq!(noise_pattern(&data), 0.7);
        assert_eq!(symmetry(&data), 0.7);
    }

    #[test]
    fn test_noisy_data() {
        // Pseudo-random bytes via an LCG
        let mut x: u32 = 12345;
        let data: Vec<u8> = (0..20_000)
            .map(|_| {
                x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                (x >> 16) as u8
            })
            .collect();

        assert_eq!(edge_consistency(&data), 0.4);
        assert_eq!(noise_pattern(&data), 0.4);
        assert_eq!(symmetry(&data), 0.4);
    }

    #[test]
    fn test_short_data_is_neutral() {
        let data = vec![7u8; 500];
        assert_eq!(color_distribution(&data, ImageFormat::Jpeg), 0.5);
        assert_eq!(edge_consistency(&data), 0.5);
        assert_eq!(noise_pattern(&data), 0.5);
        assert_eq!(symmetry(&data), 0.5);
    }

    #[test]
    fn test_analysis_bounded_on_garbage() {
        for len in [0usize, 1, 7, 8, 100, 1999, 5000] {
            let data = vec![0xFFu8; len];
            let r = analyze(&data);
            assert!((0.0..=1.0).contains(&r.ai_score));
        }
    }
}
