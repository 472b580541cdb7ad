//! RIFF containers: WAV and AVI
//!
//! Canonical WAV layout (all little-endian):
//! ```text
//! 0   "RIFF" size "WAVE"
//! 12  "fmt " chunk size
//! 20  format code (1 = PCM)
//! 22  channels
//! 24  sample rate
//! 34  bits per sample
//! 36  next chunk (data, LIST, ...)
//! ```

use crate::analyzer::stats::{find_pattern, le_u16, le_u32};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WavFormat {
    pub format_code: u16,
    pub channels: u32,
    pub sample_rate: u32,
    pub bits_per_sample: u32,
}

impl WavFormat {
    pub fn is_pcm(&self) -> bool {
        self.format_code == 1
    }
}

/// Read the canonical `fmt ` chunk. Needs a full 44-byte header.
pub fn wav_format(data: &[u8]) -> Option<WavFormat> {
    if data.len() < 44 || &data[12..16] != b"fmt " {
        return None;
    }

    Some(WavFormat {
        format_code: le_u16(data, 20)?,
        channels: le_u16(data, 22)? as u32,
        sample_rate: le_u32(data, 24)?,
        bits_per_sample: le_u16(data, 34)? as u32,
    })
}

/// Payload of the first `LIST` chunk after the fmt chunk
///
/// Returns `None` both when there is no LIST chunk and when the first one
/// overruns the file; later LIST chunks are never consulted.
pub fn first_list(data: &[u8]) -> Option<&[u8]> {
    let end = data.len().checked_sub(8)?;
    let i = (36..end).find(|&i| &data[i..i + 4] == b"LIST")?;

    let size = le_u32(data, i + 4)? as usize;
    let stop = (i + 8).checked_add(size)?;
    data.get(i + 8..stop)
}

/// True when an AVI stream list declares an audio stream
pub fn avi_has_audio(data: &[u8]) -> bool {
    find_pattern(data, b"auds").is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav(channels: u16, rate: u32, bits: u16) -> Vec<u8> {
        let mut d = b"RIFF".to_vec();
        d.extend_from_slice(&0u32.to_le_bytes());
        d.extend_from_slice(b"WAVEfmt ");
        d.extend_from_slice(&16u32.to_le_bytes());
        d.extend_from_slice(&1u16.to_le_bytes());
        d.extend_from_slice(&channels.to_le_bytes());
        d.extend_from_slice(&rate.to_le_bytes());
        d.extend_from_slice(&(rate * channels as u32 * bits as u32 / 8).to_le_bytes());
        d.extend_from_slice(&(channels * bits / 8).to_le_bytes());
        d.extend_from_slice(&bits.to_le_bytes());
        d
    }

    #[test]
    fn test_wav_format_fields() {
        let mut data = wav(2, 48000, 24);
        data.extend_from_slice(b"data");
        data.extend_from_slice(&0u32.to_le_bytes());

        let fmt = wav_format(&data).unwrap();
        assert!(fmt.is_pcm());
        assert_eq!(fmt.channels, 2);
        assert_eq!(fmt.sample_rate, 48000);
        assert_eq!(fmt.bits_per_sample, 24);
    }

    #[test]
    fn test_wav_format_too_short() {
        let data = wav(1, 16000, 16);
        assert_eq!(data.len(), 36);
        assert!(wav_format(&data).is_none());
    }

    #[test]
    fn test_first_list() {
        let mut data = wav(1, 16000, 16);
        data.extend_from_slice(b"LIST");
        data.extend_from_slice(&9u32.to_le_bytes());
        data.extend_from_slice(b"INFOISFT\0");
        data.extend(vec![0u8; 4]);

        assert_eq!(first_list(&data), Some(&b"INFOISFT\0"[..]));
    }

    #[test]
    fn test_first_list_overrun() {
        let mut data = wav(1, 16000, 16);
        data.extend_from_slice(b"LIST");
        data.extend_from_slice(&1000u32.to_le_bytes());
        data.extend_from_slice(b"INFO");
        // A second, valid LIST is ignored
        data.extend_from_slice(b"LIST");
        data.extend_from_slice(&4u32.to_le_bytes());
        data.extend_from_slice(b"INFO");

        assert!(first_list(&data).is_none());
    }

    #[test]
    fn test_avi_audio() {
        assert!(avi_has_audio(b"RIFF....AVI LIST....strhauds"));
        assert!(!avi_has_audio(b"RIFF....AVI LIST....strhvids"));
    }
}
