//! MP3 tag and frame header parsing
//!
//! MP3 frames start with a sync word (11 bits of 1s) followed by header info.
//! Frame header structure (4 bytes):
//! AAAAAAAA AAABBCCD EEEEFFGH IIJJKLMM
//!
//! A = sync (11 bits)
//! B = MPEG version (2 bits)
//! C = Layer (2 bits)
//! D = Protection bit (CRC)
//! E = Bitrate index (4 bits)
//! F = Sample rate index (2 bits)
//! G = Padding bit
//! H = Private bit
//! I = Channel mode (2 bits)
//! J..M = mode extension, copyright, original, emphasis
//!
//! Only the MPEG-1 Layer III tables are consulted. MPEG-2/2.5 files report
//! MPEG-1 numbers, which is good enough for the format heuristics that use
//! them.
//!
//! ID3v2 tags precede the first frame. Their size is a 28-bit "syncsafe"
//! integer: four bytes with the high bit of each cleared.

use crate::analyzer::stats::be_u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    Stereo,
    JointStereo,
    DualChannel,
    Mono,
}

impl ChannelMode {
    pub fn channels(self) -> u32 {
        match self {
            ChannelMode::Mono => 1,
            _ => 2,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FrameHeader {
    /// kbps, 0 for free/bad index
    pub bitrate: u32,
    /// Hz, 0 for the reserved index
    pub sample_rate: u32,
    pub channel_mode: ChannelMode,
}

// Bitrate lookup table (kbps)
// Index 0 = free, 15 = bad
const BITRATES_V1_L3: [u32; 16] = [0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 0];

// Sample rate lookup table (Hz)
const SAMPLE_RATES_V1: [u32; 4] = [44100, 48000, 32000, 0];

impl FrameHeader {
    /// Parse a 4-byte frame header. Only the sync word is validated.
    pub fn parse(header: [u8; 4]) -> Option<Self> {
        if header[0] != 0xFF || (header[1] & 0xE0) != 0xE0 {
            return None;
        }

        let h = u32::from_be_bytes(header);

        let bitrate = BITRATES_V1_L3[((h >> 12) & 0x0F) as usize];
        let sample_rate = SAMPLE_RATES_V1[((h >> 10) & 0x03) as usize];

        let channel_mode = match (h >> 6) & 0x03 {
            0 => ChannelMode::Stereo,
            1 => ChannelMode::JointStereo,
            2 => ChannelMode::DualChannel,
            _ => ChannelMode::Mono,
        };

        Some(FrameHeader {
            bitrate,
            sample_rate,
            channel_mode,
        })
    }
}

/// Decode a 4-byte syncsafe integer (7 bits per byte)
pub fn syncsafe(buf: [u8; 4]) -> u32 {
    ((buf[0] as u32 & 0x7F) << 21)
        | ((buf[1] as u32 & 0x7F) << 14)
        | ((buf[2] as u32 & 0x7F) << 7)
        | (buf[3] as u32 & 0x7F)
}

/// ID3v2 tag at the start of the file
#[derive(Debug, Clone, Copy)]
pub struct Id3v2<'a> {
    /// Declared tag size, excluding the 10-byte header
    pub size: usize,
    /// Tag body when it fits inside the file
    pub body: Option<&'a [u8]>,
}

impl<'a> Id3v2<'a> {
    pub fn parse(data: &'a [u8]) -> Option<Self> {
        if data.len() <= 10 || &data[..3] != b"ID3" {
            return None;
        }

        let size = syncsafe([data[6], data[7], data[8], data[9]]) as usize;
        let body = if size > 0 && size + 10 < data.len() {
            Some(&data[10..10 + size])
        } else {
            None
        };

        Some(Id3v2 { size, body })
    }

    /// Offset of the first byte after the tag, clamped to the data
    pub fn end(&self, data_len: usize) -> usize {
        (10 + self.size).min(data_len)
    }
}

/// True if the file ends with an ID3v1 `TAG` block
pub fn has_id3v1(data: &[u8]) -> bool {
    data.len() >= 128 && &data[data.len() - 128..data.len() - 125] == b"TAG"
}

/// Find and parse the first frame header at or after `from`
///
/// Callers pass the end of the ID3v2 tag so sync-like bytes inside tag
/// frames are never mistaken for audio.
pub fn first_frame(data: &[u8], from: usize) -> Option<FrameHeader> {
    let end = data.len().checked_sub(4)?;
    (from..end)
        .find(|&i| data[i] == 0xFF && (data[i + 1] & 0xE0) == 0xE0)
        .and_then(|i| be_u32(data, i))
        .and_then(|h| FrameHeader::parse(h.to_be_bytes()))
}
