//! FLAC STREAMINFO and metadata block walking
//!
//! After the `fLaC` marker, metadata blocks follow:
//! ```text
//! byte 0     L TTTTTTT   last-block flag + block type
//! bytes 1-3  block size (BE24)
//! ```
//! STREAMINFO is always first, so its packed fields sit at fixed offsets:
//! sample rate is 20 bits at bytes 18..21, then 3 bits channels-1,
//! then 5 bits bits-per-sample-1.

pub const VORBIS_COMMENT: u8 = 4;

/// Walk stops here even if blocks continue
const SCAN_LIMIT: usize = 10_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamInfo {
    pub sample_rate: u32,
    pub channels: u32,
    pub bits_per_sample: u32,
}

/// Unpack STREAMINFO. Needs at least 42 bytes (marker + header + block).
pub fn stream_info(data: &[u8]) -> Option<StreamInfo> {
    if data.len() < 42 {
        return None;
    }

    let (d18, d19, d20, d21) = (data[18] as u32, data[19] as u32, data[20] as u32, data[21] as u32);

    Some(StreamInfo {
        sample_rate: (d18 << 12) | (d19 << 4) | (d20 >> 4),
        channels: ((d20 >> 1) & 0x07) + 1,
        bits_per_sample: (((d20 & 0x01) << 4) | (d21 >> 4)) + 1,
    })
}

#[derive(Debug, Clone, Copy)]
pub struct Block<'a> {
    pub kind: u8,
    pub is_last: bool,
    /// Block body when it fits inside the file
    pub body: Option<&'a [u8]>,
}

pub struct Blocks<'a> {
    data: &'a [u8],
    pos: usize,
    done: bool,
}

pub fn blocks(data: &[u8]) -> Blocks<'_> {
    Blocks { data, pos: 4, done: false }
}

impl<'a> Iterator for Blocks<'a> {
    type Item = Block<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.pos;
        if self.done || i + 4 >= self.data.len() || i >= SCAN_LIMIT {
            return None;
        }

        let head = self.data[i];
        let size = ((self.data[i + 1] as usize) << 16)
            | ((self.data[i + 2] as usize) << 8)
            | self.data[i + 3] as usize;

        let block = Block {
            kind: head & 0x7F,
            is_last: head & 0x80 != 0,
            body: self.data.get(i + 4..i + 4 + size),
        };

        self.pos = i + 4 + size;
        self.done = block.is_last;

        Some(block)
    }
}

/// Body of the first Vorbis comment block that fits
pub fn vorbis_comment(data: &[u8]) -> Option<&[u8]> {
    blocks(data)
        .filter(|b| b.kind == VORBIS_COMMENT)
        .find_map(|b| b.body)
}
