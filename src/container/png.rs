//! PNG header and chunk walking
//!
//! ```text
//! 0   89 50 4E 47 0D 0A 1A 0A   signature
//! 8   length (BE32) + "IHDR"
//! 16  width  (BE32)
//! 20  height (BE32)
//! 24  bit depth
//! ```
//!
//! After the signature every chunk is `length(4) type(4) data(length) crc(4)`.

use crate::analyzer::stats::be_u32;

pub const SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Header {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u32,
}

/// Read the IHDR fields at their fixed offsets
pub fn header(data: &[u8]) -> Header {
    let mut h = Header::default();
    if data.len() >= 24 {
        h.width = be_u32(data, 16).unwrap_or(0);
        h.height = be_u32(data, 20).unwrap_or(0);
    }
    if data.len() >= 25 {
        h.bit_depth = data[24] as u32;
    }
    h
}

#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    pub kind: [u8; 4],
    /// Chunk data when the declared length fits strictly inside the file
    pub payload: Option<&'a [u8]>,
}

impl Chunk<'_> {
    pub fn is_text(&self) -> bool {
        &self.kind == b"tEXt" || &self.kind == b"iTXt"
    }
}

/// Iterator over chunks, starting after the signature
pub struct Chunks<'a> {
    data: &'a [u8],
    pos: usize,
}

pub fn chunks(data: &[u8]) -> Chunks<'_> {
    Chunks { data, pos: 8 }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.pos;
        if i.checked_add(8)? >= self.data.len() {
            return None;
        }

        let len = be_u32(self.data, i)? as usize;
        let kind = [self.data[i + 4], self.data[i + 5], self.data[i + 6], self.data[i + 7]];

        let payload = match (i + 8).checked_add(len) {
            Some(end) if len > 0 && end < self.data.len() => Some(&self.data[i + 8..end]),
            _ => None,
        };

        // An overflowing length ends the walk
        self.pos = i.checked_add(12)?.checked_add(len).unwrap_or(usize::MAX);

        Some(Chunk { kind, payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut c = (payload.len() as u32).to_be_bytes().to_vec();
        c.extend_from_slice(kind);
        c.extend_from_slice(payload);
        c.extend_from_slice(&[0, 0, 0, 0]);
        c
    }

    fn ihdr(width: u32, height: u32, depth: u8) -> Vec<u8> {
        let mut payload = width.to_be_bytes().to_vec();
        payload.extend_from_slice(&height.to_be_bytes());
        payload.extend_from_slice(&[depth, 2, 0, 0, 0]);

        let mut data = SIGNATURE.to_vec();
        data.extend(chunk(b"IHDR", &payload));
        data
    }

    #[test]
    fn test_header() {
        let data = ihdr(1024, 768, 8);
        assert_eq!(header(&data), Header { width: 1024, height: 768, bit_depth: 8 });
    }

    #[test]
    fn test_header_truncated() {
        let data = ihdr(1024, 768, 8);
        assert_eq!(header(&data[..20]), Header::default());
        assert_eq!(header(&data[..24]).bit_depth, 0);
        assert_eq!(header(&data[..24]).height, 768);
    }

    #[test]
    fn test_chunk_walk() {
        let mut data = ihdr(10, 10, 8);
        data.extend(chunk(b"tEXt", b"parameters\0Stable Diffusion v1.5"));
        data.extend(chunk(b"IEND", b""));

        let kinds: Vec<[u8; 4]> = chunks(&data).map(|c| c.kind).collect();
        assert_eq!(kinds, vec![*b"IHDR", *b"tEXt", *b"IEND"]);

        let text = chunks(&data).find(|c| c.is_text()).unwrap();
        assert!(text.payload.unwrap().ends_with(b"v1.5"));
    }

    #[test]
    fn test_chunk_walk_hostile_length() {
        let mut data = SIGNATURE.to_vec();
        data.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF]);
        data.extend_from_slice(b"tEXt");
        data.extend_from_slice(b"junk");

        let all: Vec<Chunk> = chunks(&data).collect();
        assert_eq!(all.len(), 1);
        assert!(all[0].payload.is_none());
    }
}
