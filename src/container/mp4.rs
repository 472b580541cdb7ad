//! ISO base media (MP4/MOV/M4A) atom walking
//!
//! Every atom is `size(BE32) type(4) body`, where size includes the 8-byte
//! header. Top-level atoms in a truncated file are clamped to what is left;
//! nested atoms that overrun their parent end the walk.
//!
//! 64-bit sizes (`size == 1`) and to-end atoms (`size == 0`) are treated as
//! invalid, which stops the walk.

use crate::analyzer::stats::be_u32;

#[derive(Debug, Clone, Copy)]
pub struct Atom<'a> {
    pub kind: [u8; 4],
    /// The whole atom, header included
    pub bytes: &'a [u8],
}

impl<'a> Atom<'a> {
    pub fn is(&self, kind: &[u8; 4]) -> bool {
        &self.kind == kind
    }

    /// Body after the header, capped at `max` bytes from the atom start
    pub fn head(&self, max: usize) -> &'a [u8] {
        let end = self.bytes.len().min(max);
        if end <= 8 {
            return &[];
        }
        &self.bytes[8..end]
    }

    /// Atoms nested directly inside this one
    pub fn children(&self) -> Atoms<'a> {
        Atoms {
            data: self.bytes,
            pos: 8,
            clamp: false,
        }
    }
}

pub struct Atoms<'a> {
    data: &'a [u8],
    pos: usize,
    clamp: bool,
}

/// Top-level atoms of a file
pub fn atoms(data: &[u8]) -> Atoms<'_> {
    Atoms {
        data,
        pos: 0,
        clamp: true,
    }
}

impl<'a> Iterator for Atoms<'a> {
    type Item = Atom<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.pos;
        if offset + 8 >= self.data.len() {
            return None;
        }

        let mut size = be_u32(self.data, offset)? as usize;
        let kind = [
            self.data[offset + 4],
            self.data[offset + 5],
            self.data[offset + 6],
            self.data[offset + 7],
        ];

        let remaining = self.data.len() - offset;
        if size < 8 || (size > remaining && !self.clamp) {
            self.pos = self.data.len();
            return None;
        }
        size = size.min(remaining);

        self.pos = offset + size;
        Some(Atom {
            kind,
            bytes: &self.data[offset..offset + size],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(kind: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut a = ((body.len() + 8) as u32).to_be_bytes().to_vec();
        a.extend_from_slice(kind);
        a.extend_from_slice(body);
        a
    }

    fn kinds(iter: Atoms) -> Vec<[u8; 4]> {
        iter.map(|a| a.kind).collect()
    }

    #[test]
    fn test_top_level_walk() {
        let mut data = atom(b"ftyp", b"isom\0\0\0\0");
        data.extend(atom(b"moov", &atom(b"mvhd", &[0u8; 20])));
        data.extend(atom(b"mdat", &[1u8; 64]));

        assert_eq!(kinds(atoms(&data)), vec![*b"ftyp", *b"moov", *b"mdat"]);
    }

    #[test]
    fn test_size_below_header_stops() {
        let mut data = atom(b"ftyp", b"isom");
        data.extend_from_slice(&4u32.to_be_bytes());
        data.extend_from_slice(b"junkjunkjunk");
        data.extend(atom(b"mdat", &[0u8; 16]));

        assert_eq!(kinds(atoms(&data)), vec![*b"ftyp"]);
    }

    #[test]
    fn test_top_level_overrun_is_clamped() {
        let mut data = atom(b"ftyp", b"isom");
        data.extend_from_slice(&1_000_000u32.to_be_bytes());
        data.extend_from_slice(b"mdat");
        data.extend_from_slice(&[0u8; 32]);

        let all: Vec<Atom> = atoms(&data).collect();
        assert_eq!(all.len(), 2);
        assert!(all[1].is(b"mdat"));
        assert_eq!(all[1].bytes.len(), 40);
    }

    #[test]
    fn test_child_overrun_stops() {
        let mut body = atom(b"trak", b"vide");
        body.extend_from_slice(&500u32.to_be_bytes());
        body.extend_from_slice(b"meta");
        body.extend_from_slice(&[0u8; 16]);
        let moov = atom(b"moov", &body);

        let top: Vec<Atom> = atoms(&moov).collect();
        assert_eq!(kinds(top[0].children()), vec![*b"trak"]);
    }

    #[test]
    fn test_nested_children() {
        let udta = atom(b"udta", &atom(b"meta", b"\0\0\0\0encoder=Lavf60"));
        let moov = atom(b"moov", &udta);

        let top = atoms(&moov).next().unwrap();
        let child = top.children().next().unwrap();
        assert!(child.is(b"udta"));

        let grandchild = child.children().next().unwrap();
        assert!(grandchild.is(b"meta"));
        assert!(String::from_utf8_lossy(grandchild.head(1000)).contains("Lavf60"));
    }

    #[test]
    fn test_head_is_capped() {
        let a = atom(b"udta", &[b'x'; 1000]);
        let top = atoms(&a).next().unwrap();
        assert_eq!(top.head(500).len(), 492);
        assert!(top.head(8).is_empty());
    }

    #[test]
    fn test_short_input() {
        assert_eq!(atoms(&[]).count(), 0);
        assert_eq!(atoms(&[0, 0, 0, 8, b'f', b't', b'y', b'p']).count(), 0);
    }
}
