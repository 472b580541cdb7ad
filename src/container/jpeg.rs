//! JPEG marker scanning
//!
//! JPEG is a sequence of `FF xx` markers. We only care about three of them:
//!
//! - `FF E1` (APP1): holds the EXIF block, which starts with `Exif\0\0`
//! - `FF C0` / `FF C2` (SOF0 / SOF2): frame header with dimensions
//! - `FF DB` (DQT): quantization tables, used as a compression-level proxy
//!
//! SOF layout after the marker:
//! ```text
//! +0  FF Cx
//! +2  segment length (2)
//! +4  sample precision (bit depth)
//! +5  height (BE16)
//! +7  width  (BE16)
//! +9  component count
//! ```

use crate::analyzer::stats::be_u16;

/// Dimensions from a SOF0/SOF2 header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameInfo {
    pub bit_depth: u32,
    pub height: u32,
    pub width: u32,
    pub channels: u32,
}

/// Payload of the first APP1 segment (everything after the length field)
///
/// Only the first APP1 is returned; XMP usually lives in a second one and
/// is not needed.
pub fn first_app1(data: &[u8]) -> Option<&[u8]> {
    if data.len() < 12 {
        return None;
    }

    let i = find_marker(data, 0xE1, data.len() - 10)?;
    Some(&data[i + 4..])
}

/// True when an APP1 payload is an EXIF block
pub fn is_exif(app1: &[u8]) -> bool {
    app1.len() >= 6 && &app1[..4] == b"Exif"
}

/// Read the frame header from the first SOF0/SOF2 marker
pub fn frame_info(data: &[u8]) -> Option<FrameInfo> {
    let limit = data.len().checked_sub(10)?;
    let i = (0..limit).find(|&i| data[i] == 0xFF && (data[i + 1] == 0xC0 || data[i + 1] == 0xC2))?;

    Some(FrameInfo {
        bit_depth: data[i + 4] as u32,
        height: be_u16(data, i + 5)? as u32,
        width: be_u16(data, i + 7)? as u32,
        channels: data[i + 9] as u32,
    })
}

/// Sum of the first 64 quantization values of the first DQT segment
///
/// Low sums mean near-lossless quality, high sums mean heavy compression.
pub fn quant_table_sum(data: &[u8]) -> Option<u32> {
    let limit = data.len().checked_sub(100)?;
    let i = find_marker(data, 0xDB, limit)?;
    Some(data[i + 5..i + 69].iter().map(|&b| b as u32).sum())
}

/// Position of the first `FF <marker>` with start offset below `limit`
fn find_marker(data: &[u8], marker: u8, limit: usize) -> Option<usize> {
    (0..limit).find(|&i| data[i] == 0xFF && data[i + 1] == marker)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jfif_header() -> Vec<u8> {
        vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F']
    }

    fn with_app1(payload: &[u8]) -> Vec<u8> {
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xE1];
        let len = (payload.len() + 2) as u16;
        data.extend_from_slice(&len.to_be_bytes());
        data.extend_from_slice(payload);
        data.extend(vec![0u8; 64]);
        data
    }

    #[test]
    fn test_first_app1_exif() {
        let data = with_app1(b"Exif\0\0MM\0*Canon EOS R5");
        let app1 = first_app1(&data).expect("APP1 present");
        assert!(is_exif(app1));
        assert!(String::from_utf8_lossy(app1).contains("Canon"));
    }

    #[test]
    fn test_first_app1_missing() {
        let mut data = jfif_header();
        data.extend(vec![0u8; 100]);
        assert!(first_app1(&data).is_none());
    }

    #[test]
    fn test_app1_not_exif() {
        let data = with_app1(b"http://ns.adobe.com/xap/1.0/");
        let app1 = first_app1(&data).unwrap();
        assert!(!is_exif(app1));
    }

    #[test]
    fn test_frame_info() {
        let mut data = jfif_header();
        // SOF0: len=17, precision 8, 480x640, 3 components
        data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08, 0x01, 0xE0, 0x02, 0x80, 0x03]);
        data.extend(vec![0u8; 20]);

        let info = frame_info(&data).unwrap();
        assert_eq!(info, FrameInfo { bit_depth: 8, height: 480, width: 640, channels: 3 });
    }

    #[test]
    fn test_progressive_frame_info() {
        let mut data = jfif_header();
        data.extend_from_slice(&[0xFF, 0xC2, 0x00, 0x11, 0x08, 0x00, 0x10, 0x00, 0x20, 0x01]);
        data.extend(vec![0u8; 20]);

        let info = frame_info(&data).unwrap();
        assert_eq!((info.width, info.height, info.channels), (32, 16, 1));
    }

    #[test]
    fn test_quant_table_sum() {
        let mut data = jfif_header();
        data.extend_from_slice(&[0xFF, 0xDB, 0x00, 0x43, 0x00]);
        data.extend(vec![2u8; 64]);
        data.extend(vec![0u8; 100]);

        assert_eq!(quant_table_sum(&data), Some(128));
    }

    #[test]
    fn test_short_inputs_yield_none() {
        for len in 0..12 {
            let data = vec![0xFFu8; len];
            assert!(first_app1(&data).is_none());
            assert!(frame_info(&data).is_none());
            assert!(quant_table_sum(&data).is_none());
        }
    }
}
