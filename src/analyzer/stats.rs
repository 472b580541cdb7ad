//! Byte-level statistics shared by the media engines
//!
//! Every helper here is total: empty or mismatched windows produce 0 rather
//! than panicking, so the signal code can slice freely once it has checked
//! its own length guards.

/// Shannon entropy of a byte window, normalized to [0,1] (bits / 8)
pub fn entropy(window: &[u8]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }

    let mut counts = [0usize; 256];
    for &b in window {
        counts[b as usize] += 1;
    }

    let len = window.len() as f64;
    let bits: f64 = counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / len;
            -p * p.log2()
        })
        .sum();

    bits / 8.0
}

/// Fraction of positions where both windows hold the same byte
///
/// Windows of different length are not comparable and score 0.
pub fn similarity(a: &[u8], b: &[u8]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let same = a.iter().zip(b.iter()).filter(|(x, y)| x == y).count();
    same as f64 / a.len() as f64
}

/// Find a byte pattern in data
pub fn find_pattern(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    find_pattern(haystack, needle).is_some()
}

/// Bounded prefix, never longer than the data
pub fn head(data: &[u8], max: usize) -> &[u8] {
    &data[..data.len().min(max)]
}

/// Lossy, lowercased text view of a byte payload for marker matching
pub fn lower_text(data: &[u8]) -> String {
    String::from_utf8_lossy(data).to_lowercase()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64
}

/// stddev / mean, 0 when the mean is not positive
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    let m = mean(values);
    if m <= 0.0 {
        return 0.0;
    }
    variance(values).sqrt() / m
}

pub fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

pub fn be_u16(data: &[u8], at: usize) -> Option<u16> {
    let b = data.get(at..at + 2)?;
    Some(u16::from_be_bytes([b[0], b[1]]))
}

pub fn be_u32(data: &[u8], at: usize) -> Option<u32> {
    let b = data.get(at..at + 4)?;
    Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

pub fn le_u16(data: &[u8], at: usize) -> Option<u16> {
    let b = data.get(at..at + 2)?;
    Some(u16::from_le_bytes([b[0], b[1]]))
}

pub fn le_u32(data: &[u8], at: usize) -> Option<u32> {
    let b = data.get(at..at + 4)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entropy_constant_window_is_zero() {
        assert_eq!(entropy(&[7u8; 512]), 0.0);
    }

    #[test]
    fn test_entropy_all_byte_values_is_one() {
        let window: Vec<u8> = (0..=255u8).collect();
        assert!((entropy(&window) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_entropy_two_symbols() {
        // 1 bit per byte -> 1/8
        let window: Vec<u8> = (0..1000).map(|i| (i % 2) as u8).collect();
        assert!((entropy(&window) - 0.125).abs() < 1e-9);
    }

    #[test]
    fn test_entropy_empty() {
        assert_eq!(entropy(&[]), 0.0);
    }

    #[test]
    fn test_similarity() {
        assert_eq!(similarity(b"abcd", b"abcd"), 1.0);
        assert_eq!(similarity(b"abcd", b"abzz"), 0.5);
        assert_eq!(similarity(b"", b""), 0.0);
        assert_eq!(similarity(b"ab", b"abzzzz"), 0.0);
    }

    #[test]
    fn test_find_pattern() {
        assert_eq!(find_pattern(b"xxmoovxx", b"moov"), Some(2));
        assert_eq!(find_pattern(b"mo", b"moov"), None);
        assert_eq!(find_pattern(b"abc", b""), None);
    }

    #[test]
    fn test_coefficient_of_variation() {
        assert_eq!(coefficient_of_variation(&[10.0, 10.0, 10.0]), 0.0);
        assert_eq!(coefficient_of_variation(&[]), 0.0);
        // mean 2, stddev 1
        assert!((coefficient_of_variation(&[1.0, 3.0]) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_endian_readers_are_bounds_checked() {
        let data = [0x12, 0x34, 0x56, 0x78];
        assert_eq!(be_u16(&data, 0), Some(0x1234));
        assert_eq!(le_u16(&data, 0), Some(0x3412));
        assert_eq!(be_u32(&data, 0), Some(0x12345678));
        assert_eq!(le_u32(&data, 0), Some(0x78563412));
        assert_eq!(be_u32(&data, 1), None);
        assert_eq!(le_u16(&data, 3), None);
    }
}
