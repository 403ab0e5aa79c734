//! Pure byte-transform helpers used by "process" pipelines (spec.md §4.6).
//!
//! These are free functions, not methods on [`crate::stream::Stream`]: they
//! operate on already-materialized byte arrays, the same way the teacher's
//! `traits.rs`/`types.rs` keep pure bit-math free of any I/O.

use crate::error::{Result, StreamError};
use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

/// XOR every byte of `data` with the scalar `key`.
pub fn process_xor_scalar(data: &[u8], key: u8) -> Vec<u8> {
    data.iter().map(|b| b ^ key).collect()
}

/// XOR every byte of `data` with a repeating key, cycling `key.len()`.
pub fn process_xor_key(data: &[u8], key: &[u8]) -> Vec<u8> {
    if key.is_empty() {
        return data.to_vec();
    }
    data.iter()
        .enumerate()
        .map(|(i, b)| b ^ key[i % key.len()])
        .collect()
}

/// Circularly rotate each byte of `data` left by `amount` bits.
///
/// `group_size` must be `1`; any other value is unsupported, matching
/// spec.md §4.6.
pub fn process_rotate_left(data: &[u8], amount: u32, group_size: usize) -> Result<Vec<u8>> {
    if group_size != 1 {
        return Err(StreamError::UnsupportedOperation(format!(
            "rotate group size {group_size} is not supported (only 1-byte groups are)"
        )));
    }
    let amount = (amount % 8) as u32;
    Ok(data.iter().map(|b| b.rotate_left(amount)).collect())
}

/// Zlib-inflate `data`.
pub fn unprocess_zlib(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Zlib-deflate `data`.
pub fn process_zlib(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Strip trailing bytes equal to `pad` from the end of `bytes`.
pub fn bytes_strip_right(bytes: &[u8], pad: u8) -> Vec<u8> {
    let end = bytes.iter().rposition(|&b| b != pad).map_or(0, |i| i + 1);
    bytes[..end].to_vec()
}

/// Truncate `bytes` at the first occurrence of `term`, optionally keeping it.
pub fn bytes_terminate(bytes: &[u8], term: u8, include_term: bool) -> Vec<u8> {
    match bytes.iter().position(|&b| b == term) {
        Some(i) => bytes[..if include_term { i + 1 } else { i }].to_vec(),
        None => bytes.to_vec(),
    }
}

/// Truncate `bytes` at the first occurrence of the byte sequence `term`,
/// optionally keeping it. An empty `term` returns an empty output.
pub fn bytes_terminate_multi(bytes: &[u8], term: &[u8], include_term: bool) -> Vec<u8> {
    if term.is_empty() {
        return Vec::new();
    }
    match bytes.windows(term.len()).position(|w| w == term) {
        Some(i) => bytes[..if include_term { i + term.len() } else { i }].to_vec(),
        None => bytes.to_vec(),
    }
}

/// Unsigned lexicographic comparison of two byte arrays.
pub fn byte_array_compare(a: &[u8], b: &[u8]) -> std::cmp::Ordering {
    a.cmp(b)
}

/// Return whichever of `a`/`b` is unsigned-lexicographically smaller.
pub fn byte_array_min<'a>(a: &'a [u8], b: &'a [u8]) -> &'a [u8] {
    if byte_array_compare(a, b) == std::cmp::Ordering::Greater {
        b
    } else {
        a
    }
}

/// Return whichever of `a`/`b` is unsigned-lexicographically larger.
pub fn byte_array_max<'a>(a: &'a [u8], b: &'a [u8]) -> &'a [u8] {
    if byte_array_compare(a, b) == std::cmp::Ordering::Less {
        b
    } else {
        a
    }
}

/// Find the start index of the first occurrence of `needle` in `haystack`,
/// or `-1` if absent.
pub fn byte_array_index_of(haystack: &[u8], needle: &[u8]) -> i64 {
    if needle.is_empty() {
        return 0;
    }
    match haystack.windows(needle.len()).position(|w| w == needle) {
        Some(i) => i as i64,
        None => -1,
    }
}

/// Euclidean modulo: the result always has the sign of `b`'s... no, always
/// non-negative, and `b` must be strictly positive.
pub fn euclidean_mod(a: i64, b: i64) -> Result<i64> {
    if b <= 0 {
        return Err(StreamError::Arithmetic(format!(
            "modulo divisor must be positive, got {b}"
        )));
    }
    Ok(((a % b) + b) % b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_scalar_matches_spec_scenario() {
        assert_eq!(
            process_xor_scalar(&[0x11, 0x22, 0x33], 0x0F),
            vec![0x1E, 0x2D, 0x3C]
        );
    }

    #[test]
    fn xor_key_matches_spec_scenario() {
        assert_eq!(
            process_xor_key(&[0x11, 0x22, 0x33, 0x44], &[0x0F, 0xF0]),
            vec![0x1E, 0xD2, 0x3C, 0xB4]
        );
    }

    #[test]
    fn rotate_left_rejects_non_byte_groups() {
        assert!(process_rotate_left(&[1, 2], 1, 2).is_err());
    }

    #[test]
    fn rotate_left_single_byte_group() {
        assert_eq!(process_rotate_left(&[0b1000_0001], 1, 1).unwrap(), vec![0b0000_0011]);
    }

    #[test]
    fn zlib_round_trips() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(50);
        let compressed = process_zlib(&data).unwrap();
        let restored = unprocess_zlib(&compressed).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn strip_right_padding() {
        assert_eq!(bytes_strip_right(&[1, 2, 0, 0, 0], 0), vec![1, 2]);
        assert_eq!(bytes_strip_right(&[0, 0, 0], 0), Vec::<u8>::new());
    }

    #[test]
    fn terminate_single_and_multi() {
        assert_eq!(
            bytes_terminate(&[0x61, 0x62, 0x00, 0x63], 0x00, false),
            vec![0x61, 0x62]
        );
        assert_eq!(
            bytes_terminate_multi(&[0x61, 0x0D, 0x0A, 0x62], &[0x0D, 0x0A], false),
            vec![0x61]
        );
        assert_eq!(
            bytes_terminate_multi(&[0x61, 0x62], &[], false),
            Vec::<u8>::new()
        );
    }

    #[test]
    fn index_of_and_min_max() {
        assert_eq!(byte_array_index_of(&[1, 2, 3, 4], &[3, 4]), 2);
        assert_eq!(byte_array_index_of(&[1, 2, 3], &[9]), -1);
        assert_eq!(byte_array_min(&[1, 2], &[1, 1]), &[1, 1]);
        assert_eq!(byte_array_max(&[1, 2], &[1, 1]), &[1, 2]);
    }

    #[test]
    fn mod_is_euclidean() {
        assert_eq!(euclidean_mod(-1, 5).unwrap(), 4);
        assert_eq!(euclidean_mod(7, 5).unwrap(), 2);
        assert!(euclidean_mod(1, 0).is_err());
    }
}
