//! Bounds-checked helpers over explicit-length byte slices.

use crate::Error;
use crate::Result;

/// Bytes `[offset, offset + count)` of `data`, clamped to its length.
pub fn read_slice(
    data: &[u8],
    offset: u64,
    count: usize,
) -> Vec<u8> {
    let Ok(start) = usize::try_from(offset) else {
        return Vec::new();
    };
    if start >= data.len() {
        return Vec::new();
    }
    let end = start.saturating_add(count).min(data.len());
    data[start..end].to_vec()
}

/// Position of the first occurrence of `needle` in `haystack`.
pub fn find_subslice(
    haystack: &[u8],
    needle: &[u8],
) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Owned copy of operator input, failing instead of aborting when memory is short.
pub fn try_copy(input: &[u8]) -> Result<Vec<u8>> {
    let mut scratch = Vec::new();
    scratch
        .try_reserve_exact(input.len())
        .map_err(|_| Error::allocation(input.len()))?;
    scratch.extend_from_slice(input);
    Ok(scratch)
}

/// Parses a non-negative decimal, tolerating one trailing newline.
pub fn parse_decimal(token: &[u8]) -> Option<u64> {
    let token = token.strip_suffix(b"\n").unwrap_or(token);
    if token.is_empty() {
        return None;
    }
    std::str::from_utf8(token).ok()?.parse::<u64>().ok()
}

/// Scalar file input with surrounding whitespace removed.
pub fn trimmed_text(input: &[u8]) -> Option<&str> {
    std::str::from_utf8(input).ok().map(str::trim)
}
