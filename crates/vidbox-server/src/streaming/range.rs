//! HTTP `Range` header parsing.

/// An inclusive byte interval, already clamped to the file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes the range covers. The parser guarantees
    /// `start <= end`, so this is never zero.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Parse a `Range: bytes=<start>-[<end>]` header value against a file size.
///
/// Only the single-range form with an explicit start is accepted. Suffix
/// ranges (`bytes=-500`) and multi-range lists are treated as malformed.
/// `None` means the caller falls back to a full-content response; ranges
/// that are syntactically valid but unsatisfiable (`start >= file_size`,
/// `start > end`) are rejected the same way.
pub fn parse_range_header(value: &str, file_size: u64) -> Option<ByteRange> {
    if file_size == 0 {
        return None;
    }

    let spec = value.strip_prefix("bytes=")?;
    let (start_str, end_str) = spec.split_once('-')?;

    // An empty start would be a suffix range; digits only, no signs or lists.
    if start_str.is_empty() || !start_str.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let start: u64 = start_str.parse().ok()?;

    let end = if end_str.is_empty() {
        file_size - 1
    } else {
        if !end_str.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let end: u64 = end_str.parse().ok()?;
        end.min(file_size - 1)
    };

    if start > end || start >= file_size {
        return None;
    }

    Some(ByteRange { start, end })
}
