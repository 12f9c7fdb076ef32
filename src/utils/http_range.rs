/// A parsed `Range` request, with an inclusive end offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: i64,
    pub end: i64,
}

impl ByteRange {
    pub fn len(&self) -> i64 {
        self.end - self.start + 1
    }

    pub fn content_range(&self, total_size: i64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, total_size)
    }
}

/// Parse a `Range: bytes=start-end` header against a known object size.
///
/// `start` must be a non-negative integer no greater than `size - 1`; `end`
/// defaults to `size - 1` when omitted and is clamped to `size - 1`
/// otherwise. Anything else (missing `bytes=` prefix, suffix ranges,
/// multiple ranges, `end < start`) is unsatisfiable and returns `None`.
pub fn parse_range_header(value: &str, total_size: i64) -> Option<ByteRange> {
    let range_spec = value.strip_prefix("bytes=")?.trim();

    let (start_str, end_str) = range_spec.split_once('-')?;

    let start: i64 = start_str.parse().ok().filter(|s| *s >= 0)?;
    if start > total_size - 1 {
        return None;
    }

    let end = if end_str.is_empty() {
        total_size - 1
    } else {
        let end: i64 = end_str.parse().ok()?;
        end.min(total_size - 1)
    };

    if end < start {
        return None;
    }

    Some(ByteRange { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_open_range() {
        let r = parse_range_header("bytes=0-", 1000).unwrap();
        assert_eq!(r, ByteRange { start: 0, end: 999 });
        assert_eq!(r.len(), 1000);
        assert_eq!(r.content_range(1000), "bytes 0-999/1000");
    }

    #[test]
    fn test_closed_range() {
        let r = parse_range_header("bytes=100-199", 1000).unwrap();
        assert_eq!(r, ByteRange { start: 100, end: 199 });
        assert_eq!(r.len(), 100);
    }

    #[test]
    fn test_end_clamped_to_size() {
        let r = parse_range_header("bytes=2-99", 5).unwrap();
        assert_eq!(r, ByteRange { start: 2, end: 4 });
    }

    #[test]
    fn test_open_end_defaults_to_last_byte() {
        let r = parse_range_header("bytes=2-", 5).unwrap();
        assert_eq!(r, ByteRange { start: 2, end: 4 });
    }

    #[test]
    fn test_single_byte() {
        let r = parse_range_header("bytes=0-0", 5).unwrap();
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn test_start_past_end_of_object() {
        assert!(parse_range_header("bytes=5-", 5).is_none());
        assert!(parse_range_header("bytes=9-12", 5).is_none());
    }

    #[test]
    fn test_inverted_range() {
        assert!(parse_range_header("bytes=3-2", 5).is_none());
    }

    #[test]
    fn test_malformed() {
        assert!(parse_range_header("bytes=abc-", 5).is_none());
        assert!(parse_range_header("bytes=-500", 5).is_none());
        assert!(parse_range_header("items=0-1", 5).is_none());
        assert!(parse_range_header("bytes=0-1,3-4", 5).is_none());
        assert!(parse_range_header("bytes=", 5).is_none());
    }

    #[test]
    fn test_empty_object() {
        assert!(parse_range_header("bytes=0-", 0).is_none());
    }
}
