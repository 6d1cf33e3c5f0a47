//! Small string helpers shared by the client
//!
//! Response bodies end up in log lines and error messages; these helpers keep
//! them bounded without splitting multi-byte characters.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Maximum number of bytes of a response body shown in logs
pub const BODY_PREVIEW_BYTES: usize = 256;

/// Safely truncate a string at a UTF-8 character boundary.
///
/// Returns a slice of at most `max_bytes` bytes, ensuring the result
/// is valid UTF-8 by finding the last valid character boundary.
///
/// # Example
/// ```
/// use ldx_insight_client::utils::safe_truncate;
///
/// // "ữ" is 3 bytes - truncating at byte 6 would cut it in half
/// let text = "Dữ liệu";
/// assert_eq!(safe_truncate(text, 2), "D");
/// ```
#[inline]
#[must_use]
pub fn safe_truncate(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    let mut boundary = max_bytes;
    while boundary > 0 && !s.is_char_boundary(boundary) {
        boundary -= 1;
    }

    &s[..boundary]
}

/// Truncate a string for display with ellipsis.
///
/// # Example
/// ```
/// use ldx_insight_client::utils::truncate_for_display;
///
/// assert_eq!(truncate_for_display("unauthorized access", 12), "unauthorized...");
/// assert_eq!(truncate_for_display("ok", 12), "ok");
/// ```
#[must_use]
pub fn truncate_for_display(s: &str, max_bytes: usize) -> String {
    let truncated = safe_truncate(s, max_bytes);
    if truncated.len() < s.len() {
        format!("{truncated}...")
    } else {
        truncated.to_string()
    }
}

/// Bounded, lossy UTF-8 preview of a response body for logging
#[must_use]
pub fn body_preview(body: &[u8]) -> String {
    truncate_for_display(&String::from_utf8_lossy(body), BODY_PREVIEW_BYTES)
}

/// Everything but RFC 3986 unreserved characters
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a URL component.
/// Preserves unreserved characters per RFC 3986.
#[must_use]
pub fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_truncate_multibyte() {
        let s = "Thống kê";
        // "ố" occupies bytes 2..5
        assert_eq!(safe_truncate(s, 3), "Th");
        assert_eq!(safe_truncate(s, 5), "Thố");
        assert_eq!(safe_truncate(s, 100), s);
        assert_eq!(safe_truncate(s, 0), "");
    }

    #[test]
    fn test_body_preview_bounds_length() {
        let body = "x".repeat(BODY_PREVIEW_BYTES * 2);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.len(), BODY_PREVIEW_BYTES + 3);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_body_preview_invalid_utf8() {
        let preview = body_preview(&[0x66, 0xff, 0x6f]);
        assert_eq!(preview, "f\u{fffd}o");
    }

    #[test]
    fn test_percent_encode() {
        assert_eq!(percent_encode("/datasets"), "%2Fdatasets");
        assert_eq!(percent_encode("/datasets?page=2"), "%2Fdatasets%3Fpage%3D2");
        assert_eq!(percent_encode("plain-text_1.0~"), "plain-text_1.0~");
    }
}
