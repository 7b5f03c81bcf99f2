//! Utilities for turning whole buffers into the line slices the diff
//! consumes.

use memchr::memchr;

/// Splits `text` into lines on `\n` only, without terminators.
///
/// This is the exact input contract of [`compute_diff`](crate::compute_diff):
/// a trailing `\r` stays part of its line (so CRLF versus LF differences are
/// observable), and the empty element after a final newline is kept. The
/// empty string yields a single empty line.
///
/// ```
/// # use kamili_diff::sources::split_lines;
/// assert_eq!(split_lines("a\nb"), ["a", "b"]);
/// assert_eq!(split_lines("a\r\nb\n"), ["a\r", "b", ""]);
/// assert_eq!(split_lines(""), [""]);
/// ```
pub fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    while let Some(newline) = memchr(b'\n', &bytes[start..]) {
        lines.push(&text[start..start + newline]);
        start += newline + 1;
    }
    lines.push(&text[start..]);
    lines
}
