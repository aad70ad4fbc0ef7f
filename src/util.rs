//! Text helpers shared by extraction and export.

use std::borrow::Cow;

/// Marker appended to shortened titles and summaries.
pub const ELLIPSIS: &str = "...";

/// Decode bytes to a string, handling various encodings.
///
/// 1. UTF-8 (a BOM is handled by encoding_rs)
/// 2. The hint encoding, from a `<meta charset>` declaration
/// 3. Windows-1252, which covers most mislabeled Latin pages
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Charset label from a `<meta charset="...">` declaration in the first 1 KiB.
///
/// Only the short `charset=` form is recognized; it also matches the
/// `content="text/html; charset=..."` variant.
pub fn extract_meta_charset(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(1024)];

    let pos = prefix
        .windows(8)
        .position(|w| w.eq_ignore_ascii_case(b"charset="))?;
    let mut value = &prefix[pos + 8..];

    if let Some(&quote) = value.first()
        && (quote == b'"' || quote == b'\'')
    {
        value = &value[1..];
    }

    let end = value
        .iter()
        .position(|&b| matches!(b, b'"' | b'\'' | b';' | b'>' | b'/') || b.is_ascii_whitespace())
        .unwrap_or(value.len());

    std::str::from_utf8(&value[..end])
        .ok()
        .filter(|label| !label.is_empty())
}

/// The first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// First `max_chars` characters followed by [`ELLIPSIS`].
///
/// The marker is always appended, even when nothing was cut.
pub fn summarize(text: &str, max_chars: usize) -> String {
    format!("{}{ELLIPSIS}", truncate_chars(text, max_chars))
}

/// Split `text` into consecutive segments of at most `max_chars` characters.
///
/// Segments never split a character; the concatenation of the result is
/// always `text`. Empty input yields no segments.
pub fn chunk_chars(text: &str, max_chars: usize) -> Vec<&str> {
    assert!(max_chars > 0, "chunk size must be positive");

    let mut chunks = Vec::with_capacity(text.len() / max_chars + 1);
    let mut rest = text;
    while !rest.is_empty() {
        let head = truncate_chars(rest, max_chars);
        chunks.push(head);
        rest = &rest[head.len()..];
    }
    chunks
}
