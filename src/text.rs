use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Decodes HTML entities in a single pass.
///
/// Reddit double-encodes the HTML it embeds in JSON payloads, so every
/// HTML-bearing field must be decoded exactly once before parsing. A second
/// application would corrupt bodies that legitimately mention entities,
/// which is why this runs as one `replace_all` pass instead of a chain of
/// `str::replace` calls: `&amp;lt;` becomes `&lt;` and stops there.
///
/// Unknown named entities are passed through untouched.
pub fn decode_entities(text: &str) -> String {
    static ENTITY: OnceLock<Regex> = OnceLock::new();
    let entity = ENTITY
        .get_or_init(|| Regex::new(r"&(?:#x([0-9a-fA-F]+)|#([0-9]+)|([a-zA-Z]+));").unwrap());

    entity
        .replace_all(text, |caps: &Captures| {
            if let Some(hex) = caps.get(1) {
                return decode_codepoint(u32::from_str_radix(hex.as_str(), 16).ok())
                    .unwrap_or_else(|| caps[0].to_string());
            }
            if let Some(dec) = caps.get(2) {
                return decode_codepoint(dec.as_str().parse().ok())
                    .unwrap_or_else(|| caps[0].to_string());
            }
            match &caps[3] {
                "amp" => "&".to_string(),
                "lt" => "<".to_string(),
                "gt" => ">".to_string(),
                "quot" => "\"".to_string(),
                "apos" => "'".to_string(),
                "nbsp" => "\u{a0}".to_string(),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[inline]
fn decode_codepoint(cp: Option<u32>) -> Option<String> {
    cp.and_then(char::from_u32).map(String::from)
}

/// Word-wraps `text` at `width` columns.
///
/// Splits on existing newlines and re-breaks each line with [`break_line`].
/// Every emitted line ends with a `\n` terminator, so wrapping at a fixed
/// width is idempotent.
pub fn wrap(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / width.max(1));
    for line in text.lines() {
        out.push_str(&break_line(line, width));
        out.push('\n');
    }
    out
}

/// Breaks a single line at the last space at or before the `width` cutoff,
/// repeating on the remainder.
///
/// A segment with no space in its first `width` characters is emitted as-is,
/// exceeding the nominal width. Breaking mid-word would corrupt URLs and
/// other long tokens.
pub fn break_line(line: &str, width: usize) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    loop {
        if rest.chars().count() <= width {
            out.push_str(rest);
            return out;
        }
        let cutoff = rest
            .char_indices()
            .nth(width)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        match rest[..cutoff].rfind(' ') {
            Some(cut) => {
                out.push_str(&rest[..cut]);
                out.push('\n');
                rest = &rest[cut + 1..];
            }
            // No space before the cutoff: a single over-long token.
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}
