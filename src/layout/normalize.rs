// Tue Jan 20 2026 - Alex

use crate::layout::error::{LayoutError, LayoutResult};

/// Strips `/* */` and `//` comments, trims every line and drops the blank ones.
///
/// A block comment is replaced by a single space so tokens on either side stay
/// apart. An unterminated block comment swallows the rest of the input.
pub fn normalize(text: &str) -> String {
    let stripped = strip_comments(text);

    stripped
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Same as [`normalize`] for raw bytes read from a file or pipe.
pub fn normalize_bytes(bytes: &[u8]) -> LayoutResult<String> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| LayoutError::MalformedInput(format!("input is not valid UTF-8: {}", e)))?;
    Ok(normalize(text))
}

fn strip_comments(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    let mut copy_from = 0;

    while i + 1 < bytes.len() {
        if bytes[i] != b'/' {
            i += 1;
            continue;
        }

        match bytes[i + 1] {
            b'/' => {
                out.push_str(&text[copy_from..i]);
                i = match text[i..].find('\n') {
                    Some(nl) => i + nl,
                    None => bytes.len(),
                };
                copy_from = i;
            }
            b'*' => {
                out.push_str(&text[copy_from..i]);
                out.push(' ');
                i = match text[i + 2..].find("*/") {
                    Some(end) => i + 2 + end + 2,
                    None => bytes.len(),
                };
                copy_from = i;
            }
            _ => i += 1,
        }
    }

    if copy_from < bytes.len() {
        out.push_str(&text[copy_from..]);
    }
    out
}
