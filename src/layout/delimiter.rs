// Tue Jan 20 2026 - Alex

use crate::layout::error::{LayoutError, LayoutResult};

const SPAN_PREVIEW: usize = 48;

/// Returns the byte index of the `}` closing the first `{` at or after `from`.
pub fn match_brace(text: &str, from: usize) -> LayoutResult<usize> {
    let start = text
        .get(from..)
        .and_then(|rest| rest.find('{'))
        .map(|pos| from + pos)
        .ok_or_else(|| unbalanced(text, from))?;

    let mut depth = 0usize;
    for (index, byte) in text.as_bytes()[start..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(start + index);
                }
            }
            _ => {}
        }
    }

    Err(unbalanced(text, start))
}

fn unbalanced(text: &str, start: usize) -> LayoutError {
    let span: String = text.get(start..).unwrap_or("").chars().take(SPAN_PREVIEW).collect();
    LayoutError::UnbalancedDelimiters { start, span }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_block() {
        let text = "struct { INT a; };";
        assert_eq!(match_brace(text, 0).unwrap(), 16);
    }

    #[test]
    fn test_nested_blocks() {
        let text = "union { PVOID a; union x { INT b; }; struct { INT c; }; } tail";
        let close = match_brace(text, 0).unwrap();
        assert_eq!(&text[close..], "} tail");
    }

    #[test]
    fn test_starts_search_at_offset() {
        let text = "{ } struct { { } }";
        assert_eq!(match_brace(text, 1).unwrap(), text.len() - 1);
    }

    #[test]
    fn test_unbalanced_reports_span() {
        let err = match_brace("INT x; union { INT a;", 0).unwrap_err();
        match err {
            LayoutError::UnbalancedDelimiters { start, span } => {
                assert_eq!(start, 13);
                assert_eq!(span, "{ INT a;");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_missing_open_brace() {
        assert!(matches!(
            match_brace("INT a;", 0),
            Err(LayoutError::UnbalancedDelimiters { .. })
        ));
        assert!(match_brace("{}", 10).is_err());
    }
}
