// Wed Jan 15 2026 - Alex

const INDENT: &str = "    ";
const COMMENT_GAP: usize = 4;

/// Indents annotated output by brace depth and lines up the `//` column.
///
/// Code and comment are expected to be separated by a tab, as produced by
/// [`crate::layout::annotate`]. The comment column sits four spaces past the
/// widest code part.
pub fn format_declaration(annotated: &str) -> String {
    let mut depth = 0usize;
    let mut lines = Vec::new();

    for raw in annotated.lines() {
        let (code, comment) = match raw.split_once('\t') {
            Some((code, comment)) => (code.trim(), Some(comment.trim())),
            None => (raw.trim(), None),
        };
        if code.is_empty() && comment.is_none() {
            continue;
        }

        if code.starts_with('}') {
            depth = depth.saturating_sub(1);
        }
        let indented = format!("{}{}", INDENT.repeat(depth), code);
        if code.ends_with('{') {
            depth += 1;
        }

        lines.push((indented, comment));
    }

    let column = lines
        .iter()
        .filter(|(_, comment)| comment.is_some())
        .map(|(code, _)| code.chars().count())
        .max()
        .unwrap_or(0)
        + COMMENT_GAP;

    let mut out = String::new();
    for (code, comment) in lines {
        match comment {
            Some(comment) => {
                let pad = column - code.chars().count();
                out.push_str(&code);
                out.push_str(&" ".repeat(pad));
                out.push_str(comment);
            }
            None => out.push_str(&code),
        }
        out.push('\n');
    }
    out
}
