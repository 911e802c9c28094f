// Tue Jan 20 2026 - Alex

use crate::layout::delimiter::match_brace;
use crate::layout::error::LayoutResult;
use crate::layout::node::{BlockKind, BlockNode, FieldNode};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Keyword and tag immediately before the outer `{`
static OUTER_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(struct|union)\b\s*(?:\[\[[^\]]*\]\]\s*)*([A-Za-z_][A-Za-z0-9_]*)?\s*\{\s*$")
        .expect("outer header pattern")
});

/// A declaration cut at its first `{` and last `}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shell {
    /// Everything up to and including the first `{`, newlines flattened
    pub prefix: String,
    pub body: String,
    /// Everything from the last `}` on, newlines flattened
    pub suffix: String,
    pub kind: BlockKind,
    pub tag: Option<String>,
}

/// Splits `typedef struct _X { ... } X, *PX;` into its shell and body.
///
/// Text that is not one braced declaration (no brace at all, a statement
/// before the first `{`, or more statements after its closing `}`) is taken
/// as the bare body of an implicit struct.
pub fn split_shell(text: &str) -> LayoutResult<Shell> {
    let open = match text.find('{') {
        Some(open) if !text[..open].contains(';') => open,
        _ => return Ok(bare(text)),
    };

    let close = match_brace(text, open)?;
    let trailing = &text[close + 1..];
    let after_terminator = trailing.find(';').map_or("", |semi| &trailing[semi + 1..]);
    if !after_terminator.trim().is_empty() {
        return Ok(bare(text));
    }

    let prefix = flatten(&text[..=open]);
    let (kind, tag) = match OUTER_HEADER.captures(&prefix) {
        Some(caps) => {
            let kind = if &caps[1] == "union" { BlockKind::Union } else { BlockKind::Struct };
            (kind, caps.get(2).map(|m| m.as_str().to_string()))
        }
        None => (BlockKind::Struct, None),
    };

    Ok(Shell {
        prefix,
        body: text[open + 1..close].to_string(),
        suffix: flatten(&text[close..]),
        kind,
        tag,
    })
}

fn bare(text: &str) -> Shell {
    Shell {
        prefix: String::new(),
        body: text.to_string(),
        suffix: String::new(),
        kind: BlockKind::Struct,
        tag: None,
    }
}

fn flatten(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolved tree plus the untouched text around it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDeclaration {
    pub prefix: String,
    pub root: BlockNode,
    pub suffix: String,
}

impl ResolvedDeclaration {
    pub fn size(&self) -> u64 {
        self.root.size
    }

    pub fn unresolved_fields(&self) -> Vec<&FieldNode> {
        self.root.unresolved_fields()
    }
}
