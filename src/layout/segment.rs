// Tue Jan 20 2026 - Alex

use crate::layout::delimiter::match_brace;
use crate::layout::error::LayoutResult;
use crate::layout::node::BlockKind;
use log::{trace, warn};
use once_cell::sync::Lazy;
use regex::Regex;

/// `struct Tag {`, `union [[attr]] {`, `struct{` at the start of a statement
static BLOCK_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(struct|union)\b\s*(?:\[\[[^\]]*\]\]\s*)*([A-Za-z_][A-Za-z0-9_]*)?\s*\{")
        .expect("block header pattern")
});

/// Right-anchored identifier with an optional array suffix
static FIELD_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)((?:\s*\[[^\[\]]*\])*)\s*$").expect("field name pattern")
});

static DECLARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)((?:\s*\[[^\[\]]*\])*)$").expect("declarator pattern")
});

static ARRAY_DIM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\[\]]*)\]").expect("array dimension pattern"));

/// One top-level unit of an aggregate body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Field(FieldDecl),
    Block(BlockDecl),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub declared_type: String,
    /// Identifier plus any array suffix, e.g. `MajorFunction[28]`
    pub declared_name: String,
    pub dims: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDecl {
    pub kind: BlockKind,
    pub tag: Option<String>,
    pub declarator: Option<String>,
    pub dims: Vec<String>,
    pub members: Vec<Statement>,
    /// Source text of the whole unit, closing `;` included when present
    pub text: String,
}

impl BlockDecl {
    pub fn root(kind: BlockKind, tag: Option<String>, members: Vec<Statement>) -> Self {
        Self {
            kind,
            tag,
            declarator: None,
            dims: Vec::new(),
            members,
            text: String::new(),
        }
    }
}

/// Splits a comment-free aggregate body into fields and nested blocks, recursively.
pub fn segment(body: &str) -> LayoutResult<Vec<Statement>> {
    let mut statements = Vec::new();
    let mut cursor = 0;

    while cursor < body.len() {
        let rest = &body[cursor..];
        let start = cursor + (rest.len() - rest.trim_start().len());
        if start >= body.len() {
            break;
        }

        let text = &body[start..];
        if let Some(caps) = BLOCK_HEADER.captures(text) {
            let kind = match &caps[1] {
                "union" => BlockKind::Union,
                _ => BlockKind::Struct,
            };
            let tag = caps.get(2).map(|m| m.as_str().to_string());
            let header_len = caps.get(0).map_or(0, |m| m.end());

            let (block, next) = segment_block(body, start, start + header_len - 1, kind, tag)?;
            trace!("{} block {:?} with {} members", block.kind, block.tag, block.members.len());
            statements.push(Statement::Block(block));
            cursor = next;
            continue;
        }

        let end = text.find(';').map_or(body.len(), |semi| start + semi);
        match split_field(&body[start..end]) {
            Some(field) => statements.push(Statement::Field(field)),
            None => trace!("skipping statement {:?}", &body[start..end]),
        }
        cursor = end + 1;
    }

    Ok(statements)
}

fn segment_block(
    body: &str,
    start: usize,
    open: usize,
    kind: BlockKind,
    tag: Option<String>,
) -> LayoutResult<(BlockDecl, usize)> {
    let close = match_brace(body, open)?;
    let members = segment(&body[open + 1..close])?;

    let after = &body[close + 1..];
    let (candidate, consumed) = match after.find(';') {
        Some(semi) => (after[..semi].trim(), semi + 1),
        None => (after.trim(), after.len()),
    };

    // Without a declarator-shaped name before the `;`, the `;` is missing and
    // whatever follows the brace belongs to the next statement.
    let (declarator, dims, consumed) = if candidate.is_empty() {
        (None, Vec::new(), consumed)
    } else if let Some(caps) = DECLARATOR.captures(candidate) {
        (Some(squash(candidate)), array_dims(&caps[2]), consumed)
    } else {
        if candidate.starts_with('*') || candidate.contains(',') {
            warn!(
                "'{}' after a {} block is not supported as a declarator; the block and '{}' are both counted",
                candidate, kind, candidate
            );
        } else {
            trace!("no ';' after {} block, '{}' starts the next statement", kind, candidate);
        }
        (None, Vec::new(), 0)
    };

    let next = close + 1 + consumed;
    let block = BlockDecl {
        kind,
        tag,
        declarator,
        dims,
        members,
        text: body[start..next].trim().to_string(),
    };
    Ok((block, next))
}

/// `PVOID *DriverSection` → type `PVOID *`, name `DriverSection`.
pub fn split_field(statement: &str) -> Option<FieldDecl> {
    let statement = statement.trim();
    let caps = FIELD_NAME.captures(statement)?;
    let whole = caps.get(0)?;

    let declared_type = statement[..whole.start()].trim();
    if declared_type.is_empty() {
        return None;
    }

    Some(FieldDecl {
        declared_type: collapse(declared_type),
        declared_name: squash(whole.as_str()),
        dims: array_dims(&caps[2]),
    })
}

fn array_dims(suffix: &str) -> Vec<String> {
    ARRAY_DIM
        .captures_iter(suffix)
        .map(|caps| collapse(&caps[1]))
        .collect()
}

/// Runs of spaces, tabs and newlines become one space.
fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn squash(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Product of the array dimensions; the offending text when one is not a literal.
///
/// `[]` counts as zero elements, matching a flexible array member.
pub fn element_count(dims: &[String]) -> Result<u64, String> {
    dims.iter().try_fold(1u64, |count, dim| {
        if dim.is_empty() {
            return Ok(0);
        }
        parse_literal(dim)
            .map(|n| count.saturating_mul(n))
            .ok_or_else(|| dim.clone())
    })
}

fn parse_literal(text: &str) -> Option<u64> {
    let digits = text.trim_end_matches(['u', 'U', 'l', 'L']);
    match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => digits.parse().ok(),
    }
}
