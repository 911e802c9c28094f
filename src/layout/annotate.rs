// Tue Jan 20 2026 - Alex

use crate::layout::node::{AggregateNode, BlockNode, FieldNode, FieldStatus};
use crate::layout::shell::ResolvedDeclaration;
use std::fmt::Write;

pub const UNRESOLVED_MARKER: &str = "**Could not find length**";

/// `// 0012: 0x000c`
pub fn offset_comment(offset: u64) -> String {
    format!("// {:04}: 0x{:04x}", offset, offset)
}

/// Re-emits the declaration with every member annotated by its end offset.
///
/// Comments are separated from code by a tab so a formatter can align them.
pub fn annotate(decl: &ResolvedDeclaration) -> String {
    let mut out = String::new();

    if !decl.prefix.is_empty() {
        out.push_str(&decl.prefix);
        out.push('\n');
    }
    render_members(&decl.root.members, &mut out);

    let _ = writeln!(out, "{}\t// size: {:04}: 0x{:04x}", decl.suffix, decl.root.size, decl.root.size);
    out
}

/// Renders a block from a symbol database as a standalone declaration.
pub fn annotate_block(block: &BlockNode) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {{", header(block));
    render_members(&block.members, &mut out);
    let _ = writeln!(out, "}};\t// size: {:04}: 0x{:04x}", block.size, block.size);
    out
}

fn render_members(members: &[AggregateNode], out: &mut String) {
    for member in members {
        match member {
            AggregateNode::Field(field) => render_field(field, out),
            AggregateNode::Struct(block) | AggregateNode::Union(block) => render_block(block, out),
        }
    }
}

fn render_field(field: &FieldNode, out: &mut String) {
    let _ = write!(
        out,
        "{} {};\t{}",
        field.declared_type,
        field.declared_name,
        offset_comment(field.offset_after)
    );
    match &field.status {
        FieldStatus::Resolved => {}
        FieldStatus::Unresolved(reason) => {
            let _ = write!(out, " {} ({})", UNRESOLVED_MARKER, reason);
        }
        FieldStatus::ArrayLengthIgnored(dim) => {
            let _ = write!(out, " **array length '{}' not evaluated**", dim);
        }
    }
    out.push('\n');
}

fn render_block(block: &BlockNode, out: &mut String) {
    let _ = writeln!(out, "{} {{", header(block));
    render_members(&block.members, out);
    match &block.declarator {
        Some(name) => {
            let _ = writeln!(out, "}} {};\t{}", name, offset_comment(block.offset_after));
        }
        None => {
            let _ = writeln!(out, "}};\t{}", offset_comment(block.offset_after));
        }
    }
}

fn header(block: &BlockNode) -> String {
    match &block.tag {
        Some(tag) => format!("{} {}", block.kind, tag),
        None => block.kind.to_string(),
    }
}
