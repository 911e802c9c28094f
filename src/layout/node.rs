// Tue Jan 20 2026 - Alex

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    #[default]
    Struct,
    Union,
}

impl BlockKind {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Struct => "struct",
            Self::Union => "union",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Why a field carries the width it does
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum FieldStatus {
    Resolved,
    /// Width could not be determined; the field contributes 0 bytes.
    Unresolved(String),
    /// Array suffix was not an integer literal; one element was counted.
    ArrayLengthIgnored(String),
}

impl fmt::Display for FieldStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved => f.write_str("resolved"),
            Self::Unresolved(reason) => write!(f, "unresolved ({})", reason),
            Self::ArrayLengthIgnored(dim) => write!(f, "array length '{}' not evaluated", dim),
        }
    }
}

/// A leaf member with its resolved width and end offset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldNode {
    pub declared_type: String,
    pub declared_name: String,
    pub resolved_width: u64,
    pub offset_after: u64,
    pub status: FieldStatus,
}

impl FieldNode {
    pub fn start_offset(&self) -> u64 {
        self.offset_after - self.resolved_width
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self.status, FieldStatus::Unresolved(_))
    }
}

impl fmt::Display for FieldNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} @ 0x{:X}..0x{:X}", self.declared_type, self.declared_name, self.start_offset(), self.offset_after)
    }
}

/// A struct or union body with its placement in the enclosing aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockNode {
    pub kind: BlockKind,
    pub tag: Option<String>,
    pub declarator: Option<String>,
    pub members: Vec<AggregateNode>,
    pub entry_offset: u64,
    pub size: u64,
    pub offset_after: u64,
}

impl BlockNode {
    pub fn is_anonymous(&self) -> bool {
        self.declarator.is_none()
    }

    /// Depth-first iterator over every leaf field
    pub fn fields(&self) -> Vec<&FieldNode> {
        let mut out = Vec::new();
        collect_fields(&self.members, &mut out);
        out
    }

    pub fn unresolved_fields(&self) -> Vec<&FieldNode> {
        self.fields().into_iter().filter(|f| !f.is_resolved()).collect()
    }
}

fn collect_fields<'a>(members: &'a [AggregateNode], out: &mut Vec<&'a FieldNode>) {
    for member in members {
        match member {
            AggregateNode::Field(field) => out.push(field),
            AggregateNode::Struct(block) | AggregateNode::Union(block) => collect_fields(&block.members, out),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "node", rename_all = "lowercase")]
pub enum AggregateNode {
    Field(FieldNode),
    Struct(BlockNode),
    Union(BlockNode),
}

impl AggregateNode {
    pub fn block(block: BlockNode) -> Self {
        match block.kind {
            BlockKind::Struct => Self::Struct(block),
            BlockKind::Union => Self::Union(block),
        }
    }

    /// Bytes this node occupies in its parent
    pub fn size(&self) -> u64 {
        match self {
            Self::Field(field) => field.resolved_width,
            Self::Struct(block) | Self::Union(block) => block.size,
        }
    }

    pub fn offset_after(&self) -> u64 {
        match self {
            Self::Field(field) => field.offset_after,
            Self::Struct(block) | Self::Union(block) => block.offset_after,
        }
    }

    pub fn start_offset(&self) -> u64 {
        self.offset_after() - self.size()
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Field(field) => Some(&field.declared_name),
            Self::Struct(block) | Self::Union(block) => block.declarator.as_deref(),
        }
    }

    pub fn as_block(&self) -> Option<&BlockNode> {
        match self {
            Self::Field(_) => None,
            Self::Struct(block) | Self::Union(block) => Some(block),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, width: u64, after: u64) -> AggregateNode {
        AggregateNode::Field(FieldNode {
            declared_type: "INT".into(),
            declared_name: name.into(),
            resolved_width: width,
            offset_after: after,
            status: FieldStatus::Resolved,
        })
    }

    #[test]
    fn test_field_start_and_end_offsets() {
        let node = field("a", 4, 12);
        assert_eq!(node.offset_after(), 12);
        assert_eq!(node.start_offset(), 8);
        assert_eq!(node.name(), Some("a"));
    }

    #[test]
    fn test_fields_walk_nested_blocks() {
        let inner = BlockNode {
            kind: BlockKind::Union,
            tag: None,
            declarator: None,
            members: vec![field("b", 8, 12), field("c", 4, 8)],
            entry_offset: 4,
            size: 8,
            offset_after: 12,
        };
        let outer = BlockNode {
            kind: BlockKind::Struct,
            tag: Some("_X".into()),
            declarator: None,
            members: vec![field("a", 4, 4), AggregateNode::block(inner)],
            entry_offset: 0,
            size: 12,
            offset_after: 12,
        };

        let names: Vec<_> = outer.fields().iter().map(|f| f.declared_name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(matches!(outer.members[1], AggregateNode::Union(_)));
        assert!(outer.members[1].as_block().unwrap().is_anonymous());
        assert_eq!(outer.members[1].start_offset(), 4);
    }

    #[test]
    fn test_field_display() {
        if let AggregateNode::Field(f) = field("Flags", 4, 0x10) {
            assert_eq!(f.to_string(), "INT Flags @ 0xC..0x10");
        }
    }
}
