// Tue Jan 20 2026 - Alex

use crate::layout::node::{AggregateNode, BlockKind, BlockNode, FieldNode, FieldStatus};
use crate::symbol::{Lookup, SymbolDatabase};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Most candidates reported for a fuzzy match
pub const MAX_CANDIDATES: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberLayout {
    pub name: String,
    pub offset: u64,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

/// Size and members of one indexed struct or union
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeLayout {
    pub name: String,
    #[serde(default)]
    pub kind: BlockKind,
    pub size: u64,
    #[serde(default)]
    pub members: Vec<MemberLayout>,
}

impl TypeLayout {
    pub fn structure(name: &str, size: u64) -> Self {
        Self {
            name: name.to_string(),
            kind: BlockKind::Struct,
            size,
            members: Vec::new(),
        }
    }

    pub fn union(name: &str, size: u64) -> Self {
        Self {
            kind: BlockKind::Union,
            ..Self::structure(name, size)
        }
    }

    pub fn with_member(mut self, name: &str, offset: u64, size: u64, type_name: &str) -> Self {
        self.members.push(MemberLayout {
            name: name.to_string(),
            offset,
            size,
            type_name: Some(type_name.to_string()),
        });
        self
    }

    /// Tree form with end offsets, so it renders like a resolved declaration.
    pub fn to_aggregate(&self) -> BlockNode {
        let members = self
            .members
            .iter()
            .map(|member| {
                AggregateNode::Field(FieldNode {
                    declared_type: member.type_name.clone().unwrap_or_default(),
                    declared_name: member.name.clone(),
                    resolved_width: member.size,
                    offset_after: member.offset.saturating_add(member.size),
                    status: FieldStatus::Resolved,
                })
            })
            .collect();

        BlockNode {
            kind: self.kind,
            tag: Some(self.name.clone()),
            declarator: None,
            members,
            entry_offset: 0,
            size: self.size,
            offset_after: self.size,
        }
    }
}

/// In-memory name → layout table with forgiving name matching.
#[derive(Debug, Clone, Default)]
pub struct SymbolIndex {
    layouts: IndexMap<String, TypeLayout>,
}

impl SymbolIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_layouts<I: IntoIterator<Item = TypeLayout>>(layouts: I) -> Self {
        let mut index = Self::new();
        for layout in layouts {
            index.insert(layout);
        }
        index
    }

    /// Later inserts with the same name replace earlier ones.
    pub fn insert(&mut self, layout: TypeLayout) {
        self.layouts.insert(layout.name.clone(), layout);
    }

    pub fn get(&self, name: &str) -> Option<&TypeLayout> {
        self.layouts.get(name)
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeLayout> {
        self.layouts.values()
    }

    /// Exact name, then case-insensitive, then ignoring leading underscores.
    /// Anything weaker is only offered back as candidates.
    pub fn find(&self, name: &str) -> Lookup<&TypeLayout> {
        if let Some(layout) = self.layouts.get(name) {
            return Lookup::Found(layout);
        }

        let lower = name.trim().to_ascii_lowercase();
        let trimmed = lower.trim_start_matches('_');
        if trimmed.is_empty() {
            return Lookup::NotFound;
        }

        let exact: Vec<_> = self
            .layouts
            .values()
            .filter(|layout| layout.name.to_ascii_lowercase() == lower)
            .collect();
        if let Some(lookup) = pick(exact) {
            return lookup;
        }

        let loose: Vec<_> = self
            .layouts
            .values()
            .filter(|layout| layout.name.to_ascii_lowercase().trim_start_matches('_') == trimmed)
            .collect();
        if let Some(lookup) = pick(loose) {
            return lookup;
        }

        let partial: Vec<String> = self
            .layouts
            .values()
            .filter(|layout| layout.name.to_ascii_lowercase().contains(trimmed))
            .take(MAX_CANDIDATES)
            .map(|layout| layout.name.clone())
            .collect();

        if partial.is_empty() {
            Lookup::NotFound
        } else {
            Lookup::Ambiguous(partial)
        }
    }
}

fn pick(matches: Vec<&TypeLayout>) -> Option<Lookup<&TypeLayout>> {
    match matches.len() {
        0 => None,
        1 => Some(Lookup::Found(matches[0])),
        _ => Some(Lookup::Ambiguous(matches.iter().map(|layout| layout.name.clone()).collect())),
    }
}

impl SymbolDatabase for SymbolIndex {
    fn lookup_width(&self, type_name: &str) -> Lookup<u64> {
        self.find(type_name).map(|layout| layout.size)
    }

    fn lookup_layout(&self, type_name: &str) -> Lookup<TypeLayout> {
        self.find(type_name).map(TypeLayout::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SymbolIndex {
        SymbolIndex::from_layouts(vec![
            TypeLayout::structure("_LIST_ENTRY", 16)
                .with_member("Flink", 0, 8, "_LIST_ENTRY*")
                .with_member("Blink", 8, 8, "_LIST_ENTRY*"),
            TypeLayout::structure("_DRIVER_OBJECT", 336),
            TypeLayout::structure("_DRIVER_EXTENSION", 56),
            TypeLayout::union("_LARGE_INTEGER", 8),
        ])
    }

    #[test]
    fn test_exact_and_case_insensitive() {
        let index = sample();
        assert_eq!(index.lookup_width("_LIST_ENTRY"), Lookup::Found(16));
        assert_eq!(index.lookup_width("_list_entry"), Lookup::Found(16));
    }

    #[test]
    fn test_leading_underscores_are_ignored() {
        let index = sample();
        assert_eq!(index.lookup_width("DRIVER_OBJECT"), Lookup::Found(336));
        assert_eq!(index.lookup_width("__large_integer"), Lookup::Found(8));
    }

    #[test]
    fn test_partial_matches_are_candidates() {
        let index = sample();
        match index.lookup_width("DRIVER") {
            Lookup::Ambiguous(candidates) => {
                assert_eq!(candidates, vec!["_DRIVER_OBJECT".to_string(), "_DRIVER_EXTENSION".to_string()]);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(index.lookup_width("EPROCESS"), Lookup::NotFound);
        assert_eq!(index.lookup_width("___"), Lookup::NotFound);
    }

    #[test]
    fn test_same_name_different_case_is_ambiguous() {
        let mut index = sample();
        index.insert(TypeLayout::structure("_list_entry", 8));
        assert_eq!(index.lookup_width("_List_Entry"), Lookup::Ambiguous(vec!["_LIST_ENTRY".into(), "_list_entry".into()]));
        // an exact spelling still wins
        assert_eq!(index.lookup_width("_list_entry"), Lookup::Found(8));
    }

    #[test]
    fn test_layout_to_aggregate_uses_end_offsets() {
        let index = sample();
        let layout = index.lookup_layout("LIST_ENTRY").found().unwrap();
        let block = layout.to_aggregate();

        assert_eq!(block.tag.as_deref(), Some("_LIST_ENTRY"));
        assert_eq!(block.size, 16);
        let fields = block.fields();
        assert_eq!(fields[0].offset_after, 8);
        assert_eq!(fields[1].offset_after, 16);
        assert_eq!(fields[1].start_offset(), 8);
        assert_eq!(fields[1].declared_type, "_LIST_ENTRY*");
    }

    #[test]
    fn test_layout_with_bogus_member_offset_does_not_wrap() {
        let layout = TypeLayout::structure("_BROKEN", 8).with_member("Tail", u64::MAX - 2, 8, "ULONGLONG");
        let block = layout.to_aggregate();
        assert_eq!(block.fields()[0].offset_after, u64::MAX);
    }
}
