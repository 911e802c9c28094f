// Tue Jan 20 2026 - Alex

use crate::layout::error::LayoutResult;
use crate::layout::node::{AggregateNode, BlockKind, BlockNode, FieldNode, FieldStatus};
use crate::layout::normalize::normalize;
use crate::layout::segment::{element_count, segment, BlockDecl, FieldDecl, Statement};
use crate::layout::shell::{split_shell, ResolvedDeclaration};
use crate::layout::width::TypeWidthResolver;
use log::{debug, warn};

/// Running position inside one aggregate scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionContext {
    pub running_offset: u64,
}

impl ResolutionContext {
    pub fn at(offset: u64) -> Self {
        Self { running_offset: offset }
    }
}

pub struct LayoutEngine<'a> {
    widths: TypeWidthResolver<'a>,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(widths: TypeWidthResolver<'a>) -> Self {
        Self { widths }
    }

    pub fn widths(&self) -> &TypeWidthResolver<'a> {
        &self.widths
    }

    /// Resolves a whole declaration, `typedef` shell included.
    pub fn resolve_declaration(&self, text: &str, base_offset: u64) -> LayoutResult<ResolvedDeclaration> {
        let shell = split_shell(&normalize(text))?;
        let statements = segment(&shell.body)?;
        let root = BlockDecl::root(shell.kind, shell.tag.clone(), statements);

        let mut ctx = ResolutionContext::at(base_offset);
        let root = self.resolve_block(&root, &mut ctx);
        debug!("Resolved {} members, {} bytes", root.members.len(), root.size);

        Ok(ResolvedDeclaration {
            prefix: shell.prefix,
            root,
            suffix: shell.suffix,
        })
    }

    /// Resolves a bare body as the members of an implicit struct starting at `base_offset`.
    pub fn resolve_body(&self, body: &str, base_offset: u64) -> LayoutResult<BlockNode> {
        let statements = segment(&normalize(body))?;
        let root = BlockDecl::root(BlockKind::Struct, None, statements);
        Ok(self.resolve_block(&root, &mut ResolutionContext::at(base_offset)))
    }

    pub fn resolve(&self, statement: &Statement, ctx: &mut ResolutionContext) -> AggregateNode {
        match statement {
            Statement::Field(decl) => AggregateNode::Field(self.resolve_field(decl, ctx)),
            Statement::Block(decl) => AggregateNode::block(self.resolve_block(decl, ctx)),
        }
    }

    fn resolve_field(&self, decl: &FieldDecl, ctx: &mut ResolutionContext) -> FieldNode {
        let (mut width, mut status) = match self.widths.width_of(&decl.declared_type) {
            Ok(element) => match element_count(&decl.dims) {
                Ok(count) => (element.saturating_mul(count), FieldStatus::Resolved),
                Err(dim) => {
                    warn!("{}: array length '{}' is not a literal, counting one element", decl.declared_name, dim);
                    (element, FieldStatus::ArrayLengthIgnored(dim))
                }
            },
            Err(e) => {
                warn!("{}: {}", decl.declared_name, e);
                (0, FieldStatus::Unresolved(e.to_string()))
            }
        };

        match ctx.running_offset.checked_add(width) {
            Some(end) => ctx.running_offset = end,
            None => {
                warn!("{}: {} bytes past 0x{:x} overflows the offset range", decl.declared_name, width, ctx.running_offset);
                width = 0;
                status = FieldStatus::Unresolved("offset overflow".to_string());
            }
        }
        debug!("{} {} -> {} bytes, ends at 0x{:x}", decl.declared_type, decl.declared_name, width, ctx.running_offset);

        FieldNode {
            declared_type: decl.declared_type.clone(),
            declared_name: decl.declared_name.clone(),
            resolved_width: width,
            offset_after: ctx.running_offset,
            status,
        }
    }

    fn resolve_block(&self, decl: &BlockDecl, ctx: &mut ResolutionContext) -> BlockNode {
        let entry = ctx.running_offset;
        let mut members = Vec::with_capacity(decl.members.len());

        let element_size = match decl.kind {
            BlockKind::Struct => {
                let mut inner = ResolutionContext::at(entry);
                for statement in &decl.members {
                    members.push(self.resolve(statement, &mut inner));
                }
                inner.running_offset - entry
            }
            BlockKind::Union => {
                let mut largest = 0;
                for statement in &decl.members {
                    // every alternative starts where the union starts
                    let mut inner = ResolutionContext::at(entry);
                    members.push(self.resolve(statement, &mut inner));
                    largest = largest.max(inner.running_offset - entry);
                }
                largest
            }
        };

        let count = element_count(&decl.dims).unwrap_or_else(|dim| {
            warn!("{} {:?}: array length '{}' is not a literal, counting one element", decl.kind, decl.declarator, dim);
            1
        });
        let mut size = element_size.saturating_mul(count);
        if entry.checked_add(size).is_none() {
            warn!("{} {:?}: {} bytes past 0x{:x} overflows the offset range, clamping", decl.kind, decl.declarator, size, entry);
            size = u64::MAX - entry;
        }

        ctx.running_offset = entry + size;

        BlockNode {
            kind: decl.kind,
            tag: decl.tag.clone(),
            declarator: decl.declarator.clone(),
            members,
            entry_offset: entry,
            size,
            offset_after: ctx.running_offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::abi::AbiProfile;
    use crate::layout::error::LayoutError;

    fn resolve(body: &str, abi: &AbiProfile, base: u64) -> LayoutResult<BlockNode> {
        LayoutEngine::new(TypeWidthResolver::new(abi)).resolve_body(body, base)
    }

    fn field(node: &AggregateNode) -> &FieldNode {
        match node {
            AggregateNode::Field(field) => field,
            other => panic!("expected field, got {:?}", other),
        }
    }

    #[test]
    fn test_struct_scenario() {
        let root = resolve("struct { INT a; PVOID b; };", &AbiProfile::x64(), 0).unwrap();
        assert_eq!(root.size, 12);

        let inner = root.members[0].as_block().unwrap();
        let a = field(&inner.members[0]);
        let b = field(&inner.members[1]);
        assert_eq!((a.resolved_width, a.offset_after), (4, 4));
        assert_eq!((b.resolved_width, b.offset_after), (8, 12));
        assert_eq!(inner.size, 12);
    }

    #[test]
    fn test_end_and_start_offset_conventions() {
        let root = resolve("INT a; PVOID b; USHORT c;", &AbiProfile::x64(), 0).unwrap();
        let ends: Vec<_> = root.fields().iter().map(|f| f.offset_after).collect();
        let starts: Vec<_> = root.fields().iter().map(|f| f.start_offset()).collect();
        assert_eq!(ends, vec![4, 12, 14]);
        assert_eq!(starts, vec![0, 4, 12]);
    }

    #[test]
    fn test_union_scenario() {
        let root = resolve("union { INT a; PVOID b; };", &AbiProfile::x64(), 0).unwrap();
        assert_eq!(root.size, 8);

        let union = root.members[0].as_block().unwrap();
        assert_eq!(union.kind, BlockKind::Union);
        assert_eq!(union.size, 8);
        for member in &union.members {
            assert_eq!(member.start_offset(), 0);
        }
        assert_eq!(field(&union.members[0]).offset_after, 4);
        assert_eq!(field(&union.members[1]).offset_after, 8);
    }

    #[test]
    fn test_fields_only_size_is_sum_of_widths() {
        let abi = AbiProfile::x64();
        let root = resolve("ULONG a; HANDLE b; WCHAR c; ULONGLONG d; BYTE e; PVOID *f;", &abi, 0).unwrap();
        let sum: u64 = root.fields().iter().map(|f| f.resolved_width).sum();
        assert_eq!(root.size, sum);
        assert_eq!(sum, 4 + 8 + 2 + 8 + 1 + 8);
    }

    #[test]
    fn test_nested_struct_counted_once() {
        let abi = AbiProfile::x64();
        let root = resolve("INT a; struct { INT b; PVOID c; }; USHORT d;", &abi, 0).unwrap();

        let inner = root.members[1].as_block().unwrap();
        assert_eq!(inner.entry_offset, 4);
        assert_eq!(inner.size, 12);
        assert_eq!(inner.offset_after, 16);
        assert_eq!(field(&inner.members[0]).offset_after, 8);
        assert_eq!(field(&root.members[2]).offset_after, 18);
        assert_eq!(root.size, 18);
    }

    #[test]
    fn test_union_inside_struct_inside_union() {
        let abi = AbiProfile::x86();
        let body = "INT pad; union { USHORT s; struct { INT lo; INT hi; union { INT64 wide; CHAR c; }; } parts; }; CHAR tail;";
        let root = resolve(body, &abi, 0).unwrap();

        let outer = root.members[1].as_block().unwrap();
        assert_eq!(outer.entry_offset, 4);
        // lo + hi + max(8, 1)
        assert_eq!(outer.size, 16);

        let parts = outer.members[1].as_block().unwrap();
        assert_eq!(parts.entry_offset, 4);
        assert_eq!(parts.declarator.as_deref(), Some("parts"));
        let inner_union = parts.members[2].as_block().unwrap();
        assert_eq!(inner_union.entry_offset, 12);
        assert_eq!(inner_union.members[0].start_offset(), 12);
        assert_eq!(inner_union.members[1].start_offset(), 12);

        assert_eq!(field(&root.members[2]).offset_after, 21);
    }

    #[test]
    fn test_base_offset() {
        let root = resolve("INT a; PVOID b;", &AbiProfile::x86(), 0x40).unwrap();
        assert_eq!(root.entry_offset, 0x40);
        assert_eq!(root.size, 8);
        assert_eq!(root.offset_after, 0x48);
        assert_eq!(field(&root.members[0]).offset_after, 0x44);
    }

    #[test]
    fn test_unresolved_type_degrades() {
        let root = resolve("INT a; MYSTERY_TYPE m; PVOID b;", &AbiProfile::x64(), 0).unwrap();

        let mystery = field(&root.members[1]);
        assert_eq!(mystery.resolved_width, 0);
        assert_eq!(mystery.offset_after, 4);
        assert!(matches!(mystery.status, FieldStatus::Unresolved(_)));

        assert_eq!(field(&root.members[2]).offset_after, 12);
        assert_eq!(root.size, 12);
        assert_eq!(root.unresolved_fields().len(), 1);
    }

    #[test]
    fn test_arrays() {
        let abi = AbiProfile::x64();
        let root = resolve("WCHAR name[16]; PVOID table[N]; struct { INT x; INT y; } pts[3];", &abi, 0).unwrap();

        let name = field(&root.members[0]);
        assert_eq!(name.resolved_width, 32);
        let table = field(&root.members[1]);
        assert_eq!(table.resolved_width, 8);
        assert_eq!(table.status, FieldStatus::ArrayLengthIgnored("N".into()));
        let pts = root.members[2].as_block().unwrap();
        assert_eq!(pts.size, 24);
        assert_eq!(root.size, 32 + 8 + 24);
    }

    #[test]
    fn test_unbalanced_nested_union_aborts() {
        let err = resolve("INT a; union { INT b;", &AbiProfile::x64(), 0).unwrap_err();
        assert!(matches!(err, LayoutError::UnbalancedDelimiters { .. }));
    }

    #[test]
    fn test_offset_overflow_marks_field_instead_of_wrapping() {
        let root = resolve("CHAR a[0xFFFFFFFFFFFFFFFF]; CHAR b;", &AbiProfile::x64(), 0).unwrap();

        let a = field(&root.members[0]);
        assert_eq!(a.offset_after, u64::MAX);
        assert_eq!(a.status, FieldStatus::Resolved);

        let b = field(&root.members[1]);
        assert_eq!(b.resolved_width, 0);
        assert_eq!(b.offset_after, u64::MAX);
        assert_eq!(b.status, FieldStatus::Unresolved("offset overflow".into()));
        assert_eq!(root.size, u64::MAX);
    }

    #[test]
    fn test_base_offset_at_the_top_of_the_range() {
        let root = resolve("INT a;", &AbiProfile::x64(), u64::MAX).unwrap();
        let a = field(&root.members[0]);
        assert_eq!(a.offset_after, u64::MAX);
        assert_eq!(a.start_offset(), u64::MAX);
        assert!(!a.is_resolved());
        assert_eq!(root.size, 0);
    }

    #[test]
    fn test_block_array_overflow_is_clamped() {
        let root = resolve("INT a; struct { INT x; INT y; } big[0xFFFFFFFFFFFFFFFF]; CHAR c;", &AbiProfile::x64(), 0).unwrap();

        let big = root.members[1].as_block().unwrap();
        assert_eq!(big.entry_offset, 4);
        assert_eq!(big.offset_after, u64::MAX);
        assert_eq!(big.size, u64::MAX - 4);
        assert_eq!(root.members[1].start_offset(), 4);
        assert!(!field(&root.members[2]).is_resolved());
    }

    #[test]
    fn test_comments_do_not_count() {
        let root = resolve("INT a; // PVOID b;\n/* PVOID c;\nPVOID d; */ CHAR e;", &AbiProfile::x64(), 0).unwrap();
        assert_eq!(root.fields().len(), 2);
        assert_eq!(root.size, 5);
    }
}
