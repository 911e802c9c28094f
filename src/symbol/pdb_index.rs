// Tue Jan 21 2026 - Alex

use crate::layout::node::BlockKind;
use crate::symbol::{MemberLayout, SymbolError, SymbolIndex, TypeLayout};
use log::{debug, warn};
use pdb::{FallibleIterator, TypeData, TypeFinder, TypeIndex, PDB};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

struct Record {
    kind: BlockKind,
    name: String,
    size: u64,
    fields: Option<TypeIndex>,
}

/// Indexes every complete struct, class and union in a PDB type stream.
pub fn index_pdb(path: &Path) -> Result<SymbolIndex, SymbolError> {
    let file = File::open(path)?;
    let mut pdb = PDB::open(file)?;

    let type_information = pdb.type_information()?;
    let mut type_finder = type_information.finder();

    let mut records = Vec::new();
    let mut complete_sizes = HashMap::new();

    let mut iter = type_information.iter();
    while let Some(item) = iter.next()? {
        type_finder.update(&iter);

        let record = match item.parse() {
            Ok(TypeData::Class(class)) if !class.properties.forward_reference() => Record {
                kind: BlockKind::Struct,
                name: class.name.to_string().into_owned(),
                size: class.size,
                fields: class.fields,
            },
            Ok(TypeData::Union(union)) if !union.properties.forward_reference() => Record {
                kind: BlockKind::Union,
                name: union.name.to_string().into_owned(),
                size: union.size,
                fields: Some(union.fields),
            },
            Ok(_) => continue,
            Err(e) => {
                warn!("Skipping unparsable type record {:#x}: {}", item.index().0, e);
                continue;
            }
        };

        // <unnamed-tag> and friends are only reachable through their parent
        if record.name.starts_with('<') {
            continue;
        }
        complete_sizes.insert(record.name.clone(), record.size);
        records.push(record);
    }

    let sizer = TypeSizer {
        finder: &type_finder,
        complete_sizes: &complete_sizes,
    };

    let mut index = SymbolIndex::new();
    for record in records {
        let mut members = Vec::new();
        if let Some(fields) = record.fields {
            sizer.collect_members(fields, &mut members)?;
        }
        members.sort_by_key(|m| m.offset);

        debug!("{} {}: {} bytes, {} members", record.kind, record.name, record.size, members.len());
        index.insert(TypeLayout {
            name: record.name,
            kind: record.kind,
            size: record.size,
            members,
        });
    }

    Ok(index)
}

struct TypeSizer<'a, 't> {
    finder: &'a TypeFinder<'t>,
    complete_sizes: &'a HashMap<String, u64>,
}

impl<'a, 't> TypeSizer<'a, 't> {
    fn collect_members(&self, fields: TypeIndex, out: &mut Vec<MemberLayout>) -> Result<(), SymbolError> {
        let mut next = Some(fields);

        while let Some(index) = next.take() {
            match self.finder.find(index)?.parse()? {
                TypeData::FieldList(list) => {
                    for field in &list.fields {
                        if let TypeData::Member(member) = field {
                            out.push(MemberLayout {
                                name: member.name.to_string().into_owned(),
                                offset: member.offset,
                                size: self.size_of(member.field_type)?,
                                type_name: Some(self.name_of(member.field_type)?),
                            });
                        }
                    }
                    next = list.continuation;
                }
                other => debug!("Ignoring non field-list record {:?}", other),
            }
        }

        Ok(())
    }

    fn size_of(&self, index: TypeIndex) -> Result<u64, SymbolError> {
        Ok(match self.finder.find(index)?.parse()? {
            TypeData::Primitive(primitive) => match primitive.indirection {
                Some(indirection) => indirection_size(indirection),
                None => primitive_size(primitive.kind),
            },
            TypeData::Class(class) => self.complete_size(&class.name.to_string(), class.size, class.properties.forward_reference()),
            TypeData::Union(union) => self.complete_size(&union.name.to_string(), union.size, union.properties.forward_reference()),
            TypeData::Enumeration(enumeration) => self.size_of(enumeration.underlying_type)?,
            TypeData::Pointer(pointer) => match pointer.attributes.pointer_kind() {
                pdb::PointerKind::Near16 | pdb::PointerKind::Far16 | pdb::PointerKind::Huge16 => 2,
                pdb::PointerKind::Near32 | pdb::PointerKind::Far32 => 4,
                _ => 8,
            },
            TypeData::Modifier(modifier) => self.size_of(modifier.underlying_type)?,
            TypeData::Bitfield(bitfield) => self.size_of(bitfield.underlying_type)?,
            // dimensions are cumulative byte sizes; the last one covers the whole array
            TypeData::Array(array) => array.dimensions.last().copied().unwrap_or(0) as u64,
            _ => 0,
        })
    }

    fn complete_size(&self, name: &str, size: u64, forward_reference: bool) -> u64 {
        if forward_reference {
            self.complete_sizes.get(name).copied().unwrap_or(0)
        } else {
            size
        }
    }

    fn name_of(&self, index: TypeIndex) -> Result<String, SymbolError> {
        Ok(match self.finder.find(index)?.parse()? {
            TypeData::Primitive(primitive) => {
                let mut name = format!("{:?}", primitive.kind).to_uppercase();
                if primitive.indirection.is_some() {
                    name.push('*');
                }
                name
            }
            TypeData::Class(class) => class.name.to_string().into_owned(),
            TypeData::Union(union) => union.name.to_string().into_owned(),
            TypeData::Enumeration(enumeration) => enumeration.name.to_string().into_owned(),
            TypeData::Pointer(pointer) => format!("{}*", self.name_of(pointer.underlying_type)?),
            TypeData::Modifier(modifier) => {
                let inner = self.name_of(modifier.underlying_type)?;
                if modifier.constant {
                    format!("const {}", inner)
                } else {
                    inner
                }
            }
            TypeData::Bitfield(bitfield) => self.name_of(bitfield.underlying_type)?,
            TypeData::Array(array) => {
                let mut name = self.name_of(array.element_type)?;
                for size in array.dimensions {
                    name = format!("{}[{}]", name, size);
                }
                name
            }
            TypeData::Procedure(_) => "PROCEDURE".to_string(),
            _ => format!("TYPE_{:X}", index.0),
        })
    }
}

fn indirection_size(indirection: pdb::Indirection) -> u64 {
    match indirection {
        pdb::Indirection::Near32 | pdb::Indirection::Far32 => 4,
        pdb::Indirection::Near64 => 8,
        pdb::Indirection::Near128 => 16,
        _ => 2,
    }
}

fn primitive_size(kind: pdb::PrimitiveKind) -> u64 {
    use pdb::PrimitiveKind::*;

    match kind {
        Char | UChar | RChar | I8 | U8 | Bool8 => 1,
        WChar | Short | UShort | I16 | U16 | F16 | Bool16 => 2,
        Long | ULong | I32 | U32 | F32 | F32PP | Bool32 | HRESULT => 4,
        Quad | UQuad | I64 | U64 | F64 | Bool64 => 8,
        Octa | UOcta | I128 | U128 | F128 => 16,
        _ => 0,
    }
}
