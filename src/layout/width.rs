// Tue Jan 20 2026 - Alex

use crate::layout::abi::{canonical_name, AbiProfile};
use crate::layout::error::{LayoutError, LayoutResult};
use crate::symbol::{Lookup, NoSymbols, SymbolDatabase};
use log::{debug, trace};

const QUALIFIERS: [&str; 5] = ["const", "volatile", "struct", "union", "enum"];

/// Last-resort hooks for names neither the width table nor the symbol database know.
///
/// The default answers decline, so an unknown name degrades to an unresolved field.
pub trait TypeFallback {
    /// Asked for `P`-prefixed names; `true` means "treat as a pointer".
    fn confirm_pointer(&self, _type_name: &str) -> bool {
        false
    }

    /// Asked when the symbol database matched several types.
    fn choose_candidate(&self, _type_name: &str, _candidates: &[String]) -> Option<String> {
        None
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoFallback;

impl TypeFallback for NoFallback {}

static NO_SYMBOLS: NoSymbols = NoSymbols;
static NO_FALLBACK: NoFallback = NoFallback;

pub struct TypeWidthResolver<'a> {
    abi: &'a AbiProfile,
    symbols: &'a dyn SymbolDatabase,
    fallback: &'a dyn TypeFallback,
}

impl<'a> TypeWidthResolver<'a> {
    pub fn new(abi: &'a AbiProfile) -> Self {
        Self {
            abi,
            symbols: &NO_SYMBOLS,
            fallback: &NO_FALLBACK,
        }
    }

    pub fn with_symbols(mut self, symbols: &'a dyn SymbolDatabase) -> Self {
        self.symbols = symbols;
        self
    }

    pub fn with_fallback(mut self, fallback: &'a dyn TypeFallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn abi(&self) -> &AbiProfile {
        self.abi
    }

    pub fn width_of(&self, type_token: &str) -> LayoutResult<u64> {
        let bare = bare_type(type_token);
        if bare.is_empty() {
            return Err(LayoutError::UnknownType(type_token.trim().to_string()));
        }

        if bare.ends_with('*') {
            trace!("{} is a pointer", bare);
            return Ok(self.abi.pointer_width());
        }

        if let Some(width) = self.abi.override_of(&bare) {
            trace!("{} -> {} bytes from a width override", bare, width);
            return Ok(width);
        }

        if is_pointer_alias(&bare) {
            trace!("{} follows the pointer alias convention", bare);
            return Ok(self.abi.pointer_width());
        }

        if let Some(width) = self.abi.width_of_name(&bare) {
            trace!("{} -> {} bytes from the width table", bare, width);
            return Ok(width);
        }

        let mut ambiguous = None;
        match self.symbols.lookup_width(&bare) {
            Lookup::Found(width) => {
                debug!("{} -> {} bytes from the symbol database", bare, width);
                return Ok(width);
            }
            Lookup::Ambiguous(candidates) => {
                if let Some(choice) = self.fallback.choose_candidate(&bare, &candidates) {
                    if let Lookup::Found(width) = self.symbols.lookup_width(&choice) {
                        debug!("{} resolved as {} -> {} bytes", bare, choice, width);
                        return Ok(width);
                    }
                }
                ambiguous = Some(candidates);
            }
            Lookup::NotFound => {}
        }

        if bare.starts_with(['P', 'p']) && self.fallback.confirm_pointer(&bare) {
            debug!("{} confirmed as a pointer", bare);
            return Ok(self.abi.pointer_width());
        }

        Err(match ambiguous {
            Some(candidates) => LayoutError::LookupAmbiguous { name: bare, candidates },
            None => LayoutError::UnknownType(bare),
        })
    }
}

/// Width of `type_token` using only the profile's own table and pointer rules.
pub fn width_of(type_token: &str, abi: &AbiProfile) -> LayoutResult<u64> {
    TypeWidthResolver::new(abi).width_of(type_token)
}

/// Drops qualifiers and elaborated-type keywords, collapses spaces, keeps `*`.
pub fn bare_type(type_token: &str) -> String {
    let mut rest = type_token.trim();

    'outer: loop {
        for keyword in QUALIFIERS {
            if let Some(stripped) = strip_leading_word(rest, keyword) {
                rest = stripped;
                continue 'outer;
            }
        }
        break;
    }

    if let Some(stripped) = strip_trailing_word(rest, "const") {
        rest = stripped;
    }

    let collapsed = rest.split_whitespace().collect::<Vec<_>>().join(" ");
    // `CSHORT *` and `CSHORT*` are the same type
    collapsed.replace(" *", "*")
}

fn strip_leading_word<'t>(text: &'t str, word: &str) -> Option<&'t str> {
    let head = text.get(..word.len())?;
    if !head.eq_ignore_ascii_case(word) {
        return None;
    }
    let tail = &text[word.len()..];
    match tail.chars().next() {
        Some(c) if c.is_whitespace() || c == '*' => Some(tail.trim_start()),
        _ => None,
    }
}

fn strip_trailing_word<'t>(text: &'t str, word: &str) -> Option<&'t str> {
    let split = text.len().checked_sub(word.len())?;
    let tail = text.get(split..)?;
    if !tail.eq_ignore_ascii_case(word) {
        return None;
    }
    let head = &text[..split];
    match head.chars().last() {
        Some(c) if c.is_whitespace() || c == '*' => Some(head.trim_end()),
        _ => None,
    }
}

/// `PVOID`, `LPCSTR`, `PDRIVER_OBJECT`: all-caps names with a `P`/`LP` prefix.
fn is_pointer_alias(name: &str) -> bool {
    let upper = canonical_name(name);
    if upper != name || !name.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_') {
        return false;
    }

    let rest = name.strip_prefix("LP").or_else(|| name.strip_prefix('P'));
    match rest.and_then(|r| r.chars().next()) {
        Some(c) => c.is_ascii_uppercase() || c == '_',
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{SymbolIndex, TypeLayout};
    use std::cell::RefCell;

    struct Scripted {
        pointer: bool,
        choice: Option<String>,
        asked: RefCell<Vec<String>>,
    }

    impl TypeFallback for Scripted {
        fn confirm_pointer(&self, type_name: &str) -> bool {
            self.asked.borrow_mut().push(type_name.to_string());
            self.pointer
        }

        fn choose_candidate(&self, _type_name: &str, _candidates: &[String]) -> Option<String> {
            self.choice.clone()
        }
    }

    fn scripted(pointer: bool, choice: Option<&str>) -> Scripted {
        Scripted {
            pointer,
            choice: choice.map(str::to_string),
            asked: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn test_documented_widths() {
        assert_eq!(width_of("PVOID*", &AbiProfile::x64()).unwrap(), 8);
        assert_eq!(width_of("INT", &AbiProfile::x86()).unwrap(), 4);
        assert_eq!(width_of("UNICODE_STRING", &AbiProfile::x64()).unwrap(), 12);
    }

    #[test]
    fn test_pointer_decorations() {
        let x86 = AbiProfile::x86();
        assert_eq!(width_of("CSHORT *", &x86).unwrap(), 4);
        assert_eq!(width_of("struct _FOO*", &x86).unwrap(), 4);
        assert_eq!(width_of("PDRIVER_OBJECT", &x86).unwrap(), 4);
        assert_eq!(width_of("LPCSTR", &AbiProfile::x64()).unwrap(), 8);
        // the prefix convention comes before the width table
        assert_eq!(width_of("POINTER_32", &AbiProfile::x64()).unwrap(), 8);
        assert_eq!(width_of("PCHAR", &AbiProfile::x86()).unwrap(), 4);
    }

    #[test]
    fn test_explicit_override_beats_pointer_convention() {
        let abi = AbiProfile::x64().with_width("POINTER_32", 4);
        assert_eq!(width_of("POINTER_32", &abi).unwrap(), 4);
        assert_eq!(width_of("POINTER_64", &abi).unwrap(), 8);
    }

    #[test]
    fn test_const_qualifier_is_stripped() {
        let x64 = AbiProfile::x64();
        assert_eq!(width_of("const ULONG", &x64).unwrap(), 4);
        assert_eq!(width_of("CONST   USHORT", &x64).unwrap(), 2);
        assert_eq!(width_of("ULONG const", &x64).unwrap(), 4);
        assert!(width_of("CONSTANTS", &x64).is_err());
    }

    #[test]
    fn test_bare_type() {
        assert_eq!(bare_type("  const volatile struct  _LIST_ENTRY  "), "_LIST_ENTRY");
        assert_eq!(bare_type("INT64 *"), "INT64*");
        assert_eq!(bare_type("PVOID * const"), "PVOID*");
        assert_eq!(bare_type("unsigned  long"), "unsigned long");
    }

    #[test]
    fn test_unknown_type() {
        let err = width_of("LIST_ENTRY", &AbiProfile::x64()).unwrap_err();
        assert_eq!(err, LayoutError::UnknownType("LIST_ENTRY".into()));
        assert!(width_of("   ", &AbiProfile::x64()).is_err());
    }

    #[test]
    fn test_symbol_database_is_consulted() {
        let mut index = SymbolIndex::new();
        index.insert(TypeLayout::structure("_LIST_ENTRY", 16));

        let abi = AbiProfile::x64();
        let resolver = TypeWidthResolver::new(&abi).with_symbols(&index);
        assert_eq!(resolver.width_of("LIST_ENTRY").unwrap(), 16);
        assert_eq!(resolver.width_of("struct _LIST_ENTRY").unwrap(), 16);
    }

    #[test]
    fn test_ambiguous_lookup_without_choice() {
        let mut index = SymbolIndex::new();
        index.insert(TypeLayout::structure("_KAPC_STATE", 48));
        index.insert(TypeLayout::structure("_KAPC_STATE32", 24));

        let abi = AbiProfile::x64();
        let resolver = TypeWidthResolver::new(&abi).with_symbols(&index);
        match resolver.width_of("KAPC").unwrap_err() {
            LayoutError::LookupAmbiguous { name, candidates } => {
                assert_eq!(name, "KAPC");
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_ambiguous_lookup_resubmits_choice() {
        let mut index = SymbolIndex::new();
        index.insert(TypeLayout::structure("_KAPC_STATE", 48));
        index.insert(TypeLayout::structure("_KAPC_STATE32", 24));

        let abi = AbiProfile::x64();
        let fallback = scripted(false, Some("_KAPC_STATE32"));
        let resolver = TypeWidthResolver::new(&abi).with_symbols(&index).with_fallback(&fallback);
        assert_eq!(resolver.width_of("KAPC").unwrap(), 24);
    }

    #[test]
    fn test_pointer_confirmation_only_for_p_names() {
        let abi = AbiProfile::x86();
        let fallback = scripted(true, None);
        let resolver = TypeWidthResolver::new(&abi).with_fallback(&fallback);

        assert_eq!(resolver.width_of("Pfn_Callback").unwrap(), 4);
        assert!(resolver.width_of("Callback").is_err());
        assert_eq!(*fallback.asked.borrow(), vec!["Pfn_Callback".to_string()]);

        let declining = scripted(false, None);
        let resolver = TypeWidthResolver::new(&abi).with_fallback(&declining);
        assert!(resolver.width_of("Pfn_Callback").is_err());
    }
}
