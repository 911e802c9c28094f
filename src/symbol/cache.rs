// Tue Jan 20 2026 - Alex

use crate::symbol::{Lookup, SymbolDatabase, TypeLayout};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Memoizes width queries; fuzzy matching over a large index is a full scan.
pub struct CachedDatabase<D> {
    inner: D,
    widths: RwLock<HashMap<String, Lookup<u64>>>,
}

impl<D: SymbolDatabase> CachedDatabase<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            widths: RwLock::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    pub fn cached_len(&self) -> usize {
        self.widths.read().len()
    }

    pub fn clear(&self) {
        self.widths.write().clear();
    }
}

impl<D: SymbolDatabase> SymbolDatabase for CachedDatabase<D> {
    fn lookup_width(&self, type_name: &str) -> Lookup<u64> {
        if let Some(hit) = self.widths.read().get(type_name) {
            return hit.clone();
        }

        let result = self.inner.lookup_width(type_name);
        self.widths.write().insert(type_name.to_string(), result.clone());
        result
    }

    fn lookup_layout(&self, type_name: &str) -> Lookup<TypeLayout> {
        self.inner.lookup_layout(type_name)
    }
}
