// Tue Jan 20 2026 - Alex

pub mod cache;
pub mod error;
pub mod index;
pub mod json;
pub mod pdb_index;

pub use cache::CachedDatabase;
pub use error::SymbolError;
pub use index::{MemberLayout, SymbolIndex, TypeLayout};

use log::info;
use std::path::Path;

/// Outcome of a by-name query against a symbol database
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    /// Several types matched; the caller may pick one and ask again.
    Ambiguous(Vec<String>),
}

impl<T> Lookup<T> {
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Lookup<U> {
        match self {
            Self::Found(value) => Lookup::Found(f(value)),
            Self::NotFound => Lookup::NotFound,
            Self::Ambiguous(candidates) => Lookup::Ambiguous(candidates),
        }
    }

    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Read side of a store of previously indexed debug-symbol types.
pub trait SymbolDatabase {
    fn lookup_width(&self, type_name: &str) -> Lookup<u64>;

    fn lookup_layout(&self, type_name: &str) -> Lookup<TypeLayout>;
}

/// Database that knows nothing; the default for width resolution.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSymbols;

impl SymbolDatabase for NoSymbols {
    fn lookup_width(&self, _type_name: &str) -> Lookup<u64> {
        Lookup::NotFound
    }

    fn lookup_layout(&self, _type_name: &str) -> Lookup<TypeLayout> {
        Lookup::NotFound
    }
}

/// Opens a `.pdb` file or a JSON index written by [`SymbolIndex::save_json`].
pub fn open_database(path: &Path) -> Result<SymbolIndex, SymbolError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let index = match extension.as_str() {
        "pdb" => pdb_index::index_pdb(path)?,
        "json" => SymbolIndex::load_json(path)?,
        other => return Err(SymbolError::UnsupportedFormat(format!("{} ({})", path.display(), other))),
    };

    info!("Loaded {} types from {}", index.len(), path.display());
    Ok(index)
}
