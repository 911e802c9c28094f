// Tue Jan 15 2026 - Alex

pub mod config;
pub mod layout;
pub mod symbol;
pub mod ui;
pub mod utils;

pub use config::Config;
pub use layout::{
    annotate, resolve_text, AbiProfile, AggregateNode, BlockKind, BlockNode, FieldNode, LayoutEngine, LayoutError,
    ResolvedDeclaration, TypeWidthResolver,
};
pub use symbol::{Lookup, SymbolDatabase, SymbolIndex, TypeLayout};
