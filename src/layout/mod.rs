// Tue Jan 20 2026 - Alex

pub mod abi;
pub mod annotate;
pub mod delimiter;
pub mod engine;
pub mod error;
pub mod node;
pub mod normalize;
pub mod segment;
pub mod shell;
pub mod width;

pub use abi::{AbiProfile, PointerWidth};
pub use annotate::{annotate, annotate_block};
pub use delimiter::match_brace;
pub use engine::{LayoutEngine, ResolutionContext};
pub use error::{LayoutError, LayoutResult};
pub use node::{AggregateNode, BlockKind, BlockNode, FieldNode, FieldStatus};
pub use normalize::{normalize, normalize_bytes};
pub use segment::{segment, BlockDecl, FieldDecl, Statement};
pub use shell::{split_shell, ResolvedDeclaration, Shell};
pub use width::{width_of, NoFallback, TypeFallback, TypeWidthResolver};

/// Resolves `text` with the profile's own widths only.
pub fn resolve_text(text: &str, abi: &AbiProfile, base_offset: u64) -> LayoutResult<ResolvedDeclaration> {
    LayoutEngine::new(TypeWidthResolver::new(abi)).resolve_declaration(text, base_offset)
}
