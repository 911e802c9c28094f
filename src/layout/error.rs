// Tue Jan 20 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Unbalanced delimiters starting at byte {start}: {span:?}")]
    UnbalancedDelimiters { start: usize, span: String },

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Ambiguous symbol lookup for {name}: {} candidates", candidates.len())]
    LookupAmbiguous { name: String, candidates: Vec<String> },
}

impl LayoutError {
    /// Structural errors abort the declaration; width errors only mark a field.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::MalformedInput(_) | Self::UnbalancedDelimiters { .. })
    }
}

pub type LayoutResult<T> = Result<T, LayoutError>;
