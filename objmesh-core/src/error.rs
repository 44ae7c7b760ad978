/// Error types for model loading and assembly
use thiserror::Error;

/// Result type for model loading and assembly.
pub type MeshResult<T> = Result<T, MeshError>;

/// Problems found while turning model/material text into vertex buffers.
///
/// Most variants are recoverable: the parser records them as issues and keeps
/// going. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    #[error("line {line}: malformed number {token:?}")]
    MalformedNumber { line: usize, token: String },

    #[error("line {line}: `{directive}` is missing operands")]
    MalformedDirective { line: usize, directive: String },

    #[error("line {line}: face references vertex {index} but only {len} vertices exist")]
    IndexOutOfRange { line: usize, index: i64, len: usize },

    #[error("line {line}: face references vertex {index} whose coordinates are invalid")]
    InvalidVertex { line: usize, index: usize },

    #[error("line {line}: unknown material {name:?}")]
    MissingMaterial { line: usize, name: String },

    #[error("picking id {id} does not fit in 24 bits")]
    PickIdOutOfRange { id: u32 },

    #[error("failed to fetch {path}: {reason}")]
    Fetch { path: String, reason: String },

    #[error("invalid model options: {reason}")]
    Options { reason: String },
}

impl MeshError {
    pub fn fetch(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error only affects a single face, material or group.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::PickIdOutOfRange { .. } | Self::Options { .. })
    }
}

impl From<serde_json::Error> for MeshError {
    fn from(e: serde_json::Error) -> Self {
        Self::Options {
            reason: e.to_string(),
        }
    }
}
