use std::sync::Arc;

/// Errors produced while navigating to or iterating over a JSON array.
///
/// Foreign errors are held behind `Arc` so a cursor can hand out the same
/// terminal error on every call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum JsonSliceError {
    #[error("I/O error: {0}")]
    Io(Arc<std::io::Error>),
    #[error("JSON decoding error: {0}")]
    Json(Arc<simd_json::Error>),
    #[error("syntax error at byte {offset}: {message}")]
    Syntax { offset: u64, message: String },
    #[error("unexpected token: expected {expected}, got {found}")]
    UnexpectedToken { expected: &'static str, found: String },
    #[error("unexpected end of input at byte {offset}")]
    UnexpectedEof { offset: u64 },
    #[error("path not found: {path}")]
    NotFound { path: String },
    #[error("a single token or element exceeds the {limit} byte buffer limit")]
    BufferOverflow { limit: usize },
    #[error("Timeout while waiting for data")]
    Timeout,
}

impl JsonSliceError {
    /// The document was well formed but did not contain the requested path.
    pub fn is_not_found(&self) -> bool {
        matches!(self, JsonSliceError::NotFound { .. })
    }

    /// The input violated the JSON grammar or the expected document shape.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            JsonSliceError::Syntax { .. }
                | JsonSliceError::UnexpectedToken { .. }
                | JsonSliceError::UnexpectedEof { .. }
                | JsonSliceError::Json(_)
        )
    }

    pub(crate) fn syntax(offset: u64, message: impl Into<String>) -> Self {
        JsonSliceError::Syntax {
            offset,
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for JsonSliceError {
    fn from(err: std::io::Error) -> Self {
        JsonSliceError::Io(Arc::new(err))
    }
}

impl From<simd_json::Error> for JsonSliceError {
    fn from(err: simd_json::Error) -> Self {
        JsonSliceError::Json(Arc::new(err))
    }
}
