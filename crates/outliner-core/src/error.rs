use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum OutlineError {
    #[error("cannot read layout from {path}: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },

    #[error("pdftohtml not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftohtmlNotFound,

    #[error("pdftohtml failed with exit code {code}: {stderr}")]
    PdftohtmlFailed { code: i32, stderr: String },

    #[error("failed to parse layout XML: {0}")]
    LayoutParse(String),

    #[error("embedding degraded: {0}")]
    EmbeddingDegraded(String),

    #[error("failed to initialize embedder: {0}")]
    EmbedderInit(String),

    #[error("no content: {reason}")]
    NoContent { reason: String },

    #[error("failed to write {path}: {reason}")]
    Persist { path: PathBuf, reason: String },

    #[error("failed to load config from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OutlineError {
    /// True for document-scoped outcomes that mean "nothing to write" rather than failure.
    pub fn is_skippable(&self) -> bool {
        matches!(self, OutlineError::NoContent { .. })
    }

    pub(crate) fn no_content(reason: impl Into<String>) -> Self {
        OutlineError::NoContent {
            reason: reason.into(),
        }
    }
}
