use thiserror::Error;

pub type Result<T> = std::result::Result<T, CmnetError>;

/// Errors raised by the table pipeline and its loaders
#[derive(Debug, Error)]
pub enum CmnetError {
    #[error("Malformed taxonomy string '{input}': {reason}")]
    MalformedTaxonomyString { input: String, reason: String },

    #[error("Tables share no entities (main has {main} rows, converter has {converter} columns)")]
    DegenerateAlignment { main: usize, converter: usize },

    #[error("Unsupported model level '{0}' (expected genus or species)")]
    UnsupportedLevel(String),

    #[error("Invalid table: {0}")]
    InvalidTable(String),

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CmnetError {
    pub(crate) fn malformed(input: &str, reason: impl Into<String>) -> Self {
        CmnetError::MalformedTaxonomyString {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
