use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Cardinality mismatch on row {row}: column '{column}' has {found} values, expected {expected}")]
    CardinalityMismatch {
        row: usize,
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("Lookup service error: {message}")]
    LookupService { message: String },

    #[error("No lookup entry for composite key: {0}")]
    UnmatchedKey(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AnnotateError {
    pub fn lookup(message: impl Into<String>) -> Self {
        AnnotateError::LookupService {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for AnnotateError {
    fn from(e: reqwest::Error) -> Self {
        AnnotateError::lookup(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnnotateError>;
