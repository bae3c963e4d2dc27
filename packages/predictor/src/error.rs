use thiserror::Error;

/// Failures while loading or running the survival model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid model JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Fory envelope or MessagePack payload could not be decoded
    #[error("invalid binary model: {0}")]
    Binary(String),
    #[error("unsupported model binary format version: {0}")]
    UnsupportedVersion(u8),
    #[error("model splits on feature column {index}, but passenger records have {columns} columns")]
    FeatureOutOfRange { index: usize, columns: usize },
    #[error("model cannot predict on {columns}-column passenger records: {reason}")]
    Incompatible { columns: usize, reason: String },
    #[error("model failed during prediction: {0}")]
    Panicked(String),
    #[error("model returned no prediction")]
    EmptyPrediction,
    #[error("couldn't map prediction {0} to any known class")]
    UnknownClass(usize),
}

/// Reasons a submitted passenger form is rejected.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("missing field '{0}'")]
    Missing(&'static str),
    #[error("could not convert {field}={value:?} to a number: {reason}")]
    InvalidNumber {
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: String,
    },
}
