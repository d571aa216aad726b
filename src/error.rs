use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serde_json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A corpus token that is not of the form `word/tag`.
    #[error("malformed token {token:?} at line {line}")]
    MalformedToken { line: usize, token: String },

    /// Prediction and reference disagree on the sentence length.
    #[error("length mismatch: expected {expected} tags, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("invalid model: {0}")]
    InvalidModel(String),
}

impl Error {
    pub(crate) fn invalid_model<S: Into<String>>(msg: S) -> Self {
        Self::InvalidModel(msg.into())
    }
}
