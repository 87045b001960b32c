//! Metadata Error Types
//!
//! Metadata lives in user-authored files, so every error here is a property
//! of the input: nothing is ever worth retrying.

use derive_more::{Display, Error};

/// A metadata error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for metadata operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Neither the strict nor the relaxed reading produced valid metadata.
    #[display("malformed metadata")]
    MalformedMetadata,
    /// The text is not JSON, even after relaxation.
    #[display("syntax error at line {line}, column {column}")]
    Syntax { line: usize, column: usize },
    /// The text is JSON, but not shaped like metadata (missing `name`,
    /// `keywords` that isn't a list of strings, ...).
    #[display("unexpected metadata shape: {_0}")]
    Schema(#[error(not(source))] String),
    /// A string literal or block comment runs to the end of the input.
    #[display("unterminated {_0}")]
    Unterminated(#[error(not(source))] &'static str),
}
impl From<serde_json::Error> for ErrorKind {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_eof() {
            Self::Syntax { line: err.line(), column: err.column() }
        } else {
            Self::Schema(err.to_string())
        }
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
