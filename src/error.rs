//! Global error handling for ctxpack
//!
//! Only conditions that stop an operation outright live here. Recoverable
//! problems (unreadable directories, per-file read trouble) are folded into
//! scan entries and document note blocks instead.

use std::io;
use thiserror::Error;

use crate::tokenizer::TokenizerError;

/// Global error type for ctxpack operations
#[derive(Error, Debug)]
pub enum CtxError {
    /// The project root is missing, unreadable or not a directory
    #[error("Error: Project path is invalid or not a directory: {0}")]
    InvalidRoot(String),

    /// A selection command named a path that is not in the entry list
    #[error("Unknown entry path: {0:?}")]
    UnknownPath(String),

    /// A selection command targeted an entry that can never be included
    #[error("Entry cannot be selected: {0:?}")]
    NotSelectable(String),

    /// Generation was called with an empty entry list
    #[error("Error: No file data provided for generation.")]
    NoEntries,

    /// Generation was called with no included files
    #[error("No files selected to generate context.")]
    NoSelection,

    /// The context document could not be saved
    #[error("Error saving output file '{file_name}': {source}")]
    WriteFailure {
        /// Output file name that was being written
        file_name: String,
        /// Underlying failure
        #[source]
        source: io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON processing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Tokenizer-related errors
    #[error("Tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),
}

/// Specialized Result type for ctxpack operations
pub type Result<T> = std::result::Result<T, CtxError>;

/// Creates a CtxError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::CtxError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

// Lets the binary keep an io::Result main
impl From<CtxError> for io::Error {
    fn from(err: CtxError) -> Self {
        let kind = match &err {
            CtxError::InvalidRoot(_) | CtxError::UnknownPath(_) => io::ErrorKind::NotFound,
            CtxError::Io(e) => e.kind(),
            CtxError::WriteFailure { source, .. } => source.kind(),
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, err.to_string())
    }
}
