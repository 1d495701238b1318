use std::fmt;

/// Result type for spanweave-providers operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reading span exports
#[derive(Debug)]
pub enum Error {
    /// IO operation failed
    Io(std::io::Error),

    /// JSON parsing failed outside a line-oriented read
    Json(serde_json::Error),

    /// A record could not be turned into a span
    Parse { line: usize, message: String },

    /// No source recognizes the input
    UnknownSource(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Json(err) => write!(f, "JSON error: {}", err),
            Error::Parse { line, message } => write!(f, "Parse error at line {}: {}", line, message),
            Error::UnknownSource(what) => write!(f, "Unknown span source: {}", what),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Parse { .. } | Error::UnknownSource(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}
