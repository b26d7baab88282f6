//! Error types for wrapper configuration.
//!
//! Rendering itself has no recoverable errors: misconfiguration detected while
//! building or rendering is a programming error and panics.

/// Errors that can occur while loading or validating a configuration.
#[derive(Debug)]
pub enum WrapperError {
    /// A configuration value is out of range.
    InvalidConfig(String),
    /// The configuration could not be parsed.
    Parse(serde_json::Error),
}

impl std::fmt::Display for WrapperError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            Self::Parse(err) => write!(f, "failed to parse configuration: {err}"),
        }
    }
}

impl std::error::Error for WrapperError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::InvalidConfig(_) => None,
        }
    }
}

impl From<serde_json::Error> for WrapperError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

/// Result type for configuration operations.
pub type WrapperResult<T> = std::result::Result<T, WrapperError>;
