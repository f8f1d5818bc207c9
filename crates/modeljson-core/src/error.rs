//! Error types for modeljson operations.
//!
//! The content of a value never produces an error: malformed text is
//! sanitized and non-finite numbers render as `null`. Errors come from the
//! edges only (writers, configuration parsing, typed value extraction).

use std::fmt;

/// The primary error type for all modeljson operations.
#[derive(Debug)]
pub enum Error {
    /// Type conversion errors
    Type(TypeError),
    /// Configuration errors (bad time zone strings, invalid options)
    Config(ConfigError),
    /// I/O errors from the output writer
    Io(std::io::Error),
    /// Serialization errors reported by serde_json
    Serde(String),
}

#[derive(Debug)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub attribute: Option<String>,
    pub rust_type: Option<&'static str>,
}

#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ConfigError {
    /// Create a configuration error without an underlying cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }
}

impl Error {
    /// Is this an error raised while writing output?
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io(_))
    }

    /// Get the attribute name involved in a type error, if any.
    pub fn attribute(&self) -> Option<&str> {
        match self {
            Error::Type(t) => t.attribute.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Type(e) => {
                if let Some(attr) = &e.attribute {
                    write!(
                        f,
                        "Type error in attribute '{}': expected {}, found {}",
                        attr, e.expected, e.actual
                    )
                } else {
                    write!(f, "Type error: expected {}, found {}", e.expected, e.actual)
                }
            }
            Error::Config(e) => write!(f, "Configuration error: {}", e.message),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Serde(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(attr) = &self.attribute {
            write!(
                f,
                "expected {} for attribute '{}', found {}",
                self.expected, attr, self.actual
            )
        } else {
            write!(f, "expected {}, found {}", self.expected, self.actual)
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::Io(err.into())
        } else {
            Error::Serde(err.to_string())
        }
    }
}

/// Result type alias for modeljson operations.
pub type Result<T> = std::result::Result<T, Error>;
