//! Error types for conversion operations

use std::fmt;

/// Errors that can occur while turning a request into Markdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// Missing, empty or wrongly typed HTML input
    InvalidInput(String),
    /// The JSON request envelope could not be parsed
    InvalidJson(String),
    /// Request body is not valid for the declared charset
    EncodingError(String),
    /// HTML parsing failed
    ///
    /// Reserved: html5ever repairs any input, so the pipeline itself never
    /// produces this. Custom handlers may report it.
    ParseError(String),
    /// Internal error
    InternalError(String),
}

impl ConversionError {
    /// Get a stable numeric error code
    pub fn code(&self) -> u32 {
        match self {
            ConversionError::ParseError(_) => 1,
            ConversionError::EncodingError(_) => 2,
            ConversionError::InvalidJson(_) => 3,
            ConversionError::InvalidInput(_) => 5,
            ConversionError::InternalError(_) => 99,
        }
    }

    /// HTTP-style status for the response envelope
    ///
    /// Problems with what the caller sent map to 400, everything else to 500.
    pub fn status_code(&self) -> u16 {
        match self {
            ConversionError::InvalidInput(_)
            | ConversionError::InvalidJson(_)
            | ConversionError::EncodingError(_) => 400,
            ConversionError::ParseError(_) | ConversionError::InternalError(_) => 500,
        }
    }

    /// Message without the variant prefix, as shown to API callers
    pub fn message(&self) -> &str {
        match self {
            ConversionError::InvalidInput(msg)
            | ConversionError::InvalidJson(msg)
            | ConversionError::EncodingError(msg)
            | ConversionError::ParseError(msg)
            | ConversionError::InternalError(msg) => msg,
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            ConversionError::InvalidJson(msg) => write!(f, "Invalid JSON input: {}", msg),
            ConversionError::EncodingError(msg) => write!(f, "Encoding error: {}", msg),
            ConversionError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConversionError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ConversionError {}
