//! Error types for the library layer.

use std::fmt;

/// Errors produced by the library layer, wrapping page client errors
/// and adding table parsing and input validation failures.
///
/// The [`Holders`](crate::Holders) accessors never return these; they log
/// them and degrade to an absent dataset.
#[derive(Debug)]
pub enum HoldersError {
    /// An error from the underlying page client.
    Api(holders_api::Error),
    /// The page could not be turned into tables.
    Parse(String),
    /// User-provided input failed validation.
    InvalidInput(String),
}

impl fmt::Display for HoldersError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "API error: {}", e),
            Self::Parse(msg) => write!(f, "Parse error: {}", msg),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for HoldersError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }
}

impl From<holders_api::Error> for HoldersError {
    fn from(e: holders_api::Error) -> Self {
        Self::Api(e)
    }
}
