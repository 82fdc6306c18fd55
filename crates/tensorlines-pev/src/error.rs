//! Error types for the tensorlines-pev crate

use std::error::Error;
use std::fmt;

/// Common error type for the tensorlines-pev crate
#[derive(Debug)]
pub enum PevError {
    /// A caller-supplied argument was rejected before any search state was built
    InvalidArgument(String),
    /// A numerical routine produced no usable result
    Numerical(String),
}

impl fmt::Display for PevError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PevError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            PevError::Numerical(msg) => write!(f, "Numerical error: {msg}"),
        }
    }
}

impl Error for PevError {}

/// Result type that uses PevError as the error type
pub type PevResult<T> = Result<T, PevError>;
