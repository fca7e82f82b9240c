//! Error types for mindtrail.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias using mindtrail's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a position source could not produce coordinates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PositionError {
    /// The user refused the location permission prompt
    #[error("permission denied")]
    PermissionDenied,

    /// Sensor missing, no fix, or no source configured
    #[error("{0}")]
    Unavailable(String),

    /// The source did not answer within the configured timeout
    #[error("timed out waiting for position")]
    Timeout,
}

/// Core error type for mindtrail operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Position source failed; the Store was not modified
    #[error("Position unavailable: {0}")]
    PositionUnavailable(#[from] PositionError),

    /// Location record not found
    #[error("Location not found: {0}")]
    LocationNotFound(Uuid),

    /// Reverse geocoding failed (never surfaced by the engine)
    #[error("Geocode error: {0}")]
    Geocode(String),

    /// Persistence sink or loader failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
