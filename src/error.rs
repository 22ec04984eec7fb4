//! Error types for scanning, snapshotting and exporting graphics

use thiserror::Error;

/// Result type alias for svgrab operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading pages and exporting graphics
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to load a page (missing file, network failure, bad URL)
    #[error("Failed to load page: {0}")]
    LoadError(String),

    /// Markup or stylesheet input could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The serialized graphic could not be decoded into a drawable source
    #[error("Decode failed: {0}")]
    DecodeFailed(String),

    /// No drawing surface of the requested size could be allocated
    #[error("Drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// The drawing surface could not be encoded as PNG
    #[error("PNG encoding failed: {0}")]
    EncodeFailed(String),

    /// A data reference handed to delivery was malformed or of the wrong type
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Geometric bounding box could not be computed (element not renderable)
    #[error("Bounding box unavailable: {0}")]
    BoundingBox(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// The delivery mechanism rejected or failed a download
    #[error("Delivery failed: {0}")]
    DeliveryError(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let e = Error::DecodeFailed("unexpected end of stream".into());
        assert_eq!(e.to_string(), "Decode failed: unexpected end of stream");

        let io: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(io, Error::Io(_)));
    }
}
