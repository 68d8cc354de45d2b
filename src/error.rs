//! Error types for lawn-estimator

use thiserror::Error;

/// Result type for lawn-estimator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while estimating lawn area
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed address/coordinates
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The geocoder found no match for the address
    #[error("Invalid input: address not found")]
    AddressNotFound,

    /// Degenerate bounding box, non-positive dimensions, or zero-pixel image
    #[error("Invalid viewport: {0}")]
    InvalidViewport(String),

    /// Imagery or geocoding provider failure
    #[error("Upstream fetch failed: {0}")]
    UpstreamFetch(#[from] UpstreamError),

    /// Malformed or empty image bytes
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    /// Classifier was handed a raster it cannot walk
    #[error("Classification error: {0}")]
    Classification(String),
}

/// Provider failures, split so callers can tell misconfiguration from outages
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// No API key configured for the provider
    #[error("missing provider credentials")]
    MissingCredentials,

    /// Provider answered with a non-success status
    #[error("provider returned HTTP {0}")]
    Status(u16),

    /// Call did not complete in time
    #[error("provider request timed out")]
    Timeout,

    /// Connection, TLS or body read failure
    #[error("transport error: {0}")]
    Transport(String),
}

impl UpstreamError {
    /// True when the failure is a deployment problem rather than a transient outage
    pub fn is_configuration(&self) -> bool {
        match self {
            UpstreamError::MissingCredentials => true,
            UpstreamError::Status(code) => *code == 401 || *code == 403,
            UpstreamError::Timeout | UpstreamError::Transport(_) => false,
        }
    }
}

/// Fieldless tag for each error family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    InvalidViewport,
    UpstreamFetch,
    ImageDecode,
    Classification,
}

impl ErrorKind {
    /// Returns the name of this error kind
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::InvalidViewport => "invalid_viewport",
            ErrorKind::UpstreamFetch => "upstream_fetch",
            ErrorKind::ImageDecode => "image_decode",
            ErrorKind::Classification => "classification",
        }
    }
}

impl Error {
    /// Returns the kind tag of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) | Error::AddressNotFound => ErrorKind::InvalidInput,
            Error::InvalidViewport(_) => ErrorKind::InvalidViewport,
            Error::UpstreamFetch(_) => ErrorKind::UpstreamFetch,
            Error::ImageDecode(_) => ErrorKind::ImageDecode,
            Error::Classification(_) => ErrorKind::Classification,
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(error: image::ImageError) -> Self {
        Error::ImageDecode(error.to_string())
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            UpstreamError::Timeout
        } else if let Some(status) = error.status() {
            UpstreamError::Status(status.as_u16())
        } else {
            UpstreamError::Transport(error.to_string())
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Error::UpstreamFetch(error.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidViewport("north <= south".to_string());
        assert_eq!(err.to_string(), "Invalid viewport: north <= south");
    }

    #[test]
    fn test_address_not_found_is_invalid_input() {
        let err = Error::AddressNotFound;
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.to_string(), "Invalid input: address not found");
    }

    #[test]
    fn test_upstream_conversion() {
        let err: Error = UpstreamError::Timeout.into();
        assert_eq!(err.kind(), ErrorKind::UpstreamFetch);
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_configuration_vs_transient() {
        assert!(UpstreamError::MissingCredentials.is_configuration());
        assert!(UpstreamError::Status(401).is_configuration());
        assert!(!UpstreamError::Status(503).is_configuration());
        assert!(!UpstreamError::Timeout.is_configuration());
    }

    #[test]
    fn test_image_error_conversion() {
        let err: Error = image::load_from_memory(&[0x00, 0x01, 0x02]).unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::ImageDecode);
    }
}
