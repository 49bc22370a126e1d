//! Body decoding errors.
//!
//! Every decoder in this crate fails with an [`ExtractionError`] that names
//! the part of the request being read. Binding stages wrap it into a
//! deserialization-category binding error.

use http::StatusCode;
use std::fmt;

/// Part of the request being decoded when the error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    /// URL query string
    Query,
    /// Request body (JSON, YAML, url-encoded)
    Body,
    /// Content-Type header
    ContentType,
    /// Multipart body
    Multipart,
}

impl fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => write!(f, "query"),
            Self::Body => write!(f, "body"),
            Self::ContentType => write!(f, "content-type"),
            Self::Multipart => write!(f, "multipart body"),
        }
    }
}

/// Error raised while decoding a request.
///
/// # Example
///
/// ```rust
/// use bindery_extract::{ExtractionError, ExtractionSource};
/// use http::StatusCode;
///
/// let err = ExtractionError::malformed(ExtractionSource::Query, r#"invalid URL escape "%zz""#);
/// assert_eq!(err.extraction_source(), ExtractionSource::Query);
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.to_string(), r#"invalid URL escape "%zz""#);
/// ```
#[derive(Debug)]
pub struct ExtractionError {
    extraction_source: ExtractionSource,
    kind: ExtractionErrorKind,
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtractionErrorKind {
    /// Input is not well-formed for its encoding
    Malformed,
    /// Deserializer rejected the input
    DeserializationFailed,
    /// Body exceeds a configured limit
    PayloadTooLarge,
    /// Content-Type is missing, unparsable or unexpected
    UnsupportedMediaType,
    /// Spilling an upload to disk failed
    Io,
}

impl ExtractionError {
    /// Creates an error for input that breaks its encoding's grammar.
    #[must_use]
    pub fn malformed(source: ExtractionSource, details: impl Into<String>) -> Self {
        Self {
            extraction_source: source,
            kind: ExtractionErrorKind::Malformed,
            message: details.into(),
        }
    }

    /// Creates an error for a deserializer failure.
    #[must_use]
    pub fn deserialization_failed(source: ExtractionSource, error: impl fmt::Display) -> Self {
        Self {
            extraction_source: source,
            kind: ExtractionErrorKind::DeserializationFailed,
            message: format!("failed to deserialize {source}: {error}"),
        }
    }

    /// Creates an error for a body over `max_size` bytes.
    #[must_use]
    pub fn payload_too_large(source: ExtractionSource, max_size: u64) -> Self {
        Self {
            extraction_source: source,
            kind: ExtractionErrorKind::PayloadTooLarge,
            message: format!("{source} too large: limit is {max_size} bytes"),
        }
    }

    /// Creates an error for a missing or unexpected content type.
    #[must_use]
    pub fn unsupported_media_type(expected: &str, actual: Option<&str>) -> Self {
        let actual = actual.unwrap_or("none");
        Self {
            extraction_source: ExtractionSource::ContentType,
            kind: ExtractionErrorKind::UnsupportedMediaType,
            message: format!("unsupported content type: expected '{expected}', got '{actual}'"),
        }
    }

    /// Creates an error for a Content-Type header that cannot be parsed.
    #[must_use]
    pub fn invalid_content_type(value: &str, error: impl fmt::Display) -> Self {
        Self {
            extraction_source: ExtractionSource::ContentType,
            kind: ExtractionErrorKind::UnsupportedMediaType,
            message: format!("invalid content type '{value}': {error}"),
        }
    }

    /// Creates an error for a multipart stream the parser rejected.
    #[must_use]
    pub fn multipart(error: impl fmt::Display) -> Self {
        Self {
            extraction_source: ExtractionSource::Multipart,
            kind: ExtractionErrorKind::Malformed,
            message: format!("failed to parse multipart form: {error}"),
        }
    }

    /// Creates an error for a multipart body whose plain values exceed their budget.
    #[must_use]
    pub fn message_too_large() -> Self {
        Self {
            extraction_source: ExtractionSource::Multipart,
            kind: ExtractionErrorKind::PayloadTooLarge,
            message: "multipart: message too large".to_string(),
        }
    }

    /// Creates an error for an I/O failure while spilling an upload.
    #[must_use]
    pub fn io(error: &std::io::Error) -> Self {
        Self {
            extraction_source: ExtractionSource::Multipart,
            kind: ExtractionErrorKind::Io,
            message: format!("failed to store uploaded file: {error}"),
        }
    }

    /// Returns the part of the request being decoded.
    #[must_use]
    pub fn extraction_source(&self) -> ExtractionSource {
        self.extraction_source
    }

    /// Returns the HTTP status code matching this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ExtractionErrorKind::Malformed | ExtractionErrorKind::DeserializationFailed => {
                StatusCode::BAD_REQUEST
            }
            ExtractionErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ExtractionErrorKind::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ExtractionErrorKind::Io => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code suitable for error envelopes.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            ExtractionErrorKind::Malformed => "MALFORMED_INPUT",
            ExtractionErrorKind::DeserializationFailed => "DESERIALIZATION_FAILED",
            ExtractionErrorKind::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ExtractionErrorKind::UnsupportedMediaType => "UNSUPPORTED_MEDIA_TYPE",
            ExtractionErrorKind::Io => "UPLOAD_STORAGE_FAILED",
        }
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExtractionError {}
