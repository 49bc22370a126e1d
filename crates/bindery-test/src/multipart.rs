//! A small multipart body encoder for building upload requests.

use bytes::{BufMut, Bytes, BytesMut};

/// Boundary used unless one is set explicitly.
pub const DEFAULT_BOUNDARY: &str = "bindery-test-boundary";

struct Part {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

/// A `multipart/form-data` body under construction.
///
/// ```
/// use bindery_test::MultipartBody;
///
/// let body = MultipartBody::new()
///     .text("title", "Quarterly report")
///     .file("document", "report.csv", "text/csv", "a,b\n1,2\n");
///
/// assert!(body.content_type().ends_with("boundary=bindery-test-boundary"));
/// ```
#[must_use]
pub struct MultipartBody {
    boundary: String,
    parts: Vec<Part>,
}

impl MultipartBody {
    /// Creates an empty body with the default boundary.
    pub fn new() -> Self {
        Self {
            boundary: DEFAULT_BOUNDARY.to_string(),
            parts: Vec::new(),
        }
    }

    /// Replaces the boundary.
    pub fn boundary(mut self, boundary: impl Into<String>) -> Self {
        self.boundary = boundary.into();
        self
    }

    /// Appends a plain value part.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(Part {
            name: name.into(),
            file_name: None,
            content_type: None,
            data: Bytes::from(value.into()),
        });
        self
    }

    /// Appends a file part.
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        self.parts.push(Part {
            name: name.into(),
            file_name: Some(file_name.into()),
            content_type: Some(content_type.into()),
            data: data.into(),
        });
        self
    }

    /// The `Content-Type` header value for this body.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Encodes the body.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        let mut out = BytesMut::new();
        for part in &self.parts {
            out.put_slice(format!("--{}\r\n", self.boundary).as_bytes());
            let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
            if let Some(file_name) = &part.file_name {
                disposition.push_str(&format!("; filename=\"{file_name}\""));
            }
            out.put_slice(disposition.as_bytes());
            out.put_slice(b"\r\n");
            if let Some(content_type) = &part.content_type {
                out.put_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
            }
            out.put_slice(b"\r\n");
            out.put_slice(&part.data);
            out.put_slice(b"\r\n");
        }
        out.put_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        out.freeze()
    }
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_layout() {
        let body = MultipartBody::new()
            .boundary("XYZ")
            .text("name", "logan")
            .file("avatar", "me.png", "image/png", &b"\x89PNG"[..])
            .to_bytes();

        let expected = b"--XYZ\r\n\
Content-Disposition: form-data; name=\"name\"\r\n\r\n\
logan\r\n\
--XYZ\r\n\
Content-Disposition: form-data; name=\"avatar\"; filename=\"me.png\"\r\n\
Content-Type: image/png\r\n\r\n\
\x89PNG\r\n\
--XYZ--\r\n";
        assert_eq!(body.as_ref(), &expected[..]);
    }

    #[test]
    fn test_empty_body_is_terminated() {
        let body = MultipartBody::new().to_bytes();
        assert_eq!(body, "--bindery-test-boundary--\r\n");
    }
}
