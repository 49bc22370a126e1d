//! Uploaded file handles.

use bytes::Bytes;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Where the content of an [`UploadedFile`] lives.
#[derive(Debug, Clone)]
pub enum FileStorage {
    /// Held in memory.
    Memory(Bytes),
    /// Spilled to a temporary file, removed when the last handle is dropped.
    Disk(Arc<NamedTempFile>),
}

/// A file received through a multipart form.
///
/// Small parts are kept in memory; parts exceeding the multipart memory
/// ceiling are spilled to a temporary file whose lifetime is tied to the
/// handle (and its clones), so it disappears at the end of the request.
///
/// # Example
///
/// ```
/// use bindery_core::UploadedFile;
/// use bytes::Bytes;
///
/// let file = UploadedFile::in_memory("avatar", Bytes::from_static(b"\x89PNG"))
///     .with_file_name("me.png")
///     .with_content_type("image/png");
/// assert_eq!(file.extension(), Some("png"));
/// assert_eq!(file.len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct UploadedFile {
    field_name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    size: u64,
    storage: FileStorage,
}

impl UploadedFile {
    /// Creates a handle for content held in memory.
    pub fn in_memory(field_name: impl Into<String>, data: Bytes) -> Self {
        Self {
            field_name: field_name.into(),
            file_name: None,
            content_type: None,
            size: data.len() as u64,
            storage: FileStorage::Memory(data),
        }
    }

    /// Creates a handle for content spilled to `file`.
    pub fn on_disk(field_name: impl Into<String>, file: NamedTempFile, size: u64) -> Self {
        Self {
            field_name: field_name.into(),
            file_name: None,
            content_type: None,
            size,
            storage: FileStorage::Disk(Arc::new(file)),
        }
    }

    /// Sets the client-supplied file name.
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Sets the declared content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// The form field the file was submitted under.
    #[must_use]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// The client-supplied file name.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// The declared content type.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Size of the content in bytes.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.size
    }

    /// Returns `true` for zero-length uploads.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The extension of the client-supplied file name.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.file_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext))
    }

    /// Returns `true` if the content is held in memory.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        matches!(self.storage, FileStorage::Memory(_))
    }

    /// Path of the spilled temporary file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.storage {
            FileStorage::Memory(_) => None,
            FileStorage::Disk(file) => Some(file.path()),
        }
    }

    /// The underlying storage.
    #[must_use]
    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }

    /// Reads the whole content.
    ///
    /// Spilled files are read from disk synchronously.
    pub fn bytes(&self) -> io::Result<Bytes> {
        match &self.storage {
            FileStorage::Memory(data) => Ok(data.clone()),
            FileStorage::Disk(file) => std::fs::read(file.path()).map(Bytes::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_in_memory_file() {
        let file = UploadedFile::in_memory("background", Bytes::from_static(b"hello"))
            .with_file_name("bg.jpg");

        assert_eq!(file.field_name(), "background");
        assert_eq!(file.file_name(), Some("bg.jpg"));
        assert_eq!(file.content_type(), None);
        assert!(file.is_in_memory());
        assert!(file.path().is_none());
        assert_eq!(file.bytes().unwrap(), Bytes::from_static(b"hello"));
    }

    #[test]
    fn test_disk_file_removed_with_last_handle() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"spilled").unwrap();

        let file = UploadedFile::on_disk("picture", temp, 7);
        let path = file.path().unwrap().to_path_buf();
        let clone = file.clone();

        assert!(!file.is_in_memory());
        assert_eq!(clone.bytes().unwrap(), Bytes::from_static(b"spilled"));

        drop(file);
        assert!(path.exists());
        drop(clone);
        assert!(!path.exists());
    }

    #[test]
    fn test_extension() {
        let file = UploadedFile::in_memory("doc", Bytes::new());
        assert_eq!(file.extension(), None);
        assert!(file.is_empty());
        assert_eq!(file.with_file_name("report.final.pdf").extension(), Some("pdf"));
    }
}
