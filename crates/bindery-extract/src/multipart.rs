//! Multipart form decoding.
//!
//! Parts are streamed through [`multer`]. Each named part becomes either a
//! plain value (no file name) or an [`UploadedFile`]. Two budgets apply:
//!
//! - file parts may use `max_memory` bytes of memory in total; a part that
//!   does not fit in what is left is spilled to a temporary file;
//! - plain values may use `max_memory + 10 MiB` in total; going over fails
//!   the whole body with "message too large".
//!
//! In-memory file parts count against both budgets. Plain values that are
//! not valid UTF-8 are decoded lossily.

use crate::{ExtractionContext, ExtractionError, ExtractionSource};
use bindery_core::{FileMap, FormValues, UploadedFile};
use bytes::{Bytes, BytesMut};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// Default memory ceiling for file parts (10 MiB).
pub const DEFAULT_MAX_MEMORY: u64 = 10 << 20;

/// Extra allowance for plain values on top of the memory ceiling.
const VALUE_ALLOWANCE: u64 = 10 << 20;

const SPILL_PREFIX: &str = "bindery-upload-";

/// Limits and storage for multipart decoding.
///
/// # Example
///
/// ```rust
/// use bindery_extract::MultipartConfig;
///
/// let config = MultipartConfig::new()
///     .max_memory(1024 * 1024)
///     .spill_dir("/var/tmp");
/// assert_eq!(config.get_max_memory(), 1024 * 1024);
/// ```
#[derive(Debug, Clone)]
pub struct MultipartConfig {
    max_memory: u64,
    spill_dir: Option<PathBuf>,
}

impl MultipartConfig {
    /// Creates a config with the default ceiling, spilling to the system
    /// temporary directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_memory: DEFAULT_MAX_MEMORY,
            spill_dir: None,
        }
    }

    /// Sets the memory ceiling for file parts. Zero selects the default.
    #[must_use]
    pub fn max_memory(mut self, bytes: u64) -> Self {
        self.max_memory = if bytes == 0 { DEFAULT_MAX_MEMORY } else { bytes };
        self
    }

    /// Sets the directory spilled parts are written to.
    #[must_use]
    pub fn spill_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.spill_dir = Some(dir.into());
        self
    }

    /// Returns the memory ceiling.
    #[must_use]
    pub fn get_max_memory(&self) -> u64 {
        self.max_memory
    }

    /// Returns the spill directory, if one is set.
    #[must_use]
    pub fn get_spill_dir(&self) -> Option<&PathBuf> {
        self.spill_dir.as_ref()
    }
}

impl Default for MultipartConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A parsed multipart body.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    values: FormValues,
    files: FileMap,
}

impl MultipartForm {
    /// Returns the plain values.
    #[must_use]
    pub fn values(&self) -> &FormValues {
        &self.values
    }

    /// Returns the uploaded files.
    #[must_use]
    pub fn files(&self) -> &FileMap {
        &self.files
    }
}

/// Parses a `multipart/form-data` (or `multipart/mixed`) body.
///
/// # Errors
///
/// Fails if the content type is not multipart or has no boundary, if the
/// stream is malformed, if plain values exceed their budget, or if a spilled
/// part cannot be written.
pub async fn parse_multipart(
    ctx: &ExtractionContext,
    config: &MultipartConfig,
) -> Result<MultipartForm, ExtractionError> {
    let boundary = boundary(ctx)?;
    let body = ctx.body().clone();
    let stream = futures_util::stream::once(async move { Ok::<Bytes, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut form = MultipartForm::default();
    let mut file_budget = config.max_memory;
    let mut value_budget = config.max_memory.saturating_add(VALUE_ALLOWANCE);

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(ExtractionError::multipart)?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let file_name = field
            .file_name()
            .filter(|file_name| !file_name.is_empty())
            .map(str::to_owned);

        let Some(file_name) = file_name else {
            let mut value = BytesMut::new();
            while let Some(chunk) = field.chunk().await.map_err(ExtractionError::multipart)? {
                value.extend_from_slice(&chunk);
                if value.len() as u64 > value_budget {
                    return Err(ExtractionError::message_too_large());
                }
            }
            value_budget -= value.len() as u64;
            form.values
                .append(name, String::from_utf8_lossy(&value).into_owned());
            continue;
        };

        let content_type = field.content_type().map(ToString::to_string);
        let mut buffer = BytesMut::new();
        let mut spill: Option<Spill> = None;

        while let Some(chunk) = field.chunk().await.map_err(ExtractionError::multipart)? {
            if let Some(spill) = spill.as_mut() {
                spill.write(&chunk).await?;
                continue;
            }
            buffer.extend_from_slice(&chunk);
            if buffer.len() as u64 > file_budget {
                tracing::trace!(field = %name, file_budget, "multipart part spilled to disk");
                let mut created = Spill::create(config)?;
                created.write(&buffer).await?;
                buffer.clear();
                spill = Some(created);
            }
        }

        let upload = match spill {
            Some(spill) => spill.finish(name.clone()).await?,
            None => {
                let size = buffer.len() as u64;
                file_budget -= size;
                value_budget = value_budget.saturating_sub(size);
                UploadedFile::in_memory(name.clone(), buffer.freeze())
            }
        };

        let upload = upload.with_file_name(file_name);
        let upload = match content_type {
            Some(content_type) => upload.with_content_type(content_type),
            None => upload,
        };
        form.files.append(name, upload);
    }

    Ok(form)
}

fn boundary(ctx: &ExtractionContext) -> Result<String, ExtractionError> {
    let Some(content_type) = ctx.content_type() else {
        return Err(ExtractionError::unsupported_media_type(
            "multipart/form-data",
            None,
        ));
    };
    let mime: mime::Mime = content_type
        .parse()
        .map_err(|e| ExtractionError::invalid_content_type(content_type, e))?;

    if mime.type_() != mime::MULTIPART
        || (mime.subtype() != mime::FORM_DATA && mime.subtype() != "mixed")
    {
        return Err(ExtractionError::unsupported_media_type(
            "multipart/form-data",
            Some(content_type),
        ));
    }

    mime.get_param(mime::BOUNDARY)
        .map(|boundary| boundary.as_str().to_owned())
        .ok_or_else(|| {
            ExtractionError::malformed(
                ExtractionSource::ContentType,
                "no multipart boundary param in Content-Type",
            )
        })
}

/// A file part being written to a temporary file.
struct Spill {
    temp: tempfile::NamedTempFile,
    file: tokio::fs::File,
    size: u64,
}

impl Spill {
    fn create(config: &MultipartConfig) -> Result<Self, ExtractionError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SPILL_PREFIX);
        let temp = match config.get_spill_dir() {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| ExtractionError::io(&e))?;
        let file = temp
            .as_file()
            .try_clone()
            .map_err(|e| ExtractionError::io(&e))?;

        Ok(Self {
            temp,
            file: tokio::fs::File::from_std(file),
            size: 0,
        })
    }

    async fn write(&mut self, chunk: &[u8]) -> Result<(), ExtractionError> {
        self.file
            .write_all(chunk)
            .await
            .map_err(|e| ExtractionError::io(&e))?;
        self.size += chunk.len() as u64;
        Ok(())
    }

    async fn finish(mut self, field_name: String) -> Result<UploadedFile, ExtractionError> {
        self.file.flush().await.map_err(|e| ExtractionError::io(&e))?;
        Ok(UploadedFile::on_disk(field_name, self.temp, self.size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    const BOUNDARY: &str = "XBOUNDARYX";

    fn part(name: &str, file_name: Option<&str>, content: &str) -> String {
        let disposition = match file_name {
            Some(file_name) => format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: text/plain"
            ),
            None => format!("Content-Disposition: form-data; name=\"{name}\""),
        };
        format!("--{BOUNDARY}\r\n{disposition}\r\n\r\n{content}\r\n")
    }

    fn request(parts: &[String]) -> ExtractionContext {
        let mut body = parts.concat();
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        ExtractionContext::builder()
            .method(Method::POST)
            .header(
                "content-type",
                &format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(body)
            .build()
    }

    #[tokio::test]
    async fn test_values_and_files() {
        let ctx = request(&[
            part("name", None, "Logan"),
            part("tag", None, "a"),
            part("tag", None, "b"),
            part("avatar", Some("me.txt"), "hello"),
        ]);

        let form = parse_multipart(&ctx, &MultipartConfig::new()).await.unwrap();

        assert_eq!(form.values().first("name"), Some("Logan"));
        assert_eq!(form.values().get("tag").unwrap(), ["a", "b"]);

        let avatar = &form.files().get("avatar").unwrap()[0];
        assert_eq!(avatar.file_name(), Some("me.txt"));
        assert_eq!(avatar.content_type(), Some("text/plain"));
        assert!(avatar.is_in_memory());
        assert_eq!(avatar.bytes().unwrap().as_ref(), b"hello");
    }

    #[tokio::test]
    async fn test_empty_file_name_is_a_value() {
        let ctx = request(&[part("note", Some(""), "plain")]);
        let form = parse_multipart(&ctx, &MultipartConfig::new()).await.unwrap();

        assert_eq!(form.values().first("note"), Some("plain"));
        assert!(form.files().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_utf8_value_is_replaced() {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"city\"\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(b"K\xf6ln");
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        let ctx = ExtractionContext::builder()
            .method(Method::POST)
            .header(
                "content-type",
                &format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(body)
            .build();

        let form = parse_multipart(&ctx, &MultipartConfig::new()).await.unwrap();
        assert_eq!(form.values().first("city"), Some("K\u{fffd}ln"));
    }

    #[tokio::test]
    async fn test_large_file_spills_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let content = "x".repeat(64);
        let ctx = request(&[
            part("small", Some("a.txt"), "abc"),
            part("big", Some("b.txt"), &content),
        ]);
        let config = MultipartConfig::new().max_memory(16).spill_dir(dir.path());

        let form = parse_multipart(&ctx, &config).await.unwrap();

        let small = &form.files().get("small").unwrap()[0];
        assert!(small.is_in_memory());

        let big = &form.files().get("big").unwrap()[0];
        assert!(!big.is_in_memory());
        assert_eq!(big.len(), 64);
        assert!(big.path().unwrap().starts_with(dir.path()));
        assert_eq!(big.bytes().unwrap().as_ref(), content.as_bytes());
    }

    #[tokio::test]
    async fn test_values_over_budget_fail() {
        // 10 MiB allowance plus a tiny ceiling.
        let huge = "v".repeat((VALUE_ALLOWANCE + 32) as usize);
        let ctx = request(&[part("blob", None, &huge)]);
        let config = MultipartConfig::new().max_memory(16);

        let err = parse_multipart(&ctx, &config).await.unwrap_err();
        assert_eq!(err.to_string(), "multipart: message too large");
    }

    #[tokio::test]
    async fn test_rejects_non_multipart() {
        let ctx = ExtractionContext::builder()
            .method(Method::POST)
            .header("content-type", "application/json")
            .body("{}")
            .build();
        let err = parse_multipart(&ctx, &MultipartConfig::new()).await.unwrap_err();
        assert_eq!(err.extraction_source(), ExtractionSource::ContentType);

        let ctx = ExtractionContext::builder().method(Method::POST).build();
        assert!(parse_multipart(&ctx, &MultipartConfig::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_boundary() {
        let ctx = ExtractionContext::builder()
            .method(Method::POST)
            .header("content-type", "multipart/form-data")
            .build();
        let err = parse_multipart(&ctx, &MultipartConfig::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "no multipart boundary param in Content-Type");
    }

    #[tokio::test]
    async fn test_truncated_stream_fails() {
        let ctx = ExtractionContext::builder()
            .method(Method::POST)
            .header("content-type", "multipart/form-data; boundary=XBOUNDARYX")
            .body("--XBOUNDARYX\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\nunterminated")
            .build();
        let err = parse_multipart(&ctx, &MultipartConfig::new()).await.unwrap_err();
        assert_eq!(err.extraction_source(), ExtractionSource::Multipart);
    }

    #[test]
    fn test_zero_memory_selects_default() {
        assert_eq!(MultipartConfig::new().max_memory(0).get_max_memory(), DEFAULT_MAX_MEMORY);
    }
}
