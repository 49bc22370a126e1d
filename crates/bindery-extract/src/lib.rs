//! # Bindery Extract
//!
//! Request body decoders for the bindery binding middleware.
//!
//! Every decoder reads from an [`ExtractionContext`] (method, URI, headers and
//! the collected body) and never consumes the request itself, so the body
//! stays available to later stages.
//!
//! | Decoder | Encoding | Result |
//! |---------|----------|--------|
//! | [`decode_json`] | JSON | first value of the body, or `None` for an empty body |
//! | [`decode_yaml`] | YAML | first document of the body, or `None` for an empty body |
//! | [`parse_form`] | url-encoded body + query | [`FormValues`](bindery_core::FormValues) plus the first error |
//! | [`parse_multipart`] | `multipart/form-data` | [`MultipartForm`] with values and uploaded files |
//!
//! ## Error Handling
//!
//! All decoders fail with [`ExtractionError`], which records the part of the
//! request being read ([`ExtractionSource`]) and maps to an HTTP status code.

#![doc(html_root_url = "https://docs.rs/bindery-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
pub mod form;
pub mod json;
pub mod multipart;
pub mod yaml;

pub use context::{ExtractionContext, ExtractionContextBuilder};
pub use error::{ExtractionError, ExtractionSource};
pub use form::{parse_form, DEFAULT_MAX_FORM_SIZE};
pub use json::decode_json;
pub use multipart::{parse_multipart, MultipartConfig, MultipartForm, DEFAULT_MAX_MEMORY};
pub use yaml::decode_yaml;
