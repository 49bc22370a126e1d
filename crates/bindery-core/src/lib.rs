//! # Bindery Core
//!
//! Core types for the bindery request-binding middleware.
//!
//! This crate holds everything that does not depend on HTTP plumbing:
//!
//! - [`coerce`] - String-to-scalar coercion with per-field errors
//! - [`FormModel`] / [`Field`] / [`FieldKind`] - Static field tables for form models
//! - [`map_form`] - The recursive form mapper
//! - [`FormValues`] / [`FileMap`] - Flat source mappings
//! - [`UploadedFile`] - Uploaded file handles, in memory or spilled to disk
//! - [`BindingError`] / [`Errors`] - Classified errors and the per-request collection
//! - [`Validator`] / [`RuleValidator`] - The validation seam
//! - [`Cancellation`] - Request-scoped cancellation

#![doc(html_root_url = "https://docs.rs/bindery-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cancel;
pub mod coerce;
mod error;
mod file;
pub mod mapper;
pub mod schema;
mod source;
pub mod validate;

pub use cancel::Cancellation;
pub use coerce::{Coerce, CoercionError, ScalarKind, ScalarSlot};
pub use error::{BindingError, ErrorCategory, Errors};
pub use file::{FileStorage, UploadedFile};
pub use mapper::{map_form, FormSource};
pub use schema::{Field, FieldKind, FileSlot, FormModel, OptionalSlot, RecordSlot, SequenceSlot};
pub use source::{FileMap, FormValues};
pub use validate::{AcceptAll, RuleValidator, ValidationFailure, Validator, Violation};
