//! Procedural macros for bindery.
//!
//! # Overview
//!
//! `#[derive(FormModel)]` builds the static field table the form mapper
//! walks, so url-encoded and multipart bodies can populate a struct without
//! runtime reflection.
//!
//! # Example
//!
//! ```rust,ignore
//! use bindery::prelude::*;
//!
//! #[derive(Default, FormModel)]
//! struct Profile {
//!     #[form(rename = "first_name")]
//!     first_name: String,
//!     age: u8,
//!     tags: Vec<String>,
//!     #[form(nested)]
//!     address: Option<Address>,
//!     #[form(rename = "picture")]
//!     pictures: Vec<UploadedFile>,
//!     #[form(skip)]
//!     internal_id: u64,
//! }
//! ```
//!
//! # Field shapes
//!
//! The shape of each field is inferred from its declared type:
//!
//! | Declared type | Shape |
//! |---|---|
//! | `Option<UploadedFile>`, `Vec<UploadedFile>` | file |
//! | `Vec<T>` | sequence of scalars |
//! | `#[form(nested)] T` | record |
//! | `#[form(nested)] Option<T>` | optional record |
//! | anything else | scalar |

mod derive;
mod parse;

use proc_macro::TokenStream;

/// Derives `FormModel` for a struct with named fields.
///
/// # Attributes
///
/// - `#[form(rename = "key")]`: populate the field from `key` instead of its name
/// - `#[form(skip)]`: never populate the field
/// - `#[form(nested)]`: treat the field as a nested model
///
/// # Generated Code
///
/// The macro generates approximately:
///
/// ```rust,ignore
/// impl FormModel for Profile {
///     fn fields() -> &'static [Field<Self>] {
///         fn __bindery_age(model: &mut Profile) -> &mut dyn ScalarSlot {
///             &mut model.age
///         }
///         static FIELDS: [Field<Profile>; 1] = [
///             Field::new("age", "age", FieldKind::Scalar(__bindery_age)),
///         ];
///         &FIELDS
///     }
/// }
/// ```
#[proc_macro_derive(FormModel, attributes(form))]
pub fn derive_form_model(item: TokenStream) -> TokenStream {
    derive::expand_form_model(item.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
