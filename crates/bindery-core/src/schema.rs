//! Static field tables describing form models.
//!
//! A [`FormModel`] exposes one [`Field`] per externally writable struct
//! field. Each descriptor carries the Rust field name, the external key it
//! is populated from, and a [`FieldKind`] holding an accessor that borrows
//! the field through the trait object matching its shape. Tables are built
//! once per type (normally by `#[derive(FormModel)]`) and live in a
//! `static`, so binding a request never re-derives them.
//!
//! # Example
//!
//! A hand-written table, equivalent to what the derive generates:
//!
//! ```
//! use bindery_core::{Field, FieldKind, FormModel, ScalarSlot, SequenceSlot};
//!
//! #[derive(Default)]
//! struct Search {
//!     query: String,
//!     tags: Vec<String>,
//! }
//!
//! fn query(m: &mut Search) -> &mut dyn ScalarSlot {
//!     &mut m.query
//! }
//!
//! fn tags(m: &mut Search) -> &mut dyn SequenceSlot {
//!     &mut m.tags
//! }
//!
//! impl FormModel for Search {
//!     fn fields() -> &'static [Field<Self>] {
//!         static FIELDS: [Field<Search>; 2] = [
//!             Field::new("query", "q", FieldKind::Scalar(query)),
//!             Field::new("tags", "tag", FieldKind::Sequence(tags)),
//!         ];
//!         &FIELDS
//!     }
//! }
//!
//! assert_eq!(Search::fields()[0].key(), "q");
//! ```

use crate::coerce::{coerce, Coerce, ScalarKind, ScalarSlot};
use crate::error::{BindingError, Errors};
use crate::file::UploadedFile;
use crate::mapper::{map_fields, FormSource};
use std::fmt;

/// A type that can be populated from flat form sources.
pub trait FormModel: Default + 'static {
    /// The writable fields of the type, in declaration order.
    fn fields() -> &'static [Field<Self>];
}

/// Descriptor of one writable field.
pub struct Field<M> {
    name: &'static str,
    key: &'static str,
    kind: FieldKind<M>,
}

impl<M> Field<M> {
    /// Creates a descriptor.
    pub const fn new(name: &'static str, key: &'static str, kind: FieldKind<M>) -> Self {
        Self { name, key, kind }
    }

    /// The Rust field name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The external key the field is populated from.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// The field's shape and accessor.
    #[must_use]
    pub const fn kind(&self) -> &FieldKind<M> {
        &self.kind
    }
}

impl<M> fmt::Debug for Field<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("kind", &self.kind.shape())
            .finish()
    }
}

/// The five field shapes the mapper understands.
pub enum FieldKind<M> {
    /// A single scalar (`i32`, `bool`, `String`, ...).
    Scalar(fn(&mut M) -> &mut dyn ScalarSlot),
    /// A `Vec` of scalars.
    Sequence(fn(&mut M) -> &mut dyn SequenceSlot),
    /// A nested model, always materialized.
    Record(fn(&mut M) -> &mut dyn RecordSlot),
    /// An optional nested model, materialized only when one of its keys matched.
    Optional(fn(&mut M) -> &mut dyn OptionalSlot),
    /// One uploaded file or a `Vec` of them.
    File(fn(&mut M) -> &mut dyn FileSlot),
}

impl<M> FieldKind<M> {
    /// Short lowercase name of the shape.
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Sequence(_) => "sequence",
            Self::Record(_) => "record",
            Self::Optional(_) => "optional",
            Self::File(_) => "file",
        }
    }
}

/// Object-safe view of a `Vec` of scalars.
pub trait SequenceSlot {
    /// The scalar family of the elements.
    fn element_kind(&self) -> ScalarKind;

    /// Replaces the sequence with one element per token.
    ///
    /// Each position is coerced independently; a failed position keeps the
    /// element's zero value and records one error.
    fn assign_all(&mut self, tokens: &[String], key: &str, errors: &mut Errors);
}

impl<T: Coerce + Default> SequenceSlot for Vec<T> {
    fn element_kind(&self) -> ScalarKind {
        T::KIND
    }

    fn assign_all(&mut self, tokens: &[String], key: &str, errors: &mut Errors) {
        *self = tokens
            .iter()
            .map(|token| {
                coerce::<T>(token, key).unwrap_or_else(|err| {
                    tracing::trace!(key, token = %token, "sequence element coercion failed");
                    errors.push(BindingError::deserialization(err));
                    T::default()
                })
            })
            .collect();
    }
}

/// Object-safe view of a nested model.
pub trait RecordSlot {
    /// Populates the record in place; returns `true` if any key matched.
    fn map_record(&mut self, source: &FormSource<'_>, errors: &mut Errors) -> bool;
}

impl<M: FormModel> RecordSlot for M {
    fn map_record(&mut self, source: &FormSource<'_>, errors: &mut Errors) -> bool {
        map_fields(self, source, errors)
    }
}

/// Object-safe view of an optional nested model.
pub trait OptionalSlot {
    /// Populates a fresh record and stores it only if any key matched.
    fn map_optional(&mut self, source: &FormSource<'_>, errors: &mut Errors) -> bool;
}

impl<M: FormModel> OptionalSlot for Option<M> {
    fn map_optional(&mut self, source: &FormSource<'_>, errors: &mut Errors) -> bool {
        let mut record = M::default();
        let matched = map_fields(&mut record, source, errors);
        if matched {
            *self = Some(record);
        }
        matched
    }
}

/// Object-safe view of an uploaded-file field.
pub trait FileSlot {
    /// Stores the files uploaded under the field's key.
    fn assign_files(&mut self, files: &[UploadedFile]);
}

impl FileSlot for Option<UploadedFile> {
    fn assign_files(&mut self, files: &[UploadedFile]) {
        if let Some(first) = files.first() {
            *self = Some(first.clone());
        }
    }
}

impl FileSlot for Vec<UploadedFile> {
    fn assign_files(&mut self, files: &[UploadedFile]) {
        *self = files.to_vec();
    }
}
