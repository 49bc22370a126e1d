//! Classified binding errors and the per-request error collection.
//!
//! Every failure observed while binding a request is recorded as a
//! [`BindingError`] carrying one of two [`ErrorCategory`] values:
//!
//! | Category | Raised by |
//! |---|---|
//! | `Deserialization` | body decoding, form parsing, per-field coercion |
//! | `Validation` | the configured validator |
//!
//! Errors are appended to an [`Errors`] collection in the order they are
//! observed. The collection is a list, not a set: duplicates are kept and
//! the first entry is usually the one surfaced to users.

use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};
use std::error::Error as StdError;
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

/// Categories of binding failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The body or a form field could not be decoded into the model.
    Deserialization,
    /// The populated model was rejected by the validator.
    Validation,
}

impl ErrorCategory {
    /// Returns the lowercase name used in logs and serialized output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Deserialization => "deserialization",
            Self::Validation => "validation",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single classified failure.
///
/// The underlying error is shared, so cloning a `BindingError` (or a whole
/// [`Errors`] collection) is cheap. `Display` renders the underlying error's
/// message unchanged.
///
/// # Example
///
/// ```
/// use bindery_core::{BindingError, CoercionError, ErrorCategory, ScalarKind};
///
/// let err = BindingError::deserialization(CoercionError::new("height", "bad", ScalarKind::Int));
/// assert_eq!(err.category(), ErrorCategory::Deserialization);
/// assert_eq!(err.to_string(), r#"field "height" cannot parse "bad" as int"#);
/// ```
#[derive(Clone)]
pub struct BindingError {
    category: ErrorCategory,
    error: Arc<dyn StdError + Send + Sync>,
}

impl BindingError {
    /// Wraps an error with an explicit category.
    pub fn new(category: ErrorCategory, error: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            category,
            error: Arc::new(error),
        }
    }

    /// Creates a deserialization error.
    pub fn deserialization(error: impl StdError + Send + Sync + 'static) -> Self {
        Self::new(ErrorCategory::Deserialization, error)
    }

    /// Creates a validation error.
    pub fn validation(error: impl StdError + Send + Sync + 'static) -> Self {
        Self::new(ErrorCategory::Validation, error)
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        self.category
    }

    /// Returns `true` for validation errors.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        self.category == ErrorCategory::Validation
    }

    /// Returns the underlying error.
    #[must_use]
    pub fn get_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.error
    }

    /// Attempts to downcast the underlying error to a concrete type.
    #[must_use]
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.error.downcast_ref::<E>()
    }
}

impl fmt::Debug for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingError")
            .field("category", &self.category)
            .field("error", &self.error.to_string())
            .finish()
    }
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl StdError for BindingError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.error)
    }
}

impl Serialize for BindingError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BindingError", 2)?;
        state.serialize_field("category", &self.category)?;
        state.serialize_field("error", &self.error.to_string())?;
        state.end()
    }
}

/// Ordered, append-only collection of [`BindingError`]s for one request.
///
/// Downstream handlers receive the collection by value through the context
/// extensions once binding has finished.
#[derive(Debug, Clone, Default)]
pub struct Errors {
    entries: Vec<BindingError>,
}

impl Errors {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one error.
    pub fn push(&mut self, error: BindingError) {
        self.entries.push(error);
    }

    /// Appends every error of `other`, preserving its order.
    pub fn extend(&mut self, other: Errors) {
        self.entries.extend(other.entries);
    }

    /// Returns the number of recorded errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the first recorded error.
    #[must_use]
    pub fn first(&self) -> Option<&BindingError> {
        self.entries.first()
    }

    /// Returns the error at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&BindingError> {
        self.entries.get(index)
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, BindingError> {
        self.entries.iter()
    }

    /// Iterates over the errors of one category, in insertion order.
    pub fn of_category(&self, category: ErrorCategory) -> impl Iterator<Item = &BindingError> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    /// Returns `true` if any error of `category` was recorded.
    #[must_use]
    pub fn has_category(&self, category: ErrorCategory) -> bool {
        self.of_category(category).next().is_some()
    }
}

impl Index<usize> for Errors {
    type Output = BindingError;

    fn index(&self, index: usize) -> &Self::Output {
        &self.entries[index]
    }
}

impl IntoIterator for Errors {
    type Item = BindingError;
    type IntoIter = std::vec::IntoIter<BindingError>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Errors {
    type Item = &'a BindingError;
    type IntoIter = std::slice::Iter<'a, BindingError>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<BindingError> for Errors {
    fn from_iter<I: IntoIterator<Item = BindingError>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Errors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for entry in &self.entries {
            seq.serialize_element(entry)?;
        }
        seq.end()
    }
}
