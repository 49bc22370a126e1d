//! String-to-scalar coercion for form values.
//!
//! Form sources only carry strings, so every scalar field is populated by
//! coercing one token into the field's type:
//!
//! - integers: empty token is `0`, otherwise a base-10 parse into the exact
//!   target width (overflow fails)
//! - `bool`: `"on"` is `true`, empty is `false`, otherwise one of
//!   `1 t T TRUE true True` / `0 f F FALSE false False`
//! - `f32`/`f64`: empty token is `0.0`, otherwise a decimal parse
//! - `String`: taken verbatim
//!
//! A failed coercion leaves the target untouched and yields a
//! [`CoercionError`].

use std::fmt;
use thiserror::Error;

/// The scalar families a token can be coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Signed integer of any width.
    Int,
    /// Unsigned integer of any width.
    Uint,
    /// Boolean.
    Bool,
    /// 32-bit float.
    Float32,
    /// 64-bit float.
    Float64,
    /// Text.
    String,
}

impl ScalarKind {
    /// Returns the word used in coercion error messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Bool => "bool",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::String => "string",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token could not be coerced into a field's scalar type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field {field:?} cannot parse {token:?} as {kind}")]
pub struct CoercionError {
    /// Name of the field being populated.
    pub field: String,
    /// The offending token.
    pub token: String,
    /// The kind the token was coerced into.
    pub kind: ScalarKind,
}

impl CoercionError {
    /// Creates a coercion error.
    pub fn new(field: impl Into<String>, token: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            field: field.into(),
            token: token.into(),
            kind,
        }
    }
}

/// Scalar types that can be produced from a single form token.
pub trait Coerce: Sized {
    /// The scalar family of this type.
    const KIND: ScalarKind;

    /// Parses `token`, returning `None` when it is not a valid `Self`.
    fn from_token(token: &str) -> Option<Self>;
}

/// Coerces `token` into `T`, attributing failures to `field`.
///
/// # Example
///
/// ```
/// use bindery_core::coerce::coerce;
///
/// assert_eq!(coerce::<u8>("42", "age"), Ok(42));
/// assert_eq!(coerce::<bool>("on", "male"), Ok(true));
/// assert!(coerce::<i8>("300", "small").is_err());
/// ```
pub fn coerce<T: Coerce>(token: &str, field: &str) -> Result<T, CoercionError> {
    T::from_token(token).ok_or_else(|| CoercionError::new(field, token, T::KIND))
}

macro_rules! impl_coerce_number {
    ($kind:expr, $zero:expr => $($ty:ty),+) => {
        $(
            impl Coerce for $ty {
                const KIND: ScalarKind = $kind;

                fn from_token(token: &str) -> Option<Self> {
                    if token.is_empty() {
                        return Some($zero);
                    }
                    token.parse().ok()
                }
            }
        )+
    };
}

impl_coerce_number!(ScalarKind::Int, 0 => i8, i16, i32, i64, isize);
impl_coerce_number!(ScalarKind::Uint, 0 => u8, u16, u32, u64, usize);
impl_coerce_number!(ScalarKind::Float32, 0.0 => f32);
impl_coerce_number!(ScalarKind::Float64, 0.0 => f64);

impl Coerce for bool {
    const KIND: ScalarKind = ScalarKind::Bool;

    fn from_token(token: &str) -> Option<Self> {
        match token {
            // HTML checkboxes submit "on" when ticked.
            "on" => Some(true),
            "" => Some(false),
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
            _ => None,
        }
    }
}

impl Coerce for String {
    const KIND: ScalarKind = ScalarKind::String;

    fn from_token(token: &str) -> Option<Self> {
        Some(token.to_owned())
    }
}

/// Object-safe view of a scalar field, used by the form mapper.
pub trait ScalarSlot {
    /// The scalar family of the field.
    fn kind(&self) -> ScalarKind;

    /// Overwrites the field with `token` coerced, or leaves it untouched.
    fn assign(&mut self, token: &str, field: &str) -> Result<(), CoercionError>;
}

impl<T: Coerce> ScalarSlot for T {
    fn kind(&self) -> ScalarKind {
        T::KIND
    }

    fn assign(&mut self, token: &str, field: &str) -> Result<(), CoercionError> {
        *self = coerce(token, field)?;
        Ok(())
    }
}
