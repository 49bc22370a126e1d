//! JSON body decoding.

use crate::{ExtractionError, ExtractionSource};
use serde::de::DeserializeOwned;

/// Decodes the first JSON value of `body`.
///
/// Returns `Ok(None)` when the body is empty, only whitespace, or a JSON
/// `null`: none of those is an error. Bytes after the first value are not
/// inspected.
///
/// # Example
///
/// ```rust
/// use bindery_extract::decode_json;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct CreateUser {
///     name: String,
/// }
///
/// let user: CreateUser = decode_json(br#"{"name": "Alice"}"#).unwrap().unwrap();
/// assert_eq!(user.name, "Alice");
///
/// assert!(decode_json::<CreateUser>(b"  \n").unwrap().is_none());
/// ```
///
/// # Errors
///
/// Returns a deserialization error for malformed or mistyped JSON.
pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<Option<T>, ExtractionError> {
    let mut stream = serde_json::Deserializer::from_slice(body).into_iter::<Option<T>>();
    stream
        .next()
        .transpose()
        .map(Option::flatten)
        .map_err(|e| ExtractionError::deserialization_failed(ExtractionSource::Body, e))
}
