//! YAML body decoding.

use crate::{ExtractionError, ExtractionSource};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Decodes the first YAML document of `body`.
///
/// An empty or whitespace-only body yields `Ok(None)`, as does a document
/// that is only `null` or `~`.
///
/// # Errors
///
/// Returns a deserialization error for malformed or mistyped YAML.
pub fn decode_yaml<T: DeserializeOwned>(body: &[u8]) -> Result<Option<T>, ExtractionError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let Some(document) = serde_yaml::Deserializer::from_slice(body).next() else {
        return Ok(None);
    };

    Option::<T>::deserialize(document)
        .map_err(|e| ExtractionError::deserialization_failed(ExtractionSource::Body, e))
}
