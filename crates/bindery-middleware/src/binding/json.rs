use super::{DecodeInput, Encoding};
use crate::middleware::BoxFuture;
use bindery_core::{BindingError, Errors};
use bindery_extract::decode_json;
use serde::de::DeserializeOwned;

/// JSON bodies, decoded with `serde_json`.
///
/// Only the first JSON value of the body is read. An empty body or `null`
/// leaves the model at its default without an error.
///
/// Fields missing from the body are only left at their zero value when the
/// model carries `#[serde(default)]`. Without it serde rejects the whole
/// body with a `missing field` deserialization error and every field stays
/// at its default.
#[derive(Debug, Clone, Copy)]
pub struct Json;

impl<M> Encoding<M> for Json
where
    M: DeserializeOwned + Send + 'static,
{
    const NAME: &'static str = "json";

    fn decode<'a>(
        input: DecodeInput<'a>,
        model: &'a mut M,
        errors: &'a mut Errors,
    ) -> BoxFuture<'a, ()> {
        match decode_json::<M>(input.request.body()) {
            Ok(Some(value)) => *model = value,
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(binding = <Self as Encoding<M>>::NAME, error = %err, "failed to decode request body");
                errors.push(BindingError::deserialization(err));
            }
        }
        Box::pin(std::future::ready(()))
    }
}
