use super::{DecodeInput, Encoding};
use crate::middleware::BoxFuture;
use bindery_core::{map_form, BindingError, Errors, FormModel};
use bindery_extract::parse_form;

/// URL-encoded bodies merged with the query string.
///
/// For `POST`, `PUT` and `PATCH` requests with an
/// `application/x-www-form-urlencoded` body, body pairs come first and query
/// pairs are appended; other requests bind from the query string alone. A
/// parse failure is recorded and the well-formed pairs are still mapped.
#[derive(Debug, Clone, Copy)]
pub struct Form;

impl<M> Encoding<M> for Form
where
    M: FormModel + Send,
{
    const NAME: &'static str = "form";

    fn decode<'a>(
        input: DecodeInput<'a>,
        model: &'a mut M,
        errors: &'a mut Errors,
    ) -> BoxFuture<'a, ()> {
        let (values, error) = parse_form(input.request, input.limits.max_form_size());
        if let Some(err) = error {
            tracing::warn!(binding = <Self as Encoding<M>>::NAME, error = %err, "failed to parse form");
            errors.push(BindingError::deserialization(err));
        }
        map_form(model, &values, None, errors);
        Box::pin(std::future::ready(()))
    }
}
