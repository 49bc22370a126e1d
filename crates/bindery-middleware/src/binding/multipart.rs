use super::{DecodeInput, Encoding};
use crate::middleware::BoxFuture;
use bindery_core::{map_form, BindingError, Errors, FormModel};
use bindery_extract::{parse_multipart, MultipartForm};
use std::sync::Arc;

/// Multipart form bodies (`multipart/form-data` or `multipart/mixed`).
///
/// The body is parsed at most once per request: the first multipart stage
/// stores the result as a [`ParsedMultipart`] context extension and later
/// stages map from it. A parse failure is recorded and mapping is skipped;
/// the query string is not consulted.
#[derive(Debug, Clone, Copy)]
pub struct Multipart;

/// A multipart body already parsed for the current request.
#[derive(Debug, Clone)]
pub struct ParsedMultipart(Arc<MultipartForm>);

impl ParsedMultipart {
    /// Wraps a parsed form.
    #[must_use]
    pub fn new(form: MultipartForm) -> Self {
        Self(Arc::new(form))
    }

    /// Returns the parsed form.
    #[must_use]
    pub fn form(&self) -> &MultipartForm {
        &self.0
    }
}

impl<M> Encoding<M> for Multipart
where
    M: FormModel + Send,
{
    const NAME: &'static str = "multipart_form";

    fn decode<'a>(
        input: DecodeInput<'a>,
        model: &'a mut M,
        errors: &'a mut Errors,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let cached = input.ctx.get_extension::<ParsedMultipart>().cloned();
            let parsed = match cached {
                Some(parsed) => parsed,
                None => match parse_multipart(input.request, input.limits.multipart()).await {
                    Ok(form) => {
                        let parsed = ParsedMultipart::new(form);
                        input.ctx.set_extension(parsed.clone());
                        parsed
                    }
                    Err(err) => {
                        tracing::warn!(
                            binding = <Self as Encoding<M>>::NAME,
                            error = %err,
                            "failed to parse multipart form"
                        );
                        errors.push(BindingError::deserialization(err));
                        return;
                    }
                },
            };

            let form = parsed.form();
            map_form(model, form.values(), Some(form.files()), errors);
        })
    }
}
