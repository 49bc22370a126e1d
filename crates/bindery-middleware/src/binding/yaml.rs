use super::{DecodeInput, Encoding};
use crate::middleware::BoxFuture;
use bindery_core::{BindingError, Errors};
use bindery_extract::decode_yaml;
use serde::de::DeserializeOwned;

/// YAML bodies, decoded with `serde_yaml`.
///
/// Only the first document of the body is read. As with [`Json`](super::Json),
/// models need `#[serde(default)]` for omitted fields to fall back to their
/// zero value instead of failing the whole document.
#[derive(Debug, Clone, Copy)]
pub struct Yaml;

impl<M> Encoding<M> for Yaml
where
    M: DeserializeOwned + Send + 'static,
{
    const NAME: &'static str = "yaml";

    fn decode<'a>(
        input: DecodeInput<'a>,
        model: &'a mut M,
        errors: &'a mut Errors,
    ) -> BoxFuture<'a, ()> {
        match decode_yaml::<M>(input.request.body()) {
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

#[cfg(test)]
mod tests {
    use super::super::YamlBinding;
    use crate::context::MiddlewareContext;
    use crate::pipeline::Pipeline;
    use crate::types::{Request, Response};
    use bindery_core::Errors;
    use bytes::Bytes;
    use http_body_util::Full;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Settings {
        name: String,
        replicas: u16,
    }

    async fn bind(body: &'static str) -> MiddlewareContext {
        let pipeline = Pipeline::builder()
            .stage(YamlBinding::<Settings>::unvalidated())
            .build();
        let request: Request = http::Request::builder()
            .method("PUT")
            .header("content-type", "application/x-yaml")
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap();

        let mut ctx = MiddlewareContext::new();
        pipeline
            .process_with(&mut ctx, request, |_, _| {
                Box::pin(async { Response::new(Full::new(Bytes::new())) })
            })
            .await;
        ctx
    }

    #[tokio::test]
    async fn test_first_document_only() {
        let ctx = bind("name: api\nreplicas: 3\n---\nname: other\n").await;

        let settings = ctx.get_extension::<Settings>().unwrap();
        assert_eq!(settings.name, "api");
        assert_eq!(settings.replicas, 3);
        assert!(ctx.get_extension::<Errors>().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_body_is_not_an_error() {
        let ctx = bind("").await;
        assert!(ctx.get_extension::<Errors>().unwrap().is_empty());
        assert_eq!(ctx.get_extension::<Settings>().unwrap().replicas, 0);
    }

    #[tokio::test]
    async fn test_omitted_field_keeps_the_rest() {
        let ctx = bind("replicas: 2\n").await;

        let settings = ctx.get_extension::<Settings>().unwrap();
        assert_eq!(settings.name, "");
        assert_eq!(settings.replicas, 2);
        assert!(ctx.get_extension::<Errors>().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_type_mismatch() {
        let ctx = bind("name: api\nreplicas: many\n").await;
        let errors = ctx.get_extension::<Errors>().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(!errors[0].is_validation());
    }
}
