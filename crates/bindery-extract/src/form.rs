//! URL-encoded form decoding.
//!
//! A form is read from two places: the request body, for `POST`, `PUT` and
//! `PATCH` requests sent as `application/x-www-form-urlencoded`, and the URL
//! query string. Body pairs come first; query pairs are appended after them
//! under the same keys.
//!
//! Decoding is lenient. A malformed pair is dropped and reported, the
//! remaining pairs are still collected, and only the first error is kept.
//! Invalid UTF-8, raw or percent-encoded, is replaced with U+FFFD rather
//! than reported.

use crate::{ExtractionContext, ExtractionError, ExtractionSource};
use bindery_core::FormValues;
use http::Method;

/// Default ceiling for url-encoded bodies (10 MiB).
pub const DEFAULT_MAX_FORM_SIZE: u64 = 10 << 20;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Collects body and query pairs into one [`FormValues`].
///
/// The values are always returned; the error, if any, is the first problem
/// encountered.
///
/// # Example
///
/// ```rust
/// use bindery_extract::{parse_form, ExtractionContext, DEFAULT_MAX_FORM_SIZE};
/// use http::Method;
///
/// let ctx = ExtractionContext::builder()
///     .method(Method::POST)
///     .uri("/login?next=%2Fhome".parse().unwrap())
///     .header("content-type", "application/x-www-form-urlencoded")
///     .body("user=logan&remember=on")
///     .build();
///
/// let (values, error) = parse_form(&ctx, DEFAULT_MAX_FORM_SIZE);
/// assert!(error.is_none());
/// assert_eq!(values.first("user"), Some("logan"));
/// assert_eq!(values.first("next"), Some("/home"));
/// ```
pub fn parse_form(
    ctx: &ExtractionContext,
    max_size: u64,
) -> (FormValues, Option<ExtractionError>) {
    let mut values = FormValues::new();
    let mut first_error = None;

    if accepts_body(ctx.method()) {
        if let Err(err) = parse_body(ctx, max_size, &mut values) {
            first_error = Some(err);
        }
    }

    if let Some(query) = ctx.query_string() {
        if let Err(err) = parse_pairs(query, ExtractionSource::Query, &mut values) {
            first_error.get_or_insert(err);
        }
    }

    (values, first_error)
}

fn accepts_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}

fn parse_body(
    ctx: &ExtractionContext,
    max_size: u64,
    values: &mut FormValues,
) -> Result<(), ExtractionError> {
    let Some(content_type) = ctx.content_type() else {
        return Ok(());
    };
    let mime: mime::Mime = content_type
        .parse()
        .map_err(|e| ExtractionError::invalid_content_type(content_type, e))?;
    if mime.essence_str() != FORM_URLENCODED {
        return Ok(());
    }

    let body = ctx.body();
    if body.len() as u64 > max_size {
        return Err(ExtractionError::payload_too_large(
            ExtractionSource::Body,
            max_size,
        ));
    }

    let text = String::from_utf8_lossy(body);
    parse_pairs(&text, ExtractionSource::Body, values)
}

/// Parses `&`-separated pairs, keeping the well-formed ones.
fn parse_pairs(
    input: &str,
    source: ExtractionSource,
    values: &mut FormValues,
) -> Result<(), ExtractionError> {
    let mut first_error = None;

    for segment in input.split('&') {
        if segment.is_empty() {
            continue;
        }
        if segment.contains(';') {
            first_error.get_or_insert_with(|| {
                ExtractionError::malformed(source, "invalid semicolon separator in query")
            });
            continue;
        }
        if let Err(escape) = check_escapes(segment) {
            first_error.get_or_insert_with(|| {
                ExtractionError::malformed(source, format!("invalid URL escape {escape:?}"))
            });
            continue;
        }

        match serde_urlencoded::from_str::<Vec<(String, String)>>(segment) {
            Ok(pairs) => {
                for (key, value) in pairs {
                    values.append(key, value);
                }
            }
            Err(e) => {
                first_error
                    .get_or_insert_with(|| ExtractionError::deserialization_failed(source, e));
            }
        }
    }

    first_error.map_or(Ok(()), Err)
}

/// Returns the offending escape if a `%` is not followed by two hex digits.
///
/// `serde_urlencoded` passes such escapes through verbatim, so they are
/// caught here first.
fn check_escapes(segment: &str) -> Result<(), String> {
    let bytes = segment.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                let end = (i + 3).min(bytes.len());
                return Err(String::from_utf8_lossy(&bytes[i..end]).into_owned());
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}
