use std::borrow::Cow;

use axum::{
    body::Bytes,
    extract::rejection::BytesRejection,
    http::{Method, StatusCode},
    Json,
};
use validator::Validate;

use crate::error::RegistrationError;
use crate::schemas::{RegisterUserRequest, RegisterUserResponse};

pub async fn register(
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<RegisterUserResponse>), RegistrationError> {
    if method != Method::POST {
        tracing::debug!(%method, "registration rejected: method not allowed");
        return Err(RegistrationError::MethodNotAllowed);
    }

    // A body that could not be read fully is treated like one that could not be parsed
    let body = body.map_err(|e| {
        tracing::debug!(error = %e, "registration rejected: unreadable body");
        RegistrationError::MalformedInput
    })?;

    let payload = decode_payload(&body)?;

    payload.validate().map_err(|errors| {
        let err = RegistrationError::from(errors);
        tracing::debug!(reason = %err, "registration rejected: validation failed");
        err
    })?;

    tracing::debug!("registration accepted");

    Ok((StatusCode::CREATED, Json(RegisterUserResponse::registered())))
}

/// Decodes the first JSON value in `body`.
///
/// Trailing bytes after that value are ignored. A top-level `null` yields an
/// empty payload, which then fails field validation. Escapes of unpaired
/// UTF-16 surrogates decode as U+FFFD.
pub fn decode_payload(body: &[u8]) -> Result<RegisterUserRequest, RegistrationError> {
    let body = replace_lone_surrogates(body);
    let first = serde_json::Deserializer::from_slice(&body)
        .into_iter::<Option<RegisterUserRequest>>()
        .next();

    match first {
        Some(Ok(payload)) => Ok(payload.unwrap_or_default()),
        Some(Err(e)) => {
            tracing::debug!(error = %e, "registration rejected: invalid JSON");
            Err(RegistrationError::MalformedInput)
        }
        None => {
            tracing::debug!("registration rejected: empty body");
            Err(RegistrationError::MalformedInput)
        }
    }
}

/// Rewrites every `\uXXXX` escape naming an unpaired surrogate to `\ufffd`.
///
/// Escapes are consumed left to right, so an escaped backslash followed by
/// `u` is left alone. Returns the input unchanged when nothing is rewritten.
fn replace_lone_surrogates(body: &[u8]) -> Cow<'_, [u8]> {
    let mut rewritten: Option<Vec<u8>> = None;
    let mut i = 0;

    while i < body.len() {
        let (width, lone) = if body[i] != b'\\' {
            (1, false)
        } else {
            match unicode_escape(body, i) {
                Some(0xD800..=0xDBFF) => match unicode_escape(body, i + 6) {
                    Some(0xDC00..=0xDFFF) => (12, false),
                    _ => (6, true),
                },
                Some(0xDC00..=0xDFFF) => (6, true),
                Some(_) => (6, false),
                None => (2.min(body.len() - i), false),
            }
        };

        if lone {
            rewritten
                .get_or_insert_with(|| body[..i].to_vec())
                .extend_from_slice(br"\ufffd");
        } else if let Some(out) = rewritten.as_mut() {
            out.extend_from_slice(&body[i..i + width]);
        }
        i += width;
    }

    match rewritten {
        Some(out) => Cow::Owned(out),
        None => Cow::Borrowed(body),
    }
}

/// Code unit of a `\uXXXX` escape starting at `at`.
fn unicode_escape(body: &[u8], at: usize) -> Option<u16> {
    let escape = body.get(at..at + 6)?;
    let hex = escape.strip_prefix(br"\u")?;
    if !hex.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    u16::from_str_radix(std::str::from_utf8(hex).ok()?, 16).ok()
}
