//! HTTP Basic credential checks.
//!
//! # Responsibilities
//! - Parse `Authorization: Basic <base64(id:key)>`
//! - Look the id up in the registered applications
//! - Compare keys without early exit
//!
//! # Design Decisions
//! - Scheme token is case-insensitive, credentials are not
//! - A missing header is an authentication failure, not a parse error

use axum::http::{header, HeaderMap};
use base64::{engine::general_purpose, Engine as _};

use crate::security::applications::{Application, Applications};
use crate::security::AuthError;

const BASIC_SCHEME: &str = "Basic";

/// Validate the Basic credentials in `headers` against `apps`.
pub fn authenticate(headers: &HeaderMap, apps: &Applications) -> Result<Application, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::AuthFailed)?;
    let value = value.to_str().map_err(|_| AuthError::WrongAuthToken)?;

    let (id, key) = parse_basic(value)?;

    let app = apps.find_by_id(&id)?;
    if constant_time_eq(app.key.as_bytes(), &key) {
        Ok(app)
    } else {
        Err(AuthError::AuthFailed)
    }
}

/// Split a Basic authorization value into (id, key).
fn parse_basic(value: &str) -> Result<(String, Vec<u8>), AuthError> {
    let value = value.trim();
    let (scheme, token) = value.split_once(' ').unwrap_or((value, ""));
    if !scheme.eq_ignore_ascii_case(BASIC_SCHEME) {
        return Err(AuthError::UnsupportedAuthScheme);
    }

    let decoded = general_purpose::STANDARD
        .decode(token.trim())
        .map_err(|e| {
            tracing::warn!(error = %e, "Decoding authentication token");
            AuthError::WrongAuthToken
        })?;

    let separator = decoded
        .iter()
        .position(|b| *b == b':')
        .ok_or(AuthError::WrongAuthToken)?;
    let (id, key) = decoded.split_at(separator);
    let id = String::from_utf8(id.to_vec()).map_err(|_| AuthError::WrongAuthToken)?;

    Ok((id, key[1..].to_vec()))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
