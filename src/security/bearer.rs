//! Bearer token extraction.
//!
//! Tokens are read from `Authorization: Bearer <token>` first, then from the
//! `access_token` query parameter. Only the URI is inspected, never the body,
//! so streaming uploads stay untouched.

use axum::http::{header, HeaderMap, Uri};
use jsonwebtoken::{DecodingKey, TokenData, Validation};
use serde::de::DeserializeOwned;

use crate::security::AuthError;

const BEARER_SCHEME: &str = "bearer";
const ACCESS_TOKEN_PARAM: &str = "access_token";

/// The raw token carried by the request.
pub fn access_token(headers: &HeaderMap, uri: &Uri) -> Result<String, AuthError> {
    let from_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            let (scheme, token) = value.trim().split_once(' ')?;
            scheme.eq_ignore_ascii_case(BEARER_SCHEME).then(|| token.trim())
        })
        .filter(|token| !token.is_empty());
    if let Some(token) = from_header {
        return Ok(token.to_string());
    }

    uri.query()
        .and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(name, value)| *name == ACCESS_TOKEN_PARAM && !value.is_empty())
        })
        .map(|(_, value)| value.into_owned())
        .ok_or(AuthError::NoTokenInRequest)
}

/// Extract and verify the JWT carried by the request.
pub fn parse_from_request<C: DeserializeOwned>(
    headers: &HeaderMap,
    uri: &Uri,
    key: &DecodingKey,
    validation: &Validation,
) -> Result<TokenData<C>, AuthError> {
    let token = access_token(headers, uri)?;
    jsonwebtoken::decode::<C>(&token, key, validation).map_err(|e| {
        tracing::warn!(error = %e, "Rejecting bearer token");
        AuthError::WrongAuthToken
    })
}
