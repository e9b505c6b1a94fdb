//! Bearer identity-token extraction shared by the authorizer endpoint and middleware.

use std::collections::HashMap;

use axum::http::{HeaderMap, header};

const BEARER_SCHEME: &str = "bearer";

/// Pull the identity token out of an `Authorization` header value.
///
/// - `Bearer <token>` (scheme is case-insensitive) and a bare `<token>` are both accepted
/// - blank values are treated as absent
pub fn parse_authorization(value: &str) -> Option<String> {
    let value = value.trim();
    let token = match value.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => rest,
        None if value.eq_ignore_ascii_case(BEARER_SCHEME) => "",
        _ => value,
    };

    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Identity token from an event header map (header names compared case-insensitively).
pub fn get_id_token(headers: &HashMap<String, String>) -> Option<String> {
    headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(header::AUTHORIZATION.as_str()))
        .and_then(|(_, value)| parse_authorization(value))
}

/// Identity token from live request headers.
pub fn id_token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_authorization)
}
