//! `If-None-Match` / `If-Match` handling and cacheable response assembly.

use axum::Json;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use primer_api_types::HAL_JSON;
use serde::Serialize;

use crate::application::fingerprint::{Fingerprint, first_entity_tag};

use super::state::HttpCachePolicy;

/// First entity tag of `If-None-Match`, if any.
pub fn if_none_match(headers: &HeaderMap) -> Option<&str> {
    first_tag(headers, header::IF_NONE_MATCH)
}

/// First entity tag of `If-Match`, if any.
pub fn if_match(headers: &HeaderMap) -> Option<&str> {
    first_tag(headers, header::IF_MATCH)
}

fn first_tag(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(first_entity_tag)
}

/// `304` when the client already holds `fingerprint`, otherwise the full HAL body.
pub fn respond_conditionally<T: Serialize>(
    headers: &HeaderMap,
    fingerprint: &Fingerprint,
    policy: HttpCachePolicy,
    body: impl FnOnce() -> T,
) -> Response {
    if fingerprint.matches(if_none_match(headers)) {
        let mut response = StatusCode::NOT_MODIFIED.into_response();
        apply_cache_headers(&mut response, fingerprint, policy);
        return response;
    }

    let mut response = (StatusCode::OK, Json(body())).into_response();
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(HAL_JSON));
    apply_cache_headers(&mut response, fingerprint, policy);
    response
}

fn apply_cache_headers(response: &mut Response, fingerprint: &Fingerprint, policy: HttpCachePolicy) {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&fingerprint.header_value()) {
        headers.insert(header::ETAG, value);
    }
    if let Ok(value) = HeaderValue::from_str(&policy.header_value()) {
        headers.insert(header::CACHE_CONTROL, value);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    const POLICY: HttpCachePolicy = HttpCachePolicy {
        max_age: Duration::from_secs(2_592_000),
    };

    #[test]
    fn matching_tag_short_circuits() {
        let fingerprint = Fingerprint::of_version(0);
        let mut headers = HeaderMap::new();
        headers.insert(
            header::IF_NONE_MATCH,
            HeaderValue::from_str(&format!("{}, \"other\"", fingerprint.header_value())).unwrap(),
        );

        let response = respond_conditionally(&headers, &fingerprint, POLICY, || -> &'static str {
            panic!("body must not be built")
        });
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    }

    #[test]
    fn fresh_response_carries_cache_headers() {
        let fingerprint = Fingerprint::of_version(3);
        let response = respond_conditionally(&HeaderMap::new(), &fingerprint, POLICY, || "body");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ETAG],
            fingerprint.header_value().as_str()
        );
        assert_eq!(response.headers()[header::CACHE_CONTROL], "max-age=2592000");
        assert_eq!(response.headers()[header::CONTENT_TYPE], HAL_JSON);
    }
}
