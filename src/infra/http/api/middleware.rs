use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use crate::application::auth::{AuthError, ITEM_AUTHORITIES};

use super::error::ApiError;
use super::state::ApiState;

/// Admits requests whose bearer token names a usable account holding an item authority.
pub async fn require_principal(
    State(state): State<ApiState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = extract_token(request.headers().get(header::AUTHORIZATION)) else {
        return ApiError::from(AuthError::MissingToken).into_response();
    };

    let principal = match state.auth.authenticate(token).await {
        Ok(principal) => principal,
        Err(err) => {
            debug!(target = "primer::api::auth", error = %err, "rejected bearer token");
            return ApiError::from(err).into_response();
        }
    };

    if let Err(err) = principal.require_any(&ITEM_AUTHORITIES) {
        return ApiError::from(err).into_response();
    }

    request.extensions_mut().insert(principal.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(principal);
    response
}

fn extract_token(header: Option<&HeaderValue>) -> Option<&str> {
    let raw = header?.to_str().ok()?;
    let bearer = raw.strip_prefix("Bearer ")?.trim();
    (!bearer.is_empty()).then_some(bearer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_prefix_is_required() {
        let value = HeaderValue::from_static("Bearer abc.def.ghi");
        assert_eq!(extract_token(Some(&value)), Some("abc.def.ghi"));

        let basic = HeaderValue::from_static("Basic dXNlcjpwYXNz");
        assert_eq!(extract_token(Some(&basic)), None);

        let empty = HeaderValue::from_static("Bearer   ");
        assert_eq!(extract_token(Some(&empty)), None);
        assert_eq!(extract_token(None), None);
    }
}
