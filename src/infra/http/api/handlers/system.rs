use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use primer_api_types::Greeting;

use super::GreetingQuery;
use crate::infra::http::api::error::{ApiError, codes};
use crate::infra::http::api::state::ApiState;

const DEFAULT_GREETING_NAME: &str = "World from backend!";

pub async fn greeting(
    State(state): State<ApiState>,
    Query(query): Query<GreetingQuery>,
) -> Json<Greeting> {
    let name = query
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_GREETING_NAME);

    Json(Greeting {
        id: state.greetings.next(),
        content: format!("Hello, {name}!"),
    })
}

pub async fn health(State(state): State<ApiState>) -> Response {
    match state.health.health_check().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::UNAVAILABLE,
            "Service temporarily unavailable",
        )
        .with_detail(err.to_string())
        .into_response(),
    }
}
