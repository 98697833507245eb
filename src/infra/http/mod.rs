pub mod api;
mod middleware;

pub use api::{ApiState, GreetingCounter, HttpCachePolicy};
pub use middleware::RequestContext;

use axum::{Router, middleware as axum_middleware};

/// Full application router: the `/api` routes wrapped in request logging and a request id.
pub fn build_router(state: ApiState) -> Router {
    api::build_api_router(state)
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}
