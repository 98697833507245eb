pub mod conditional;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;

pub use state::{ApiState, GreetingCounter, HttpCachePolicy};

use axum::{
    Router, middleware as axum_middleware,
    routing::get,
};

/// `/api` routes. Item routes sit behind the bearer-token gate; greeting and health are public.
pub fn build_api_router(state: ApiState) -> Router {
    let items = Router::new()
        .route(
            "/api/items",
            get(handlers::list_items).post(handlers::create_item),
        )
        .route(
            "/api/items/{id}",
            get(handlers::get_item)
                .put(handlers::update_item)
                .delete(handlers::delete_item),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_principal,
        ));

    Router::new()
        .route("/api/greeting", get(handlers::greeting))
        .route("/api/health", get(handlers::health))
        .merge(items)
        .with_state(state)
}
