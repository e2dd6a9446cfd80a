use crate::interface_adapters::handlers::generate_link_code;
use crate::interface_adapters::state::AppState;
use axum::{Router, routing::post};
use tower_http::cors::CorsLayer;

pub fn app(state: AppState) -> Router {
    // The issuing caller is a browser client on another origin.
    Router::new()
        .route("/generate-link-code", post(generate_link_code))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
