use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any client.
/// Everything else in the API sits behind the bearer-token middleware, so this
/// module is limited to the liveness probe and the token-issuing login endpoint.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated endpoint used for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // POST /login
        // Verifies credentials and issues the signed bearer token used on all
        // /api routes.
        .route("/login", post(handlers::login))
}
