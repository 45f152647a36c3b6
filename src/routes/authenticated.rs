use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch},
};

/// Authenticated Router Module
///
/// Defines the routes accessible to any user who has successfully passed the
/// authentication layer: read access to both resources and claiming a trip.
///
/// Every handler here relies on the `AuthUser` extractor middleware being
/// present on the router layer above this module, which guarantees a validated
/// user record is available (claiming attributes the trip to its display name).
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /api/users
        // Lists all registered users (password hashes never serialize).
        .route("/users", get(handlers::list_users))
        // GET /api/trips
        // Lists all transport requests, claimed and unclaimed.
        .route("/trips", get(handlers::list_trips))
        // PATCH /api/trips/{id}/claim
        // Claims an open transport request for the requesting user. First
        // claim wins; later attempts get 409.
        .route("/trips/{id}/claim", patch(handlers::claim_trip))
}
