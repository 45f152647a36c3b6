use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, post},
};

/// Admin Router Module
///
/// Defines the mutating routes, exclusively accessible to users with the
/// "Admin" role: creating and deleting users and transport requests.
///
/// Access Control:
/// This router is wrapped in two middleware layers by `create_router`: the
/// authentication layer resolves the user, then the admin layer rejects any
/// role but "Admin" with 403 before a handler runs.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // POST /api/users
        // Creates a regular user account. Duplicate emails are rejected by the
        // store's unique index and surface as 409.
        .route("/users", post(handlers::create_user))
        // DELETE /api/users/{id}
        .route("/users/{id}", delete(handlers::delete_user))
        // POST /api/trips
        // Submits a new transport request and logs a notification per driver.
        .route("/trips", post(handlers::create_trip))
        // DELETE /api/trips/{id}
        .route("/trips/{id}", delete(handlers::delete_trip))
}
