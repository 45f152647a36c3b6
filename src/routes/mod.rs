/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules,
/// so access control is applied explicitly at the module level (via Axum
/// layers) instead of per-handler.
///
/// The three modules map directly to the access tiers of the API.

/// Routes accessible to anonymous clients: liveness and login.
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware.
/// Requires a valid bearer token.
pub mod authenticated;

/// Routes restricted to users with the "Admin" role.
/// Layered behind both the authentication and the admin middleware.
pub mod admin;
