use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Role string stored for administrators. Everything else is a regular user.
pub const ADMIN_ROLE: &str = "Admin";

/// Role assigned to users created through the admin endpoint.
pub const DEFAULT_ROLE: &str = "User";

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// Canonical identity record stored in the `users` table. The password hash is
/// kept alongside the identity so the login handler can verify credentials in a
/// single lookup, but it never leaves the process: serialization skips it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct User {
    pub id: i64,
    // Unique login identifier (enforced by a unique index in the store).
    pub email: String,
    // Display name, used as the acceptor name when claiming trips.
    pub name: String,
    /// bcrypt hash of the password. Excluded from all JSON output.
    #[serde(skip)]
    pub password_hash: String,
    // The RBAC field: "Admin" or "User".
    pub role: String,
}

impl User {
    /// Builds a new user record with a freshly computed bcrypt hash.
    /// The id is assigned by the store on insert.
    pub fn new(
        email: &str,
        name: &str,
        password: &str,
        role: &str,
    ) -> Result<Self, bcrypt::BcryptError> {
        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
        Ok(Self {
            id: 0,
            email: email.to_string(),
            name: name.to_string(),
            password_hash,
            role: role.to_string(),
        })
    }

    /// Checks a candidate password against the stored hash.
    /// Any bcrypt error (e.g. a corrupted hash) counts as a failed check.
    pub fn verify_password(&self, password: &str) -> bool {
        bcrypt::verify(password, &self.password_hash).unwrap_or(false)
    }
}

/// Trip
///
/// A patient transport request ("Krankenfahrt") from the `trips` table.
/// A trip starts unclaimed; claiming sets `accepted_by` and `accepted_at`
/// together, exactly once. `finished` exists in the schema and wire format but
/// no handler currently sets it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: i64,
    pub description: String,
    // Stored as unix seconds in SQLite, serialized as RFC 3339.
    pub created_at: DateTime<Utc>,
    // Display name of the claiming user. Set together with `accepted_at`.
    pub accepted_by: Option<String>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub finished: bool,
}

// --- Request Payloads (Input Schemas) ---

/// LoginRequest
///
/// Input payload for POST /login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// CreateUserRequest
///
/// Input payload for the admin user-creation endpoint (POST /api/users).
/// The role is not part of the payload; created users are always regular users.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// CreateTripRequest
///
/// Input payload for submitting a new transport request (POST /api/trips).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CreateTripRequest {
    pub description: String,
}

// --- Response Payloads (Output Schemas) ---

/// LoginResponse
///
/// Output of a successful login: the user's display name and a signed bearer
/// token for the `Authorization` header.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct LoginResponse {
    pub name: String,
    pub token: String,
}
