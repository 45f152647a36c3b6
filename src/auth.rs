use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::{config::AppConfig, error::ApiError, repository::RepositoryState};

/// Claims
///
/// The payload carried inside every issued JWT. The token identifies the user
/// by email; the current role is looked up from the store on every request, so
/// a role change or deletion takes effect immediately.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Email of the authenticated user, re-resolved against the store on every
    /// request.
    pub mail: String,
    /// Numeric expiry field kept for wire compatibility with existing clients.
    /// This is not a registered `exp` claim and does not expire the token.
    #[serde(rename = "expiresAt")]
    pub expires_at: u64,
}

/// Value written into the `expiresAt` claim of every issued token.
const CLAIM_EXPIRES_AT: u64 = 15_000;

/// issue_token
///
/// Signs a compact HS256 token for the given email. Called by the login handler
/// after the password check succeeds.
pub fn issue_token(email: &str, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        mail: email.to_string(),
        expires_at: CLAIM_EXPIRES_AT,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// AuthUser
///
/// The resolved identity of an authenticated request: the live user record as
/// it exists in the store at request time. Handlers use this to attribute
/// actions (claiming uses `name`) and the admin middleware checks `role`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a
/// function argument in any authenticated handler and inside the middleware
/// chain. The flow:
///
/// 1. Extract the `Authorization: Bearer <token>` header.
/// 2. Decode and validate the token (HS256 only, signature checked).
/// 3. Re-resolve the embedded email against the users table.
///
/// Rejection: 401 Unauthorized on any failure, including a token whose email
/// no longer maps to a user (deleted after issuance).
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized)?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        // Pin the algorithm so a token signed with anything but HS256 is
        // rejected regardless of its header. No registered claim is required
        // (issued tokens carry none), but a present-and-expired `exp` still
        // fails validation.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = true;

        let token_data = match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(data) => data,
            Err(e) => {
                return match e.kind() {
                    // Most common failure for a valid-but-old token.
                    ErrorKind::ExpiredSignature => Err(ApiError::Unauthorized),
                    // Bad signature, malformed token, algorithm mismatch, etc.
                    _ => Err(ApiError::Unauthorized),
                };
            }
        };

        // Final verification against the store. A syntactically valid token for
        // a deleted user must not authenticate.
        let user = repo
            .get_user_by_email(&token_data.claims.mail)
            .await
            .map_err(|_| ApiError::Unauthorized)?
            .ok_or(ApiError::Unauthorized)?;

        Ok(AuthUser {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        })
    }
}
