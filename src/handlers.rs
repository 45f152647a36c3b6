use crate::{
    AppState,
    auth::{self, AuthUser},
    error::ApiError,
    models::{
        ADMIN_ROLE, CreateTripRequest, CreateUserRequest, DEFAULT_ROLE, LoginRequest,
        LoginResponse, Trip, User,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

// --- Handlers ---

/// login
///
/// [Public Route] Exchanges email + password for a signed bearer token.
///
/// An unknown email and a wrong password are indistinguishable to the caller:
/// both yield 401.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Bad Credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .repo
        .get_user_by_email(&payload.email)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !user.verify_password(&payload.password) {
        return Err(ApiError::Unauthorized);
    }

    let token = auth::issue_token(&user.email, &state.config.jwt_secret)?;

    Ok(Json(LoginResponse {
        name: user.name,
        token,
    }))
}

/// list_users
///
/// [Authenticated Route] Lists all registered users. Password hashes are
/// excluded by the model's serialization.
#[utoipa::path(
    get,
    path = "/api/users",
    responses((status = 200, description = "All users", body = [User]))
)]
pub async fn list_users(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.repo.list_users().await?;
    Ok(Json(users))
}

/// create_user
///
/// [Admin Route] Creates a regular user. The role is always "User"; admins can
/// only be created through seeding.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Created", body = User),
        (status = 409, description = "Email Already Registered")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = User::new(&payload.email, &payload.name, &payload.password, DEFAULT_ROLE)?;

    let created = state.repo.create_user(user).await.map_err(|e| match &e {
        // The unique index on email rejects duplicates at the store.
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiError::Conflict("email already registered".to_string())
        }
        _ => ApiError::from(e),
    })?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// delete_user
///
/// [Admin Route] Deletes a user by id. Tokens already issued for the deleted
/// user stop authenticating on their next request, since every request
/// re-resolves the email against the store.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.repo.delete_user(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

/// list_trips
///
/// [Authenticated Route] Lists all transport requests, claimed and unclaimed.
#[utoipa::path(
    get,
    path = "/api/trips",
    responses((status = 200, description = "All trips", body = [Trip]))
)]
pub async fn list_trips(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Trip>>, ApiError> {
    let trips = state.repo.list_trips().await?;
    Ok(Json(trips))
}

/// create_trip
///
/// [Admin Route] Submits a new transport request and notifies the drivers.
/// Notification is a structured log line per non-admin user; there is no mail
/// transport wired up.
#[utoipa::path(
    post,
    path = "/api/trips",
    request_body = CreateTripRequest,
    responses((status = 201, description = "Created", body = Trip))
)]
pub async fn create_trip(
    State(state): State<AppState>,
    Json(payload): Json<CreateTripRequest>,
) -> Result<(StatusCode, Json<Trip>), ApiError> {
    let trip = state.repo.create_trip(&payload.description).await?;

    let users = state.repo.list_users().await?;
    for user in users.iter().filter(|u| u.role != ADMIN_ROLE) {
        tracing::info!(
            email = %user.email,
            trip_id = trip.id,
            description = %trip.description,
            "notifying driver of new transport request"
        );
    }

    Ok((StatusCode::CREATED, Json(trip)))
}

/// claim_trip
///
/// [Authenticated Route] Claims an open transport request for the requesting
/// user. The acceptor name and acceptance time are set together by a single
/// conditional update, so a trip can be claimed exactly once.
#[utoipa::path(
    patch,
    path = "/api/trips/{id}/claim",
    params(("id" = i64, Path, description = "Trip ID")),
    responses(
        (status = 200, description = "Claimed", body = Trip),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Already Claimed")
    )
)]
pub async fn claim_trip(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Trip>, ApiError> {
    match state.repo.claim_trip(id, &auth_user.name).await? {
        Some(trip) => Ok(Json(trip)),
        // Distinguish "no such trip" from "lost the race / already claimed".
        None => match state.repo.get_trip(id).await? {
            Some(_) => Err(ApiError::Conflict("trip already claimed".to_string())),
            None => Err(ApiError::NotFound),
        },
    }
}

/// delete_trip
///
/// [Admin Route] Deletes a transport request by id, claimed or not.
#[utoipa::path(
    delete,
    path = "/api/trips/{id}",
    params(("id" = i64, Path, description = "Trip ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_trip(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.repo.delete_trip(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
