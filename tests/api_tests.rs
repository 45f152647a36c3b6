use fahrtdienst::{
    AppConfig, AppState, create_router,
    models::{ADMIN_ROLE, DEFAULT_ROLE, LoginResponse, Trip, User},
    repository::{Repository, RepositoryState, SqliteRepository},
};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;

const ADMIN_PASSWORD: &str = "root-pw";
const DRIVER_PASSWORD: &str = "driver-pw";

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
}

/// Boots the full router against a fresh in-memory database, seeded with one
/// admin ("root") and one regular user ("driver@example.com").
async fn spawn_app() -> TestApp {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite in tests");

    let sqlite_repo = SqliteRepository::new(pool);
    sqlite_repo.init_schema().await.expect("schema");

    let admin = User::new("root", "root", ADMIN_PASSWORD, ADMIN_ROLE).unwrap();
    sqlite_repo.create_user(admin).await.unwrap();
    let driver = User::new("driver@example.com", "Driver", DRIVER_PASSWORD, DEFAULT_ROLE).unwrap();
    sqlite_repo.create_user(driver).await.unwrap();

    let repo = Arc::new(sqlite_repo) as RepositoryState;
    let config = AppConfig::default();

    let state = AppState { repo, config };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address }
}

async fn login(client: &reqwest::Client, app: &TestApp, email: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/login", app.address))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(response.status(), 200);

    let body: LoginResponse = response.json().await.unwrap();
    body.token
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_login_returns_name_and_token() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/login", app.address))
        .json(&serde_json::json!({ "email": "driver@example.com", "password": DRIVER_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: LoginResponse = response.json().await.unwrap();
    assert_eq!(body.name, "Driver");
    assert!(!body.token.is_empty());
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    // Wrong password.
    let response = client
        .post(format!("{}/login", app.address))
        .json(&serde_json::json!({ "email": "driver@example.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    // Unknown email looks the same from the outside.
    let response = client
        .post(format!("{}/login", app.address))
        .json(&serde_json::json!({ "email": "ghost@example.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_login_rejects_malformed_json() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/login", app.address))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_api_requires_bearer_token() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/trips", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = client
        .get(format!("{}/api/trips", app.address))
        .header("Authorization", "Bearer not-a-real-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_mutations_are_admin_only() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let driver_token = login(&client, &app, "driver@example.com", DRIVER_PASSWORD).await;

    // A regular user can read...
    let response = client
        .get(format!("{}/api/trips", app.address))
        .bearer_auth(&driver_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // ...but not create or delete.
    let response = client
        .post(format!("{}/api/trips", app.address))
        .bearer_auth(&driver_token)
        .json(&serde_json::json!({ "description": "Not allowed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let response = client
        .delete(format!("{}/api/users/1", app.address))
        .bearer_auth(&driver_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_trip_lifecycle() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let admin_token = login(&client, &app, "root", ADMIN_PASSWORD).await;
    let driver_token = login(&client, &app, "driver@example.com", DRIVER_PASSWORD).await;

    // Admin creates a trip.
    let response = client
        .post(format!("{}/api/trips", app.address))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({ "description": "Pickup at the clinic" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let trip: Trip = response.json().await.unwrap();
    assert!(trip.accepted_by.is_none());

    // Driver claims it.
    let response = client
        .patch(format!("{}/api/trips/{}/claim", app.address, trip.id))
        .bearer_auth(&driver_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let claimed: Trip = response.json().await.unwrap();
    assert_eq!(claimed.accepted_by.as_deref(), Some("Driver"));
    assert!(claimed.accepted_at.is_some());

    // A second claim is a conflict, even by an admin.
    let response = client
        .patch(format!("{}/api/trips/{}/claim", app.address, trip.id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    // The listing reflects the claim.
    let response = client
        .get(format!("{}/api/trips", app.address))
        .bearer_auth(&driver_token)
        .send()
        .await
        .unwrap();
    let trips: Vec<Trip> = response.json().await.unwrap();
    assert!(
        trips
            .iter()
            .any(|t| t.id == trip.id && t.accepted_by.as_deref() == Some("Driver"))
    );

    // Admin deletes it; a repeat delete is a 404.
    let response = client
        .delete(format!("{}/api/trips/{}", app.address, trip.id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let response = client
        .delete(format!("{}/api/trips/{}", app.address, trip.id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_claiming_unknown_trip_is_not_found() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let driver_token = login(&client, &app, "driver@example.com", DRIVER_PASSWORD).await;

    let response = client
        .patch(format!("{}/api/trips/4711/claim", app.address))
        .bearer_auth(&driver_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_user_management_flow() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let admin_token = login(&client, &app, "root", ADMIN_PASSWORD).await;

    // Admin creates a user; the role is forced to "User".
    let response = client
        .post(format!("{}/api/users", app.address))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({
            "email": "new@example.com", "password": "new-pw", "name": "Newcomer"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let created: User = response.json().await.unwrap();
    assert_eq!(created.role, DEFAULT_ROLE);

    // Duplicate email is rejected.
    let response = client
        .post(format!("{}/api/users", app.address))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({
            "email": "new@example.com", "password": "other", "name": "Copycat"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    // The new user can log in.
    let response = client
        .post(format!("{}/login", app.address))
        .json(&serde_json::json!({ "email": "new@example.com", "password": "new-pw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // The listing never exposes password material.
    let response = client
        .get(format!("{}/api/users", app.address))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let users: serde_json::Value = response.json().await.unwrap();
    assert!(users.as_array().unwrap().len() >= 3);
    assert!(!users.to_string().contains("password_hash"));

    // Admin deletes the user; their token would stop working on next use.
    let response = client
        .delete(format!("{}/api/users/{}", app.address, created.id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);
}

#[tokio::test]
async fn test_deleted_user_token_stops_authenticating() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let admin_token = login(&client, &app, "root", ADMIN_PASSWORD).await;

    let response = client
        .post(format!("{}/api/users", app.address))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({
            "email": "shortlived@example.com", "password": "pw", "name": "Shortlived"
        }))
        .send()
        .await
        .unwrap();
    let created: User = response.json().await.unwrap();

    let user_token = login(&client, &app, "shortlived@example.com", "pw").await;

    client
        .delete(format!("{}/api/users/{}", app.address, created.id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();

    // The signature is still valid, but the email no longer resolves.
    let response = client
        .get(format!("{}/api/trips", app.address))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}
