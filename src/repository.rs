use crate::models::{Trip, User};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, so handlers
/// interact with the data layer without knowing the concrete implementation
/// (SQLite in production, mocks in tests).
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Trips ---
    async fn list_trips(&self) -> Result<Vec<Trip>, sqlx::Error>;
    async fn get_trip(&self, id: i64) -> Result<Option<Trip>, sqlx::Error>;
    async fn create_trip(&self, description: &str) -> Result<Trip, sqlx::Error>;
    /// Marks a trip as accepted by `acceptor` at the current time. Both fields
    /// are set by one conditional UPDATE, so a trip can only ever be claimed
    /// once and the acceptor fields are always set together. Returns `None` if
    /// the trip does not exist or is already claimed.
    async fn claim_trip(&self, id: i64, acceptor: &str) -> Result<Option<Trip>, sqlx::Error>;
    /// Returns true if a row was deleted.
    async fn delete_trip(&self, id: i64) -> Result<bool, sqlx::Error>;

    // --- Users ---
    async fn list_users(&self) -> Result<Vec<User>, sqlx::Error>;
    /// Lookup by email, the identity embedded in tokens.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    /// Inserts the user (id is ignored) and returns the stored record.
    /// A duplicate email surfaces as a database error carrying the unique
    /// constraint violation.
    async fn create_user(&self, user: User) -> Result<User, sqlx::Error>;
    async fn delete_user(&self, id: i64) -> Result<bool, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

const TRIP_COLUMNS: &str = "id, description, created_at, accepted_by, accepted_at, finished";

/// SqliteRepository
///
/// The concrete implementation of the `Repository` trait, backed by SQLite.
/// Timestamps are stored as unix seconds (INTEGER columns) and decoded into
/// `DateTime<Utc>` by sqlx.
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// init_schema
    ///
    /// Creates the table pair and the email uniqueness index if they do not
    /// exist. Safe to run on every startup.
    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL,
                name TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS users_email_unique ON users (email)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS trips (
                id INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
                accepted_by TEXT,
                accepted_at INTEGER,
                finished BOOLEAN NOT NULL DEFAULT 0
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn list_trips(&self) -> Result<Vec<Trip>, sqlx::Error> {
        sqlx::query_as::<_, Trip>(&format!("SELECT {TRIP_COLUMNS} FROM trips"))
            .fetch_all(&self.pool)
            .await
    }

    async fn get_trip(&self, id: i64) -> Result<Option<Trip>, sqlx::Error> {
        sqlx::query_as::<_, Trip>(&format!("SELECT {TRIP_COLUMNS} FROM trips WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create_trip(&self, description: &str) -> Result<Trip, sqlx::Error> {
        sqlx::query_as::<_, Trip>(&format!(
            "INSERT INTO trips (description, created_at, finished) VALUES (?1, ?2, 0)
             RETURNING {TRIP_COLUMNS}"
        ))
        .bind(description)
        .bind(Utc::now().timestamp())
        .fetch_one(&self.pool)
        .await
    }

    /// The `accepted_by IS NULL` guard makes the claim first-writer-wins: a
    /// concurrent or repeated claim matches no row and returns `None`.
    async fn claim_trip(&self, id: i64, acceptor: &str) -> Result<Option<Trip>, sqlx::Error> {
        sqlx::query_as::<_, Trip>(&format!(
            "UPDATE trips SET accepted_by = ?1, accepted_at = ?2
             WHERE id = ?3 AND accepted_by IS NULL
             RETURNING {TRIP_COLUMNS}"
        ))
        .bind(acceptor)
        .bind(Utc::now().timestamp())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_trip(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM trips WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_users(&self) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT id, email, name, password_hash, role FROM users")
            .fetch_all(&self.pool)
            .await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, name, password_hash, role FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_user(&self, user: User) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (email, name, password_hash, role) VALUES (?1, ?2, ?3, ?4)
             RETURNING id, email, name, password_hash, role",
        )
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(&user.role)
        .fetch_one(&self.pool)
        .await
    }

    async fn delete_user(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
