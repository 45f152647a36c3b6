use clap::Parser;
use fahrtdienst::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    models::{ADMIN_ROLE, User},
    repository::{RepositoryState, SqliteRepository},
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command line options for the server binary.
#[derive(Parser, Debug)]
#[command(about = "Patient transport dispatch API server")]
struct Cli {
    /// Create the schema's root admin account before serving.
    #[arg(long)]
    seed: bool,
}

/// main
///
/// The asynchronous entry point for the application, responsible for
/// initializing all core components: configuration, logging, database, and the
/// HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (fail-fast)
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // Prioritizes RUST_LOG, falling back to sensible defaults for local use.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fahrtdienst=debug,tower_http=info,axum=trace".into());

    // 3. Initialize logging based on environment: pretty output for humans
    // locally, JSON for log aggregators in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Database Initialization (SQLite)
    let options = SqliteConnectOptions::new()
        .filename(&config.db_path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .expect("FATAL: Failed to open SQLite database. Check DATABASE.");

    let sqlite_repo = SqliteRepository::new(pool);

    // The schema statements are idempotent; run them on every startup.
    sqlite_repo
        .init_schema()
        .await
        .expect("FATAL: Failed to create database schema.");

    // 5. Optional Admin Seeding
    if cli.seed {
        seed_root_admin(&sqlite_repo, &config).await;
    }

    // Wrap the repository in an Arc for thread-safe sharing.
    let repo = Arc::new(sqlite_repo) as RepositoryState;

    // 6. Unified State Assembly
    let app_state = AppState { repo, config };

    // 7. Router and Server Startup
    let bind_addr = app_state.config.bind_addr.clone();
    let app = create_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind listen address. Check ADDR.");

    tracing::info!("HTTP server bound successfully.");
    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app).await.unwrap();
}

/// seed_root_admin
///
/// Creates the "root" admin account if it does not exist yet. Requires
/// ADMIN_PASSWORD to be set; runs only when the binary is started with --seed.
async fn seed_root_admin(repo: &SqliteRepository, config: &AppConfig) {
    use fahrtdienst::repository::Repository;

    let existing = repo
        .get_user_by_email("root")
        .await
        .expect("FATAL: Failed to query users during seeding.");

    if existing.is_some() {
        tracing::info!("Root admin already present, skipping seed.");
        return;
    }

    let password = config
        .admin_password
        .as_deref()
        .expect("FATAL: ADMIN_PASSWORD must be set when seeding.");

    let admin = User::new("root", "root", password, ADMIN_ROLE)
        .expect("FATAL: Failed to hash the admin password.");

    repo.create_user(admin)
        .await
        .expect("FATAL: Failed to create the root admin.");

    tracing::info!("Seeded root admin account.");
}
