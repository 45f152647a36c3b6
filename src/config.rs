use std::env;

/// AppConfig
///
/// Holds the application's entire configuration state, loaded once at startup
/// and immutable from then on. It is shared through the application state via
/// FromRef so the auth extractor can reach the signing secret.
#[derive(Clone)]
pub struct AppConfig {
    // Path of the SQLite database file.
    pub db_path: String,
    // Address the HTTP server binds to.
    pub bind_addr: String,
    // Secret key used to sign and validate JWTs.
    pub jwt_secret: String,
    // Password for the seeded root admin. Only needed when running with --seed.
    pub admin_password: Option<String>,
    // Runtime environment marker. Controls the log output format.
    pub env: Env,
}

/// Env
///
/// Defines the runtime context, used to switch between human-readable log
/// output (local) and JSON log output for aggregators (production).
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Provides a safe, non-panicking AppConfig instance primarily used for
    /// test setup, without requiring any environment variables.
    fn default() -> Self {
        Self {
            db_path: ":memory:".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            jwt_secret: "super-secure-test-secret-value-local".to_string(),
            admin_password: None,
            env: Env::Local,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// The canonical function for initializing the application configuration at
    /// startup. Reads all parameters from environment variables.
    ///
    /// # Panics
    /// Panics if a variable required for the current runtime environment is not
    /// set, so the process never starts with an incomplete configuration.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        // The production secret is mandatory and must be explicitly set.
        let jwt_secret = match env {
            Env::Production => {
                env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production.")
            }
            _ => env::var("JWT_SECRET")
                .unwrap_or_else(|_| "super-secure-test-secret-value-local".to_string()),
        };

        Self {
            db_path: env::var("DATABASE").expect("FATAL: DATABASE (sqlite path) must be set."),
            bind_addr: env::var("ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            jwt_secret,
            // Optional here; seeding fails loudly if it is missing.
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            env,
        }
    }
}
