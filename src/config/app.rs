//! Runtime application settings.
//!
//! Everything comes from environment variables (a `.env` file is loaded by
//! `main` before this runs) with defaults that make local development work
//! out of the box. The JWT secret default is loudly flagged because running
//! it in production would let anyone mint tokens.

use tracing::warn;

/// Fallback signing secret for local development only.
const DEV_JWT_SECRET: &str = "investment_platform_secret_key_for_dev_only_256bits_long";

/// Application settings shared across the process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// TCP port the HTTP server binds to
    pub port: u16,
    /// HS256 secret used to sign session tokens
    pub jwt_secret: String,
    /// SeaORM database URL
    pub database_url: String,
}

impl AppConfig {
    /// Loads settings from the environment, falling back to development
    /// defaults where a variable is unset.
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET is not set; using the built-in development secret");
            DEV_JWT_SECRET.to_string()
        });

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://nivesh.sqlite?mode=rwc".to_string());

        Self {
            port,
            jwt_secret,
            database_url,
        }
    }
}
