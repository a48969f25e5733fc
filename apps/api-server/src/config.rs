//! Application configuration loaded from environment variables.

use std::env;

use feedline_infra::auth::JwtConfig;
use feedline_infra::database::MongoConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: MongoConfig,
    pub jwt: JwtConfig,
    pub upload_dir: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = MongoConfig {
            url: env::var("MONGODB_URL")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            database: env::var("MONGODB_DB").unwrap_or_else(|_| "feedline".to_string()),
        };

        let jwt = Self::jwt_from_env();

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database,
            jwt,
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "images".to_string()),
        }
    }

    fn jwt_from_env() -> JwtConfig {
        let defaults = JwtConfig::default();
        let secret = env::var("JWT_SECRET").unwrap_or_else(|_| defaults.secret.clone());

        // Warn if using the default secret, loudly so in production
        if secret == defaults.secret {
            let is_production = env::var("RUST_ENV")
                .map(|v| v == "production" || v == "prod")
                .unwrap_or(false);

            if is_production {
                tracing::error!(
                    "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
                );
            } else {
                tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
            }
        }

        JwtConfig {
            secret,
            expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.expiration_hours),
            issuer: env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
        }
    }
}
