//! Application configuration loaded from environment variables.
//!
//! All secrets come in through the environment (locally via `.env`); nothing
//! is fetched at runtime after startup.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Hosted backend ---
    /// Base URL of the hosted backend (auth/rows/storage REST APIs)
    pub backend_url: String,
    /// Public anon API key
    pub anon_key: String,
    /// Service-role API key (server-side privileged operations)
    pub service_role_key: String,
    /// Secret used by the backend to sign access tokens (HS256)
    pub jwt_secret: Vec<u8>,

    // --- SMTP relay ---
    /// SMTP server hostname
    pub smtp_host: String,
    /// SMTP server port
    pub smtp_port: u16,
    /// SMTP username
    pub smtp_user: String,
    /// SMTP password
    pub smtp_pass: String,
    /// From address for outgoing mail
    pub smtp_from: String,
    /// Inbox receiving service-request notifications
    pub notify_email: String,

    // --- Server ---
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            backend_url: env::var("SUPABASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("SUPABASE_URL"))?,
            anon_key: env::var("SUPABASE_ANON_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("SUPABASE_ANON_KEY"))?,
            service_role_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY"))?,
            jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .map_err(|_| ConfigError::Missing("SUPABASE_JWT_SECRET"))?
                .into_bytes(),

            smtp_host: env::var("SMTP_HOST").map_err(|_| ConfigError::Missing("SMTP_HOST"))?,
            smtp_port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .unwrap_or(587),
            smtp_user: env::var("SMTP_USER").map_err(|_| ConfigError::Missing("SMTP_USER"))?,
            smtp_pass: env::var("SMTP_PASS").map_err(|_| ConfigError::Missing("SMTP_PASS"))?,
            smtp_from: env::var("SMTP_FROM").map_err(|_| ConfigError::Missing("SMTP_FROM"))?,
            notify_email: env::var("NOTIFY_EMAIL")
                .unwrap_or_else(|_| "solicitudes@presu.app".to_string()),

            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }

    /// Default config for tests only. Points at an unroutable backend.
    pub fn test_default() -> Self {
        Self {
            backend_url: "http://backend.invalid".to_string(),
            anon_key: "test_anon_key".to_string(),
            service_role_key: "test_service_role_key".to_string(),
            jwt_secret: b"test_jwt_secret_32_bytes_minimum!".to_vec(),
            smtp_host: "smtp.invalid".to_string(),
            smtp_port: 587,
            smtp_user: "test".to_string(),
            smtp_pass: "test".to_string(),
            smtp_from: "Presu <no-reply@presu.app>".to_string(),
            notify_email: "solicitudes@presu.app".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            port: 8080,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
