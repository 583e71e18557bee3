//! Backend data layer (Supabase REST surfaces).

pub mod auth;
pub mod postgrest;
pub mod storage;

pub use auth::AuthClient;
pub use postgrest::Db;
pub use storage::StorageClient;

/// Postgres schema exposed through PostgREST.
pub const API_SCHEMA: &str = "api";

/// Table names as constants.
pub mod tables {
    pub const PROFILES: &str = "profiles";
    pub const PROVIDERS: &str = "providers";
    pub const PROVIDER_SERVICES: &str = "provider_services";
    pub const SERVICES: &str = "services";
    pub const SERVICE_REQUESTS: &str = "service_requests";
    /// Join rows linking a request to each selected service
    pub const SERVICE_REQUEST_SERVICES: &str = "service_request_services";
}

/// Object storage layout.
pub mod objects {
    /// Bucket holding all per-user files and request attachments.
    pub const USERS_BUCKET: &str = "users-data";
    /// Zero-byte marker that keeps an empty user folder listable.
    pub const KEEP_FILE: &str = ".keep";
    /// Default avatar seeded into every new user folder.
    pub const PLACEHOLDER_FILE: &str = "user-placeholder.png";
    /// Prefix for request invoice attachments.
    pub const REQUESTS_PREFIX: &str = "requests";
}
