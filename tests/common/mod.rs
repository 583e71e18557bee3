// SPDX-License-Identifier: MIT
// Copyright 2026 Presu <dev@presu.app>

use presu_api::config::Config;
use presu_api::db::{AuthClient, Db, StorageClient};
use presu_api::routes::create_router;
use presu_api::services::{
    AvatarService, Mailer, ProfileReconciler, RequestService, SettingsService,
};
use presu_api::AppState;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Create a test app with offline mock clients.
///
/// Any handler that reaches the backend fails with a 5xx, which makes
/// these apps useful for testing everything that happens before the
/// first backend call (validation, auth, routing).
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    build_app(
        Config::test_default(),
        Db::new_mock(),
        StorageClient::new_mock(),
        AuthClient::new_mock(),
    )
}

/// Create a test app whose clients point at a mock backend server.
#[allow(dead_code)]
pub fn create_backed_app(backend_url: &str) -> (axum::Router, Arc<AppState>) {
    let mut config = Config::test_default();
    config.backend_url = backend_url.trim_end_matches('/').to_string();

    let db = Db::new(&config.backend_url, &config.service_role_key)
        .expect("Failed to build rows client");
    let storage = StorageClient::new(&config.backend_url, &config.service_role_key)
        .expect("Failed to build storage client");
    let auth = AuthClient::new(&config.backend_url, &config.anon_key)
        .expect("Failed to build auth client");

    build_app(config, db, storage, auth)
}

fn build_app(
    config: Config,
    db: Db,
    storage: StorageClient,
    auth: AuthClient,
) -> (axum::Router, Arc<AppState>) {
    let mailer = Mailer::new_noop();

    let reconciler = ProfileReconciler::new(db.clone());
    let avatar = AvatarService::new(auth.clone(), storage.clone());
    let settings = SettingsService::new(auth.clone(), db.clone());
    let requests = RequestService::new(db.clone(), storage.clone(), mailer.clone());

    let state = Arc::new(AppState {
        config,
        db,
        storage,
        auth,
        mailer,
        reconciler,
        avatar,
        settings,
        requests,
    });

    (create_router(state.clone()), state)
}

/// Create a session token the auth middleware accepts.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, email: &str, signing_key: &[u8]) -> String {
    #[derive(Serialize)]
    struct Claims {
        sub: String,
        exp: usize,
        iat: usize,
        aud: String,
        email: String,
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + 3600,
        iat: now,
        // Session tokens carry this audience; others are rejected.
        aud: "authenticated".to_string(),
        email: email.to_string(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .unwrap()
}

/// Identity record JSON in the shape the auth API serves.
#[allow(dead_code)]
pub fn identity_json(
    id: &str,
    email: &str,
    metadata: serde_json::Value,
) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "email": email,
        "user_metadata": metadata,
    })
}

/// Hand-rolled multipart/form-data request body.
#[allow(dead_code)]
pub struct MultipartBuilder {
    boundary: String,
    body: Vec<u8>,
}

#[allow(dead_code)]
impl MultipartBuilder {
    pub fn new() -> Self {
        Self {
            boundary: "------------------------d74496d66958873e".to_string(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Finish the body; returns the Content-Type header value and bytes.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}
