// SPDX-License-Identifier: MIT
// Copyright 2026 Presu <dev@presu.app>

//! Auth API client (identity records and their metadata).
//!
//! Operations here act on behalf of the signed-in user: every call
//! carries the user's own access token, so the backend applies its
//! normal per-user rules. The anon key identifies the project.

use crate::error::AppError;
use crate::models::Identity;
use reqwest::header::{HeaderMap, HeaderValue};

/// Auth API client.
#[derive(Clone)]
pub struct AuthClient {
    http: Option<reqwest::Client>,
    auth_url: String,
}

impl AuthClient {
    /// Create a new auth client against the backend's auth endpoint.
    pub fn new(backend_url: &str, anon_key: &str) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(anon_key)
                .map_err(|e| AppError::Backend(format!("Invalid anon key: {}", e)))?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Backend(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http: Some(http),
            auth_url: format!("{}/auth/v1", backend_url),
        })
    }

    /// Create a mock auth client for testing (offline mode).
    ///
    /// All identity operations will return an error if called.
    pub fn new_mock() -> Self {
        Self {
            http: None,
            auth_url: String::new(),
        }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&reqwest::Client, AppError> {
        self.http
            .as_ref()
            .ok_or_else(|| AppError::Backend("Auth not connected (offline mode)".to_string()))
    }

    /// Fetch the identity record behind an access token.
    ///
    /// A 401 means the token is expired or revoked, not a server fault.
    pub async fn get_user(&self, access_token: &str) -> Result<Identity, AppError> {
        let response = self
            .get_client()?
            .get(format!("{}/user", self.auth_url))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AppError::InvalidToken);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Backend(format!(
                "get user: HTTP {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))
    }

    /// Merge fields into the identity's metadata and return the updated
    /// record.
    ///
    /// Keys present in `data` overwrite, absent keys are left untouched.
    pub async fn update_metadata(
        &self,
        access_token: &str,
        data: &serde_json::Value,
    ) -> Result<Identity, AppError> {
        let response = self
            .get_client()?
            .put(format!("{}/user", self.auth_url))
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "data": data }))
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AppError::InvalidToken);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Backend(format!(
                "update metadata: HTTP {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))
    }
}
