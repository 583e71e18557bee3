// SPDX-License-Identifier: MIT
// Copyright 2026 Presu <dev@presu.app>

//! Object storage client (bucket + object REST surface).

use crate::error::AppError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};

/// Storage API client.
#[derive(Clone)]
pub struct StorageClient {
    http: Option<reqwest::Client>,
    storage_url: String,
}

impl StorageClient {
    /// Create a new storage client against the backend's storage endpoint.
    pub fn new(backend_url: &str, service_role_key: &str) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(service_role_key)
                .map_err(|e| AppError::Storage(format!("Invalid service role key: {}", e)))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", service_role_key))
                .map_err(|e| AppError::Storage(format!("Invalid service role key: {}", e)))?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Storage(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http: Some(http),
            storage_url: format!("{}/storage/v1", backend_url),
        })
    }

    /// Create a mock storage client for testing (offline mode).
    ///
    /// All object operations will return an error if called.
    pub fn new_mock() -> Self {
        Self {
            http: None,
            storage_url: String::new(),
        }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&reqwest::Client, AppError> {
        self.http
            .as_ref()
            .ok_or_else(|| AppError::Storage("Storage not connected (offline mode)".to_string()))
    }

    // ─── Bucket Operations ───────────────────────────────────────

    /// Create a public bucket, tolerating one that already exists.
    pub async fn ensure_bucket(&self, bucket: &str) -> Result<(), AppError> {
        let response = self
            .get_client()?
            .post(format!("{}/bucket", self.storage_url))
            .json(&serde_json::json!({
                "id": bucket,
                "name": bucket,
                "public": true,
            }))
            .send()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        if response.status().is_success() {
            tracing::info!(bucket, "Created storage bucket");
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let err = AppError::Storage(format!("create bucket: HTTP {}: {}", status, body));
        if err.is_already_exists() {
            tracing::debug!(bucket, "Bucket already exists");
            return Ok(());
        }
        Err(err)
    }

    // ─── Object Operations ───────────────────────────────────────

    /// Upload an object. With `overwrite` an existing object is replaced;
    /// without it the backend rejects duplicates.
    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        overwrite: bool,
    ) -> Result<(), AppError> {
        let file_name = path.rsplit('/').next().unwrap_or("file").to_string();
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(content_type)
            .map_err(|e| AppError::Storage(format!("Invalid content type: {}", e)))?;
        let form = Form::new().part("file", part);

        let response = self
            .get_client()?
            .post(format!("{}/object/{}/{}", self.storage_url, bucket, path))
            .header("x-upsert", overwrite.to_string())
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!(
                "upload {}/{}: HTTP {}: {}",
                bucket, path, status, body
            )));
        }

        tracing::debug!(bucket, path, "Uploaded object");
        Ok(())
    }

    /// Upload an object only if it does not exist yet.
    ///
    /// Returns `true` when the object was written, `false` when it was
    /// already there.
    pub async fn upload_if_absent(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<bool, AppError> {
        match self.upload(bucket, path, bytes, content_type, false).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_already_exists() => {
                tracing::debug!(bucket, path, "Object already exists");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Public URL of an object in a public bucket. No network call.
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/object/public/{}/{}", self.storage_url, bucket, path)
    }

    /// URL prefix shared by every public object of a bucket.
    pub fn public_prefix(&self, bucket: &str) -> String {
        format!("{}/object/public/{}/", self.storage_url, bucket)
    }

    /// Create a time-limited signed URL for an object.
    pub async fn create_signed_url(
        &self,
        bucket: &str,
        path: &str,
        expires_in_secs: u32,
    ) -> Result<String, AppError> {
        let response = self
            .get_client()?
            .post(format!("{}/object/sign/{}/{}", self.storage_url, bucket, path))
            .json(&serde_json::json!({ "expiresIn": expires_in_secs }))
            .send()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!(
                "sign {}/{}: HTTP {}: {}",
                bucket, path, status, body
            )));
        }

        #[derive(serde::Deserialize)]
        struct SignedUrlResponse {
            #[serde(rename = "signedURL")]
            signed_url: String,
        }

        let signed: SignedUrlResponse = response
            .json()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        // The API returns a path relative to the storage endpoint.
        if signed.signed_url.starts_with("http") {
            Ok(signed.signed_url)
        } else {
            Ok(format!("{}{}", self.storage_url, signed.signed_url))
        }
    }
}
