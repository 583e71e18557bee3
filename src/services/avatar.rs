// SPDX-License-Identifier: MIT
// Copyright 2026 Presu <dev@presu.app>

//! Avatar synchronization.
//!
//! Identity records may arrive with no avatar, with a reference we
//! already host, or with an external URL from a federated login
//! provider (Google, etc.). This service converges every identity to
//! one of two stable forms:
//! - the bundled local placeholder (`/assets/user-placeholder.png`)
//! - a public object under the user's folder in the store
//!
//! External references are migrated by downloading the image and
//! re-uploading it to `{userId}/avatar.{ext}`; any failure on that
//! path falls back to the placeholder. The post-state always passes
//! the convergence check, so re-running the sync is a no-op.

use crate::db::{objects, AuthClient, StorageClient};
use crate::error::{AppError, Result};
use crate::models::Identity;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Path prefix of avatar references served from the web app bundle.
pub const LOCAL_ASSET_PREFIX: &str = "/assets/";
/// Bundled default avatar reference.
pub const PLACEHOLDER_PATH: &str = "/assets/user-placeholder.png";
/// Bytes of the default avatar, seeded into each new user folder.
pub static PLACEHOLDER_PNG: &[u8] = include_bytes!("../../assets/user-placeholder.png");

/// Display URLs handed to the client stay valid for an hour.
const SIGNED_URL_TTL_SECS: u32 = 3600;

/// Per-user mutex map serializing concurrent syncs within an instance.
pub type SyncLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// Where an avatar reference currently points.
#[derive(Debug, Clone, PartialEq)]
enum AvatarRef {
    /// No reference stored yet
    Missing,
    /// Already local or store-hosted, nothing to do
    Converged,
    /// Third-party URL that needs migrating
    External(String),
}

/// Synchronizes identity avatar references into hosted storage.
pub struct AvatarService {
    auth: AuthClient,
    storage: StorageClient,
    /// Plain client for fetching external avatar images.
    http: reqwest::Client,
    sync_locks: SyncLocks,
}

/// Result of an explicit avatar upload.
pub struct AvatarUpload {
    /// URL the client should display right away (signed, 1 hour)
    pub display_url: String,
    /// Identity after the metadata write
    pub identity: Identity,
}

impl AvatarService {
    pub fn new(auth: AuthClient, storage: StorageClient) -> Self {
        Self {
            auth,
            storage,
            http: reqwest::Client::new(),
            sync_locks: Arc::new(DashMap::new()),
        }
    }

    /// Converge the identity's avatar reference and return the refreshed
    /// identity.
    ///
    /// Safe to call on every sign-in and token refresh: converged
    /// references return without any network write.
    pub async fn sync(&self, access_token: &str, identity: Identity) -> Result<Identity> {
        // One sync at a time per user; later callers see the converged state.
        let lock = self
            .sync_locks
            .entry(identity.id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        let store_prefix = self.storage.public_prefix(objects::USERS_BUCKET);
        match classify(identity.metadata.avatar_url.as_deref(), &store_prefix) {
            AvatarRef::Converged => Ok(identity),
            AvatarRef::Missing => {
                tracing::info!(user_id = %identity.id, "Seeding placeholder avatar reference");
                self.persist_avatar_url(access_token, PLACEHOLDER_PATH).await
            }
            AvatarRef::External(url) => {
                let stored = match self.migrate_external(&identity.id, &url).await {
                    Ok(public_url) => {
                        tracing::info!(user_id = %identity.id, "Migrated external avatar to store");
                        public_url
                    }
                    Err(e) => {
                        tracing::warn!(
                            user_id = %identity.id,
                            error = %e,
                            "Avatar migration failed, falling back to placeholder"
                        );
                        PLACEHOLDER_PATH.to_string()
                    }
                };
                self.persist_avatar_url(access_token, &stored).await
            }
        }
    }

    /// Store a user-chosen avatar image and point the identity at it.
    ///
    /// The stored reference keeps the upload's original extension. An
    /// upload failure degrades to the placeholder rather than erroring,
    /// so the account page always has something to show.
    pub async fn store_upload(
        &self,
        access_token: &str,
        user_id: &str,
        file_name: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<AvatarUpload> {
        let ext = upload_extension(file_name, content_type);
        let path = format!("{}/avatar.{}", user_id, ext);
        let mime = content_type.unwrap_or("application/octet-stream");

        let (stored, display_url) = match self
            .storage
            .upload(objects::USERS_BUCKET, &path, bytes, mime, true)
            .await
        {
            Ok(()) => {
                let public_url = self.storage.public_url(objects::USERS_BUCKET, &path);
                let display_url = match self
                    .storage
                    .create_signed_url(objects::USERS_BUCKET, &path, SIGNED_URL_TTL_SECS)
                    .await
                {
                    Ok(signed) => signed,
                    Err(e) => {
                        tracing::warn!(user_id, error = %e, "Signing avatar URL failed");
                        public_url.clone()
                    }
                };
                (public_url, display_url)
            }
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Avatar upload failed, using placeholder");
                (PLACEHOLDER_PATH.to_string(), PLACEHOLDER_PATH.to_string())
            }
        };

        let identity = self.persist_avatar_url(access_token, &stored).await?;
        Ok(AvatarUpload {
            display_url,
            identity,
        })
    }

    /// Write the avatar reference to identity metadata; the response is
    /// the refreshed identity snapshot.
    async fn persist_avatar_url(&self, access_token: &str, avatar_url: &str) -> Result<Identity> {
        self.auth
            .update_metadata(access_token, &serde_json::json!({ "avatar_url": avatar_url }))
            .await
    }

    /// Download an external avatar and re-host it in the user's folder.
    async fn migrate_external(&self, user_id: &str, url: &str) -> Result<String> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("avatar fetch: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Storage(format!("avatar fetch: HTTP {}", status)));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Storage(format!("avatar fetch: {}", e)))?;

        let ext = extension_for(content_type.as_deref());
        let path = format!("{}/avatar.{}", user_id, ext);
        let mime = content_type.as_deref().unwrap_or("image/jpeg");

        self.storage
            .upload(objects::USERS_BUCKET, &path, bytes.to_vec(), mime, true)
            .await?;

        Ok(self.storage.public_url(objects::USERS_BUCKET, &path))
    }
}

/// Classify an avatar reference against the two converged forms.
fn classify(avatar_url: Option<&str>, store_prefix: &str) -> AvatarRef {
    match avatar_url {
        None => AvatarRef::Missing,
        Some("") => AvatarRef::Missing,
        Some(url) if url.starts_with(LOCAL_ASSET_PREFIX) || url.starts_with(store_prefix) => {
            AvatarRef::Converged
        }
        Some(url) => AvatarRef::External(url.to_string()),
    }
}

/// Map a Content-Type to a file extension; unknown types become jpg.
fn extension_for(content_type: Option<&str>) -> &'static str {
    match content_type {
        Some(ct) if ct.starts_with("image/png") => "png",
        Some(ct) if ct.starts_with("image/webp") => "webp",
        Some(ct) if ct.starts_with("image/gif") => "gif",
        Some(ct) if ct.starts_with("image/jpeg") => "jpg",
        _ => "jpg",
    }
}

/// Extension for an uploaded file: the original name's, if it has a
/// plausible one, else inferred from the Content-Type.
fn upload_extension(file_name: &str, content_type: Option<&str>) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or_else(|| extension_for(content_type).to_string())
}
