// SPDX-License-Identifier: MIT
// Copyright 2026 Presu <dev@presu.app>

//! Account routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Identity, Profile, Provider, Role};
use crate::services::settings::{SettingsForm, SettingsSaved};
use crate::AppState;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::{
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Avatar images beyond this are rejected before any upload.
const MAX_AVATAR_BYTES: usize = 10 * 1024 * 1024;

/// Account routes (require authentication; the middleware is applied in
/// routes/mod.rs).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/account/sync", post(sync_account))
        .route("/api/settings", put(save_settings))
        .route(
            "/api/avatar",
            post(upload_avatar).layer(DefaultBodyLimit::max(MAX_AVATAR_BYTES)),
        )
        .route("/api/me", get(get_me))
}

// ─── Identity Sync ───────────────────────────────────────────

/// Body of a sync call. `{}` is the common case; role/name are only
/// sent by the signup flow.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SyncResponse {
    pub identity: Identity,
    pub profile: Option<Profile>,
    pub role: Role,
}

/// Reconcile rows and avatar for the signed-in identity.
///
/// The frontend calls this on every auth state change (sign-in, token
/// refresh). The response is the refreshed state.
async fn sync_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<SyncRequest>,
) -> Result<Json<SyncResponse>> {
    let identity = state.auth.get_user(&user.access_token).await?;

    let full_name = body
        .full_name
        .clone()
        .or_else(|| identity.metadata.full_name.clone());
    let role = state
        .reconciler
        .ensure_profile(&user.user_id, body.role, full_name.as_deref())
        .await?;

    let identity = state.avatar.sync(&user.access_token, identity).await?;
    let profile = state.db.get_profile(&user.user_id).await?;

    Ok(Json(SyncResponse {
        identity,
        profile,
        role,
    }))
}

// ─── Settings ────────────────────────────────────────────────

/// Persist the account settings form.
async fn save_settings(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(form): Json<SettingsForm>,
) -> Result<Json<SettingsSaved>> {
    let saved = state
        .settings
        .save(&user.user_id, &user.access_token, form)
        .await?;
    Ok(Json(saved))
}

// ─── Avatar Upload ───────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AvatarResponse {
    pub ok: bool,
    /// URL for immediate display (signed, short-lived)
    pub display_url: String,
    pub identity: Identity,
}

/// Store a user-chosen avatar image (multipart, single file field).
async fn upload_avatar(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<Json<AvatarResponse>> {
    let mut upload: Option<(String, Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {}", e)))?
    {
        if let Some(file_name) = field.file_name() {
            let file_name = file_name.to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("invalid avatar upload: {}", e)))?;
            upload = Some((file_name, content_type, bytes.to_vec()));
            break;
        }
    }

    let (file_name, content_type, bytes) =
        upload.ok_or_else(|| AppError::BadRequest("missing avatar file".to_string()))?;
    if bytes.is_empty() {
        return Err(AppError::BadRequest("empty avatar file".to_string()));
    }

    let outcome = state
        .avatar
        .store_upload(
            &user.access_token,
            &user.user_id,
            &file_name,
            content_type.as_deref(),
            bytes,
        )
        .await?;

    Ok(Json(AvatarResponse {
        ok: true,
        display_url: outcome.display_url,
        identity: outcome.identity,
    }))
}

// ─── Current User ────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MeResponse {
    pub identity: Identity,
    pub profile: Option<Profile>,
    pub provider: Option<Provider>,
    /// Catalog slugs the provider currently offers
    pub services: Vec<String>,
}

/// The account page's read model: identity snapshot plus rows.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MeResponse>> {
    let identity = state.auth.get_user(&user.access_token).await?;
    let profile = state.db.get_profile(&user.user_id).await?;

    let (provider, services) = match profile.as_ref().map(|p| p.role) {
        Some(Role::Provider) => {
            let provider = state.db.get_provider(&user.user_id).await?;
            let services = state
                .db
                .get_provider_services(&user.user_id)
                .await?
                .into_iter()
                .map(|row| row.service_id)
                .collect();
            (provider, services)
        }
        Some(Role::Client) | Some(Role::Admin) | None => (None, Vec::new()),
    };

    Ok(Json(MeResponse {
        identity,
        profile,
        provider,
        services,
    }))
}
