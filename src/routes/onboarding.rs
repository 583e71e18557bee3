// SPDX-License-Identifier: MIT
// Copyright 2026 Presu <dev@presu.app>

//! Onboarding route: first-run provisioning for a fresh identity.

use crate::db::objects;
use crate::error::{AppError, Result};
use crate::models::Role;
use crate::services::avatar;
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Onboarding routes (called right after signup, before a session
/// necessarily exists).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/create-user-folder", post(create_user_folder))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserFolderRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    /// Requested initial role; escalation only, defaults to client
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
pub struct CreateUserFolderResponse {
    pub ok: bool,
    pub role: Role,
}

/// Provision profile row and storage folder for a new identity.
///
/// Idempotent: re-running for an existing user changes nothing.
async fn create_user_folder(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateUserFolderRequest>,
) -> Result<Json<CreateUserFolderResponse>> {
    let user_id = body
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("userId is required".to_string()))?;

    let role = state
        .reconciler
        .ensure_profile(user_id, body.role, body.full_name.as_deref())
        .await?;

    // Storage folder: bucket, the .keep marker, and a seeded placeholder
    // avatar. All three tolerate already-existing state.
    state.storage.ensure_bucket(objects::USERS_BUCKET).await?;
    state
        .storage
        .upload_if_absent(
            objects::USERS_BUCKET,
            &format!("{}/{}", user_id, objects::KEEP_FILE),
            Vec::new(),
            "text/plain",
        )
        .await?;
    state
        .storage
        .upload_if_absent(
            objects::USERS_BUCKET,
            &format!("{}/{}", user_id, objects::PLACEHOLDER_FILE),
            avatar::PLACEHOLDER_PNG.to_vec(),
            "image/png",
        )
        .await?;

    tracing::info!(user_id, role = %role, "Onboarded user");

    Ok(Json(CreateUserFolderResponse { ok: true, role }))
}
