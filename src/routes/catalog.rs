// SPDX-License-Identifier: MIT
// Copyright 2026 Presu <dev@presu.app>

//! Public service catalog.

use crate::error::Result;
use crate::models::Service;
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/services", get(list_services))
}

/// Bilingual service catalog, used by the settings form and the public
/// request form.
async fn list_services(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Service>>> {
    Ok(Json(state.db.list_services().await?))
}
