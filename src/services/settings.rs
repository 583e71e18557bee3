// SPDX-License-Identifier: MIT
// Copyright 2026 Presu <dev@presu.app>

//! Account settings persistence.
//!
//! A save fans out over three surfaces in a fixed order: identity
//! metadata, the profile row, then the provider row and its service
//! associations (or their removal on downgrade). The first failing
//! step aborts the rest; earlier writes are kept. Last writer wins
//! across concurrent tabs.

use crate::db::{AuthClient, Db};
use crate::error::{AppError, Result};
use crate::models::{Identity, Profile, Provider, Role};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use validator::Validate;

static E164_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9][0-9]{0,14}$").expect("valid regex"));

/// Settings form as submitted by the account page.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SettingsForm {
    #[serde(default)]
    pub full_name: Option<String>,
    /// Current avatar reference, carried along so a settings save does
    /// not drop it from the metadata.
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    #[validate(regex(path = *E164_RE, message = "phone must be E.164, e.g. +34600111222"))]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    /// Selected catalog service slugs (providers only)
    #[serde(default)]
    pub services: Vec<String>,
}

impl SettingsForm {
    /// Trim text fields and drop empties, so "" never reaches
    /// validation or the backend.
    pub fn normalize(&mut self) {
        fn clean(field: &mut Option<String>) {
            if let Some(value) = field {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    *field = None;
                } else if trimmed.len() != value.len() {
                    *field = Some(trimmed.to_string());
                }
            }
        }
        clean(&mut self.full_name);
        clean(&mut self.avatar_url);
        clean(&mut self.phone);
        clean(&mut self.address);
        clean(&mut self.city);
        clean(&mut self.company_name);
        clean(&mut self.tax_id);
        self.services.retain(|s| !s.trim().is_empty());
    }
}

/// Outcome of a settings save: the refreshed identity snapshot.
#[derive(serde::Serialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SettingsSaved {
    pub identity: Identity,
    pub role: Role,
}

/// Writes account settings across identity, profile and provider rows.
pub struct SettingsService {
    auth: AuthClient,
    db: Db,
}

impl SettingsService {
    pub fn new(auth: AuthClient, db: Db) -> Self {
        Self { auth, db }
    }

    /// Persist the settings form for the signed-in user.
    pub async fn save(
        &self,
        user_id: &str,
        access_token: &str,
        mut form: SettingsForm,
    ) -> Result<SettingsSaved> {
        form.normalize();
        form.validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        // 1. Identity metadata. Only submitted keys are written; the
        //    merge leaves the rest untouched.
        let mut data = serde_json::Map::new();
        let mut put = |key: &str, value: &Option<String>| {
            if let Some(v) = value {
                data.insert(key.to_string(), serde_json::Value::String(v.clone()));
            }
        };
        put("full_name", &form.full_name);
        put("avatar_url", &form.avatar_url);
        put("phone", &form.phone);
        put("address", &form.address);
        put("city", &form.city);
        if !data.is_empty() {
            self.auth
                .update_metadata(access_token, &serde_json::Value::Object(data))
                .await?;
        }

        // 2. Profile row.
        let profile = Profile {
            id: user_id.to_string(),
            full_name: form.full_name.clone(),
            phone: form.phone.clone(),
            address: form.address.clone(),
            city: form.city.clone(),
            role: form.role,
        };
        self.db.upsert_profile(&profile).await?;

        // 3. Provider rows follow the saved role.
        match form.role {
            Role::Provider => {
                let provider = Provider {
                    user_id: user_id.to_string(),
                    company_name: form.company_name.clone(),
                    tax_id: form.tax_id.clone(),
                    coverage_area: form.city.clone().map(|c| vec![c]).unwrap_or_default(),
                };
                self.db.upsert_provider(&provider).await?;

                let selection = dedup_preserving_order(&form.services);
                self.db
                    .replace_provider_services(user_id, &selection)
                    .await?;
                tracing::info!(
                    user_id,
                    services = selection.len(),
                    "Saved provider settings"
                );
            }
            Role::Client | Role::Admin => {
                // Join rows first, then the provider row they reference.
                self.db.delete_provider_services(user_id).await?;
                self.db.delete_provider(user_id).await?;
                tracing::info!(user_id, role = %form.role, "Saved settings");
            }
        }

        // 4. Hand back the state as the backend now sees it.
        let identity = self.auth.get_user(access_token).await?;
        Ok(SettingsSaved {
            identity,
            role: form.role,
        })
    }
}

/// Collapse duplicates while keeping first-seen order.
pub(crate) fn dedup_preserving_order(items: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert(item.as_str()))
        .cloned()
        .collect()
}
