// SPDX-License-Identifier: MIT
// Copyright 2026 Presu <dev@presu.app>

//! Profile reconciliation.
//!
//! Runs whenever an identity shows up (onboarding, sign-in, token
//! refresh) and makes the row state match the account's role:
//! - first-run identities get a profile row
//! - a client asking to become a provider is escalated
//! - providers get their extension row bootstrapped
//!
//! The bootstrap path never downgrades a role; only an explicit
//! settings save can do that.

use crate::db::Db;
use crate::error::Result;
use crate::models::{Profile, Provider, Role};

/// Reconciles profile and provider rows against an identity.
pub struct ProfileReconciler {
    db: Db,
}

impl ProfileReconciler {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Ensure the identity has a profile row and return its final role.
    ///
    /// The first failing backend call aborts the flow; earlier writes are
    /// kept. A provider role with a missing provider row is healed by the
    /// next settings save.
    pub async fn ensure_profile(
        &self,
        user_id: &str,
        requested_role: Option<Role>,
        full_name: Option<&str>,
    ) -> Result<Role> {
        let final_role = match self.db.get_profile(user_id).await? {
            None => {
                let role = requested_role.unwrap_or_default();
                let profile =
                    Profile::new(user_id.to_string(), full_name.map(str::to_string), role);
                match self.db.insert_profile(&profile).await {
                    Ok(()) => {
                        tracing::info!(user_id, role = %role, "Created profile");
                    }
                    // Lost a create race; the winner's row is authoritative.
                    Err(e) if e.is_already_exists() => {
                        tracing::debug!(user_id, "Profile created concurrently");
                    }
                    Err(e) => return Err(e),
                }
                role
            }
            Some(existing) => {
                let resolved = resolve_role(existing.role, requested_role);

                let mut patch = serde_json::Map::new();
                if let Some(name) = full_name {
                    if !name.is_empty() && existing.full_name.as_deref() != Some(name) {
                        patch.insert(
                            "full_name".to_string(),
                            serde_json::Value::String(name.to_string()),
                        );
                    }
                }
                if resolved != existing.role {
                    patch.insert("role".to_string(), serde_json::json!(resolved));
                }

                if !patch.is_empty() {
                    self.db
                        .update_profile(user_id, &serde_json::Value::Object(patch))
                        .await?;
                    tracing::info!(user_id, role = %resolved, "Updated profile");
                }
                resolved
            }
        };

        if final_role.is_provider() {
            self.db
                .ensure_provider(&Provider::empty(user_id.to_string()))
                .await?;
        }

        Ok(final_role)
    }
}

/// Role resolution for the bootstrap path: upgrades only.
///
/// A provider asking for `client` here keeps `provider`; admins keep
/// `admin` no matter what the request says.
fn resolve_role(existing: Role, requested: Option<Role>) -> Role {
    match (existing, requested) {
        (Role::Client, Some(Role::Provider)) => Role::Provider,
        (Role::Client, _) => Role::Client,
        (Role::Provider, _) => Role::Provider,
        (Role::Admin, _) => Role::Admin,
    }
}
