// SPDX-License-Identifier: MIT
// Copyright 2026 Presu <dev@presu.app>

//! Profile row and account role.

use serde::{Deserialize, Serialize};

/// Account role. Stored lowercase in the `profiles.role` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Role {
    Client,
    Provider,
    Admin,
}

impl Default for Role {
    fn default() -> Self {
        Role::Client
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Provider => "provider",
            Role::Admin => "admin",
        }
    }

    pub fn is_provider(&self) -> bool {
        matches!(self, Role::Provider)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-level user record in the `profiles` table.
///
/// Keyed by the identity id; created on first onboarding or first settings
/// save, whichever comes first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Profile {
    /// Identity id (primary key)
    pub id: String,
    /// Display name
    pub full_name: Option<String>,
    /// Contact phone (E.164)
    pub phone: Option<String>,
    /// Street address
    pub address: Option<String>,
    /// City
    pub city: Option<String>,
    /// Account role
    #[serde(default)]
    pub role: Role,
}

impl Profile {
    /// Fresh profile for a first-run identity.
    pub fn new(id: String, full_name: Option<String>, role: Role) -> Self {
        Self {
            id,
            full_name,
            phone: None,
            address: None,
            city: None,
            role,
        }
    }
}
