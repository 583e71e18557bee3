// SPDX-License-Identifier: MIT
// Copyright 2026 Presu <dev@presu.app>

//! Provider extension row and its service join records.

use serde::{Deserialize, Serialize};

/// Role-specific extension record in the `providers` table.
///
/// Exists iff the profile's role is `provider`. Created with empty defaults
/// when the role is first escalated; filled in by the settings save.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Provider {
    /// Identity id (primary key, matches `profiles.id`)
    pub user_id: String,
    /// Registered company name
    pub company_name: Option<String>,
    /// Tax identifier (CIF/NIF)
    pub tax_id: Option<String>,
    /// Cities this provider covers
    #[serde(default)]
    pub coverage_area: Vec<String>,
}

impl Provider {
    /// Empty provider row for the idempotent role-escalation bootstrap.
    pub fn empty(user_id: String) -> Self {
        Self {
            user_id,
            company_name: None,
            tax_id: None,
            coverage_area: Vec::new(),
        }
    }
}

/// Join record in the `provider_services` table.
///
/// After a settings save these rows exactly match the submitted selection
/// (duplicates collapsed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderService {
    /// Provider's identity id
    pub provider_id: String,
    /// Catalog service slug
    pub service_id: String,
}
