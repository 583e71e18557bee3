//! Service catalog entry (read-only reference data).

use serde::{Deserialize, Serialize};

/// Row in the `services` catalog table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Service {
    /// Stable slug, referenced by the join tables
    pub id: String,
    /// English display name
    pub name_en: String,
    /// Spanish display name
    pub name_es: String,
}
