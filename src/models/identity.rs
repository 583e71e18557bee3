//! Identity record as served by the backend auth API.

use serde::{Deserialize, Serialize};

/// Authenticated identity, the auth service's view of a user.
///
/// Only the fields this application reads are modeled; the auth API returns
/// more (audience, confirmation timestamps, ...) and serde ignores them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Identity {
    /// User id (UUID, shared with the profile row's primary key)
    pub id: String,
    /// Email address
    pub email: Option<String>,
    /// Application-managed metadata
    #[serde(rename = "user_metadata", default)]
    pub metadata: IdentityMetadata,
}

/// User-editable metadata stored on the identity record.
///
/// Mutated only by the avatar synchronizer and the settings writer; patches
/// are merged key-wise by the auth service, so partial updates leave the
/// remaining keys untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct IdentityMetadata {
    /// Display name
    #[serde(default)]
    pub full_name: Option<String>,
    /// Avatar reference: local asset path, store public path, or (before
    /// synchronization) an external URL from a federated login provider
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Contact phone (E.164)
    #[serde(default)]
    pub phone: Option<String>,
    /// Street address
    #[serde(default)]
    pub address: Option<String>,
    /// City
    #[serde(default)]
    pub city: Option<String>,
    /// Preferred UI locale ("en" / "es")
    #[serde(default)]
    pub locale: Option<String>,
}
