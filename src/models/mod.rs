// SPDX-License-Identifier: MIT
// Copyright 2026 Presu <dev@presu.app>

//! Data models for the application.

pub mod identity;
pub mod profile;
pub mod provider;
pub mod request;
pub mod service;

pub use identity::{Identity, IdentityMetadata};
pub use profile::{Profile, Role};
pub use provider::{Provider, ProviderService};
pub use request::{ServiceRequest, ServiceRequestService};
pub use service::Service;
