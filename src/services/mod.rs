// SPDX-License-Identifier: MIT
// Copyright 2026 Presu <dev@presu.app>

//! Services module - business logic layer.

pub mod avatar;
pub mod mailer;
pub mod reconciler;
pub mod requests;
pub mod settings;

pub use avatar::AvatarService;
pub use mailer::Mailer;
pub use reconciler::ProfileReconciler;
pub use requests::RequestService;
pub use settings::SettingsService;
