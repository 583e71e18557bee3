// SPDX-License-Identifier: MIT
// Copyright 2026 Presu <dev@presu.app>

//! Middleware modules (authentication, security, etc.).

pub mod auth;
pub mod security;

pub use auth::require_auth;
