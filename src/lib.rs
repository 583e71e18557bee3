// SPDX-License-Identifier: MIT
// Copyright 2026 Presu <dev@presu.app>

//! Presu: marketplace backend for home-service quote requests
//!
//! This crate provides the backend API that fronts the hosted auth, row
//! and object storage services: account onboarding, provider settings,
//! avatar handling and the public service-request flow.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::{AuthClient, Db, StorageClient};
use services::{AvatarService, Mailer, ProfileReconciler, RequestService, SettingsService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub storage: StorageClient,
    pub auth: AuthClient,
    pub mailer: Mailer,
    pub reconciler: ProfileReconciler,
    pub avatar: AvatarService,
    pub settings: SettingsService,
    pub requests: RequestService,
}
