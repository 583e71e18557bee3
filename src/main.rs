// SPDX-License-Identifier: MIT
// Copyright 2026 Presu <dev@presu.app>

//! Presu API Server
//!
//! Serves the marketplace backend: account onboarding, provider settings,
//! avatar handling and the public service-request flow, all fronting the
//! hosted auth, row and object storage services.

use presu_api::{
    config::Config,
    db::{AuthClient, Db, StorageClient},
    services::{AvatarService, Mailer, ProfileReconciler, RequestService, SettingsService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Presu API");

    // Clients for the hosted backend (rows, objects, auth)
    let db = Db::new(&config.backend_url, &config.service_role_key)
        .expect("Failed to build rows client");
    let storage = StorageClient::new(&config.backend_url, &config.service_role_key)
        .expect("Failed to build storage client");
    let auth = AuthClient::new(&config.backend_url, &config.anon_key)
        .expect("Failed to build auth client");
    tracing::info!(backend = %config.backend_url, "Backend clients initialized");

    // SMTP relay for service-request notifications
    let mailer = Mailer::from_config(&config).expect("Failed to configure mailer");
    tracing::info!(host = %config.smtp_host, "Mailer initialized");

    // Domain services
    let reconciler = ProfileReconciler::new(db.clone());
    let avatar = AvatarService::new(auth.clone(), storage.clone());
    let settings = SettingsService::new(auth.clone(), db.clone());
    let requests = RequestService::new(db.clone(), storage.clone(), mailer.clone());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        storage,
        auth,
        mailer,
        reconciler,
        avatar,
        settings,
        requests,
    });

    // Build router
    let app = presu_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("presu_api=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
