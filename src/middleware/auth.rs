// SPDX-License-Identifier: MIT
// Copyright 2026 Presu <dev@presu.app>

//! Session authentication middleware.
//!
//! Sessions are minted by the hosted auth service; this middleware
//! verifies its HS256 access tokens locally with the shared project
//! secret, without a round trip per request. The raw token is kept on
//! the request so handlers can call the auth API on the user's behalf.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::sync::Arc;

/// Cookie set by the frontend's auth helper.
const SESSION_COOKIE: &str = "sb-access-token";

/// Access token claims (only the fields this application reads).
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    /// Subject: the identity id (UUID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Email of the session's identity
    #[serde(default)]
    pub email: Option<String>,
}

/// Authenticated user extracted from the access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub email: Option<String>,
    /// Verified token, forwarded to the auth API for per-user calls.
    pub access_token: String,
}

/// Middleware that requires a valid session token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        cookie.value().to_string()
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header {
            Some(h) if h.starts_with("Bearer ") => h[7..].to_string(),
            _ => return Err(StatusCode::UNAUTHORIZED),
        }
    };

    let key = DecodingKey::from_secret(&state.config.jwt_secret);
    let mut validation = Validation::new(Algorithm::HS256);
    // The auth service marks user sessions with this audience.
    validation.set_audience(&["authenticated"]);

    let token_data =
        decode::<Claims>(&token, &key, &validation).map_err(|_| StatusCode::UNAUTHORIZED)?;

    let auth_user = AuthUser {
        user_id: token_data.claims.sub,
        email: token_data.claims.email,
        access_token: token,
    };
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}
