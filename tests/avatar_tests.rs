// SPDX-License-Identifier: MIT
// Copyright 2026 Presu <dev@presu.app>

//! Avatar convergence and upload tests against a mock backend.
//!
//! After any sync the identity's avatar reference is either the local
//! placeholder or an object in the user's store folder; external URLs
//! from federated logins get migrated. A converged identity syncs
//! without a single write.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

const USER_ID: &str = "7f0a1f26-9f87-4b8e-b6a1-2d8a2f9b3c44";
const PLACEHOLDER: &str = "/assets/user-placeholder.png";

fn sync_request(token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/account/sync")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from("{}"))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Mock the profile row reads that every sync performs.
async fn mount_profile(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": USER_ID,
            "full_name": "Ana García",
            "phone": null,
            "address": null,
            "city": null,
            "role": "client",
        }])))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_sync_seeds_placeholder_for_missing_avatar() {
    let mock_server = MockServer::start().await;
    mount_profile(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::identity_json(
            USER_ID,
            "ana@example.com",
            json!({ "full_name": "Ana García" }),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/auth/v1/user"))
        .and(body_json(json!({ "data": { "avatar_url": PLACEHOLDER } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::identity_json(
            USER_ID,
            "ana@example.com",
            json!({ "full_name": "Ana García", "avatar_url": PLACEHOLDER }),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (app, state) = common::create_backed_app(&mock_server.uri());
    let token = common::create_test_jwt(USER_ID, "ana@example.com", &state.config.jwt_secret);

    let response = app.oneshot(sync_request(&token)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["identity"]["user_metadata"]["avatar_url"], PLACEHOLDER);
    assert_eq!(body["role"], "client");
    assert_eq!(body["profile"]["id"], USER_ID);
}

#[tokio::test]
async fn test_sync_migrates_external_avatar() {
    let mock_server = MockServer::start().await;
    mount_profile(&mock_server).await;

    let external_url = format!("{}/external/photo", mock_server.uri());
    let store_url = format!(
        "{}/storage/v1/object/public/users-data/{}/avatar.jpg",
        mock_server.uri(),
        USER_ID
    );

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::identity_json(
            USER_ID,
            "ana@example.com",
            json!({ "avatar_url": external_url }),
        )))
        .mount(&mock_server)
        .await;

    // The external image itself.
    Mock::given(method("GET"))
        .and(path("/external/photo"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(vec![0xffu8, 0xd8, 0xff], "image/jpeg"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    // Re-hosted under the user's folder, extension from the content type.
    Mock::given(method("POST"))
        .and(path(format!(
            "/storage/v1/object/users-data/{}/avatar.jpg",
            USER_ID
        )))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/auth/v1/user"))
        .and(body_json(json!({ "data": { "avatar_url": store_url } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::identity_json(
            USER_ID,
            "ana@example.com",
            json!({ "avatar_url": store_url }),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (app, state) = common::create_backed_app(&mock_server.uri());
    let token = common::create_test_jwt(USER_ID, "ana@example.com", &state.config.jwt_secret);

    let response = app.oneshot(sync_request(&token)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let avatar = body["identity"]["user_metadata"]["avatar_url"]
        .as_str()
        .unwrap();
    assert!(
        avatar.contains("/storage/v1/object/public/users-data/"),
        "avatar should live in the store, got {}",
        avatar
    );
}

#[tokio::test]
async fn test_sync_is_noop_when_converged() {
    let mock_server = MockServer::start().await;
    mount_profile(&mock_server).await;

    let store_url = format!(
        "{}/storage/v1/object/public/users-data/{}/avatar.png",
        mock_server.uri(),
        USER_ID
    );

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::identity_json(
            USER_ID,
            "ana@example.com",
            json!({ "avatar_url": store_url }),
        )))
        .mount(&mock_server)
        .await;

    // Converged state: no metadata writes, no uploads.
    Mock::given(method("PUT"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(wiremock::matchers::path_regex("^/storage/v1/object/.*"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (app, state) = common::create_backed_app(&mock_server.uri());
    let token = common::create_test_jwt(USER_ID, "ana@example.com", &state.config.jwt_secret);

    let response = app.oneshot(sync_request(&token)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(
        body["identity"]["user_metadata"]["avatar_url"]
            .as_str()
            .unwrap(),
        store_url
    );
}

#[tokio::test]
async fn test_sync_falls_back_to_placeholder_when_migration_fails() {
    let mock_server = MockServer::start().await;
    mount_profile(&mock_server).await;

    let external_url = format!("{}/external/gone", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::identity_json(
            USER_ID,
            "ana@example.com",
            json!({ "avatar_url": external_url }),
        )))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/external/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/auth/v1/user"))
        .and(body_json(json!({ "data": { "avatar_url": PLACEHOLDER } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::identity_json(
            USER_ID,
            "ana@example.com",
            json!({ "avatar_url": PLACEHOLDER }),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (app, state) = common::create_backed_app(&mock_server.uri());
    let token = common::create_test_jwt(USER_ID, "ana@example.com", &state.config.jwt_secret);

    let response = app.oneshot(sync_request(&token)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["identity"]["user_metadata"]["avatar_url"], PLACEHOLDER);
}

#[tokio::test]
async fn test_avatar_upload_returns_signed_url() {
    let mock_server = MockServer::start().await;

    let public_url = format!(
        "{}/storage/v1/object/public/users-data/{}/avatar.png",
        mock_server.uri(),
        USER_ID
    );

    Mock::given(method("POST"))
        .and(path(format!(
            "/storage/v1/object/users-data/{}/avatar.png",
            USER_ID
        )))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!(
            "/storage/v1/object/sign/users-data/{}/avatar.png",
            USER_ID
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "signedURL": format!("/object/sign/users-data/{}/avatar.png?token=sig123", USER_ID),
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/auth/v1/user"))
        .and(body_json(json!({ "data": { "avatar_url": public_url } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::identity_json(
            USER_ID,
            "ana@example.com",
            json!({ "avatar_url": public_url }),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (app, state) = common::create_backed_app(&mock_server.uri());
    let token = common::create_test_jwt(USER_ID, "ana@example.com", &state.config.jwt_secret);

    let (content_type, body) = common::MultipartBuilder::new()
        .file("avatar", "me.png", "image/png", b"\x89PNG\r\n\x1a\nfake")
        .finish();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/avatar")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["ok"], true);
    let display_url = body["display_url"].as_str().unwrap();
    assert!(
        display_url.contains("token=sig123"),
        "display URL should be signed, got {}",
        display_url
    );
    assert_eq!(
        body["identity"]["user_metadata"]["avatar_url"]
            .as_str()
            .unwrap(),
        public_url
    );
}

#[tokio::test]
async fn test_avatar_upload_requires_file() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt(USER_ID, "ana@example.com", &state.config.jwt_secret);

    let (content_type, body) = common::MultipartBuilder::new()
        .text("note", "no file here")
        .finish();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/avatar")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
