// SPDX-License-Identifier: MIT

//! Authorization gate tests.
//!
//! These tests verify that:
//! 1. Public allow-listed routes reach their handler with no credentials
//! 2. Protected routes reject missing, stale, and garbage tokens with the
//!    documented statuses and the `error_message` body contract
//! 3. Refresh tokens are never accepted on protected resource routes

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
};
use lendhub::models::{Role, TokenKind};
use tower::ServiceExt;

mod common;

async fn get_api_user(app: axum::Router, bearer: Option<&str>) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method("GET").uri("/api/user");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let response = app
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_public_route_no_auth_required() {
    let (app, _) = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_protected_route_without_token() {
    let (app, _) = common::create_test_app().await;

    let (status, body) = get_api_user(app, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error_message"].is_string());
}

#[tokio::test]
async fn test_protected_route_with_garbage_token_is_403_not_500() {
    let (app, _) = common::create_test_app().await;

    let (status, body) = get_api_user(app, Some("not-a-jwt-at-all")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error_message"].is_string());
}

#[tokio::test]
async fn test_protected_route_with_expired_token() {
    let (app, state) = common::create_test_app().await;
    common::insert_user(&state, "a@example.com", "5550001111", "password123", Role::Borrower).await;

    let expired = state
        .tokens
        .issue("a@example.com", Role::Borrower, TokenKind::Access, -5, "test")
        .unwrap();

    let (status, body) = get_api_user(app, Some(&expired)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_message"], "token has expired");
}

#[tokio::test]
async fn test_protected_route_with_valid_token() {
    let (app, state) = common::create_test_app().await;
    common::insert_user(&state, "a@example.com", "5550001111", "password123", Role::Owner).await;

    let token = state
        .tokens
        .issue("a@example.com", Role::Owner, TokenKind::Access, 15, "test")
        .unwrap();

    let (status, body) = get_api_user(app, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "a@example.com");
    assert_eq!(body["role"], "OWNER");
    // Password hash must never appear in API output
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_refresh_token_rejected_on_protected_route() {
    let (app, state) = common::create_test_app().await;
    common::insert_user(&state, "a@example.com", "5550001111", "password123", Role::Owner).await;

    let refresh = state
        .tokens
        .issue("a@example.com", Role::Owner, TokenKind::Refresh, 10_080, "test")
        .unwrap();

    let (status, _) = get_api_user(app, Some(&refresh)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_for_unknown_user_rejected() {
    let (app, state) = common::create_test_app().await;

    let token = state
        .tokens
        .issue("ghost@example.com", Role::Owner, TokenKind::Access, 15, "test")
        .unwrap();

    let (status, _) = get_api_user(app, Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_wrong_secret_rejected() {
    let (app, state) = common::create_test_app().await;
    common::insert_user(&state, "a@example.com", "5550001111", "password123", Role::Owner).await;

    let forged = lendhub::services::TokenService::new(b"attacker_controlled_32_byte_key!")
        .issue("a@example.com", Role::Owner, TokenKind::Access, 15, "test")
        .unwrap();

    let (status, _) = get_api_user(app, Some(&forged)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_route_requires_admin_role() {
    let (app, state) = common::create_test_app().await;
    common::insert_user(&state, "b@example.com", "5550002222", "password123", Role::Borrower).await;
    common::insert_user(&state, "admin@example.com", "5550009999", "password123", Role::Admin).await;

    let borrower_token = state
        .tokens
        .issue("b@example.com", Role::Borrower, TokenKind::Access, 15, "test")
        .unwrap();
    let admin_token = state
        .tokens
        .issue("admin@example.com", Role::Admin, TokenKind::Access, 15, "test")
        .unwrap();

    let forbidden = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/user/all")
                .header(header::AUTHORIZATION, format!("Bearer {}", borrower_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let allowed = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/user/all")
                .header(header::AUTHORIZATION, format!("Bearer {}", admin_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(allowed.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _) = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/user")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}
