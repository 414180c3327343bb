// SPDX-License-Identifier: MIT

//! Public authentication routes: signup, login, token refresh.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::{Role, TokenPair, UserProfile};
use crate::routes::request_url;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    #[validate(length(min = 7, max = 15))]
    pub phone_number: String,
    pub role: Role,
}

/// Register a new account.
async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<UserProfile>)> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user = state
        .auth
        .signup(
            &payload.email,
            &payload.password,
            &payload.first_name,
            &payload.last_name,
            &payload.phone_number,
            payload.role,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(UserProfile::from(&user))))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Verify credentials and hand out an access/refresh token pair.
async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenPair>> {
    let issuer = request_url(&headers, "/auth/login");
    let pair = state
        .auth
        .login(&payload.email, &payload.password, &issuer)
        .await?;
    Ok(Json(pair))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Mint a new access token from the refresh token in the bearer slot.
///
/// This is the only route where a refresh token is accepted; the
/// authorization gate rejects refresh tokens everywhere else.
async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    let issuer = request_url(&headers, "/auth/refresh");
    let access_token = state.auth.refresh(token, &issuer).await?;

    Ok(Json(RefreshResponse { access_token }))
}
