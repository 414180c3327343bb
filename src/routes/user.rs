// SPDX-License-Identifier: MIT

//! Protected user routes. Everything here sits behind the authorization
//! gate, which injects [`AuthUser`] as a request extension.

use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::{require_role, AuthUser};
use crate::models::{Role, TokenPair, UserProfile};
use crate::routes::request_url;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/user", get(current_user))
        .route("/api/user/profile", put(update_profile))
        .route("/api/user/switch", post(switch_role))
        .route("/api/user/logout", post(logout))
        .route("/api/user/all", get(list_users))
}

/// The authenticated user's own profile.
async fn current_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserProfile>> {
    let user = state
        .db
        .find_user_by_email(&auth.email)
        .await?
        .ok_or_else(|| AppError::UserNotFound(auth.email.clone()))?;
    Ok(Json(UserProfile::from(&user)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProfileUpdateRequest {
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    #[validate(length(min = 7, max = 15))]
    pub phone_number: String,
}

/// Update name and phone number.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<ProfileUpdateRequest>,
) -> Result<Json<UserProfile>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    state
        .db
        .update_profile(
            &auth.email,
            &payload.first_name,
            &payload.last_name,
            &payload.phone_number,
        )
        .await?;

    let user = state
        .db
        .find_user_by_email(&auth.email)
        .await?
        .ok_or_else(|| AppError::UserNotFound(auth.email.clone()))?;

    Ok(Json(UserProfile::from(&user)))
}

#[derive(Debug, Deserialize)]
pub struct SwitchRoleRequest {
    pub role: Role,
}

/// Switch between owner and borrower. Returns a fresh token pair; the
/// presented access token stops validating once the stored role changes.
async fn switch_role(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    headers: HeaderMap,
    Json(payload): Json<SwitchRoleRequest>,
) -> Result<Json<TokenPair>> {
    // Nobody self-promotes to admin, and guest is not a switch target.
    require_role(&auth, &[Role::Owner, Role::Borrower])?;
    if !matches!(payload.role, Role::Owner | Role::Borrower) {
        return Err(AppError::BadRequest(
            "can only switch between OWNER and BORROWER".to_string(),
        ));
    }

    let issuer = request_url(&headers, "/api/user/switch");
    let pair = state
        .auth
        .switch_role(&auth.email, payload.role, &issuer)
        .await?;
    Ok(Json(pair))
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Invalidate the stored refresh token.
async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<MessageResponse>> {
    state.auth.logout(&auth.email).await?;
    Ok(Json(MessageResponse {
        message: "logged out".to_string(),
    }))
}

/// Admin-only listing of all accounts.
async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<UserProfile>>> {
    require_role(&auth, &[Role::Admin])?;

    let users = state.db.list_users().await?;
    Ok(Json(users.iter().map(UserProfile::from).collect()))
}
