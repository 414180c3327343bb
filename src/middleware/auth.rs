// SPDX-License-Identifier: MIT

//! JWT authorization gate for protected routes.
//!
//! Applied as a `route_layer` on the protected router; public routes never
//! see it, which makes the public router the allow-list. The gate checks,
//! in order: bearer header present, token decodes, token is an access
//! token, token unexpired, and the role claim still matches the user's
//! stored role (a role switch invalidates older access tokens).
//!
//! Garbage that does not even parse as a JWT is answered with 403 and the
//! request pipeline stays alive; authentic-but-stale credentials get 401.

use crate::error::{AppError, Result};
use crate::models::{Role, TokenKind};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Authenticated principal extracted from a verified access token,
/// available to handlers as a request extension.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
    pub role: Role,
}

/// Middleware that requires a valid access token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let token = bearer_token(&request).ok_or(AppError::Unauthorized)?;

    let claims = state.tokens.decode(&token).map_err(|e| match e {
        // Unparseable garbage is treated as a validation exception, not a
        // stale credential: 403, never a 500.
        AppError::TokenMalformed => AppError::Forbidden("token validation failed".to_string()),
        other => other,
    })?;

    if state.tokens.is_expired(&claims) {
        return Err(AppError::TokenExpired);
    }

    // Refresh tokens are only good for minting new access tokens on the
    // dedicated refresh route.
    if claims.typ != TokenKind::Access {
        return Err(AppError::TokenInvalid);
    }

    // Unexpected failures while validating are downgraded to 403 at the
    // gate boundary; they must not take the pipeline down as 500s.
    let user = state
        .db
        .find_user_by_email(&claims.sub)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Gate lookup failed");
            AppError::Forbidden("token validation failed".to_string())
        })?
        .ok_or(AppError::TokenInvalid)?;

    // A role switch since issuance invalidates the token.
    if user.role != claims.role {
        tracing::info!(email = %user.email, "Access token role out of date");
        return Err(AppError::TokenInvalid);
    }

    request.extensions_mut().insert(AuthUser {
        email: user.email,
        role: user.role,
    });

    Ok(next.run(request).await)
}

/// Capability check called at the top of role-restricted handlers.
pub fn require_role(user: &AuthUser, allowed: &[Role]) -> Result<()> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "role {} may not access this resource",
            user.role
        )))
    }
}

fn bearer_token(request: &Request) -> Option<String> {
    let value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;
    value.strip_prefix("Bearer ").map(|t| t.to_string())
}
