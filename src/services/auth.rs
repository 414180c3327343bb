// SPDX-License-Identifier: MIT

//! Authentication service: signup, login, token refresh, role switch.
//!
//! Login failures are a single generic error so responses never reveal
//! whether the email or the password was wrong, and a dummy bcrypt
//! verification keeps the miss path on the same timing as the hit path.

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{NewUser, Role, TokenKind, TokenPair, User};
use crate::services::token::TokenService;
use subtle::ConstantTimeEq;

/// A syntactically valid bcrypt digest that matches no password, verified
/// on login when the email is unknown so both paths cost one hash.
const DUMMY_BCRYPT_HASH: &str = "$2b$12$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy";

#[derive(Clone)]
pub struct AuthService {
    db: Database,
    tokens: TokenService,
    access_token_minutes: i64,
    refresh_token_minutes: i64,
}

impl AuthService {
    pub fn new(
        db: Database,
        tokens: TokenService,
        access_token_minutes: i64,
        refresh_token_minutes: i64,
    ) -> Self {
        Self {
            db,
            tokens,
            access_token_minutes,
            refresh_token_minutes,
        }
    }

    /// Register a new account. Email and phone number must both be unused.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
        phone_number: &str,
        role: Role,
    ) -> Result<User> {
        if self.db.find_user_by_email(email).await?.is_some() {
            return Err(AppError::Conflict(
                "email already associated with another user".to_string(),
            ));
        }
        if self.db.find_user_by_phone(phone_number).await?.is_some() {
            return Err(AppError::Conflict(
                "phone number already associated with another user".to_string(),
            ));
        }

        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {}", e)))?;

        let user = self
            .db
            .insert_user(&NewUser {
                email: email.to_string(),
                password_hash,
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                phone_number: phone_number.to_string(),
                role,
            })
            .await?;

        tracing::info!(email, role = %user.role, "User registered");
        Ok(user)
    }

    /// Verify credentials and mint an access/refresh token pair. The
    /// refresh token digest is persisted keyed by email, replacing any
    /// prior token for that user.
    pub async fn login(&self, email: &str, password: &str, issuer: &str) -> Result<TokenPair> {
        let user = self.db.find_user_by_email(email).await?;

        let password_hash = user
            .as_ref()
            .map(|u| u.password_hash.as_str())
            .unwrap_or(DUMMY_BCRYPT_HASH);

        let verified = bcrypt::verify(password, password_hash).unwrap_or(false);

        let user = match user {
            Some(user) if verified => user,
            _ => {
                tracing::info!(email, "Login failed");
                return Err(AppError::AuthenticationFailed);
            }
        };

        let pair = self.issue_pair(&user, issuer).await?;
        tracing::info!(email, role = %user.role, "Login successful");
        Ok(pair)
    }

    /// Mint a new access token from a refresh token.
    ///
    /// The token must decode, carry `typ=refresh`, be unexpired, belong to
    /// an existing user, and match the persisted digest for that user.
    /// The new access token carries the user's *current* role, not the
    /// role claim frozen inside the refresh token.
    pub async fn refresh(&self, refresh_token: &str, issuer: &str) -> Result<String> {
        let claims = self.tokens.decode(refresh_token).map_err(|e| match e {
            // At the refresh endpoint any undecodable credential is a 401.
            AppError::TokenMalformed | AppError::TokenInvalid => AppError::TokenInvalid,
            other => other,
        })?;

        if claims.typ != TokenKind::Refresh {
            return Err(AppError::TokenInvalid);
        }
        if self.tokens.is_expired(&claims) {
            return Err(AppError::TokenExpired);
        }

        let user = self
            .db
            .find_user_by_email(&claims.sub)
            .await?
            .ok_or_else(|| AppError::UserNotFound(claims.sub.clone()))?;

        let stored = self
            .db
            .find_refresh_token(&user.email)
            .await?
            .ok_or(AppError::TokenInvalid)?;

        let presented_hash = TokenService::hash_token(refresh_token);
        let matches: bool = presented_hash
            .as_bytes()
            .ct_eq(stored.token_hash.as_bytes())
            .into();
        if !matches {
            return Err(AppError::TokenInvalid);
        }
        if stored.expires_at <= chrono::Utc::now().timestamp() {
            return Err(AppError::TokenExpired);
        }

        let access_token = self.tokens.issue(
            &user.email,
            user.role,
            TokenKind::Access,
            self.access_token_minutes,
            issuer,
        )?;

        tracing::info!(email = %user.email, "Access token refreshed");
        Ok(access_token)
    }

    /// Switch a user between marketplace roles and mint a fresh token
    /// pair. Outstanding access tokens carrying the old role stop passing
    /// the gate's role-consistency check immediately.
    pub async fn switch_role(&self, email: &str, role: Role, issuer: &str) -> Result<TokenPair> {
        let user = self
            .db
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| AppError::UserNotFound(email.to_string()))?;

        self.db.update_role(&user.email, role).await?;
        let user = User { role, ..user };

        let pair = self.issue_pair(&user, issuer).await?;
        tracing::info!(email, role = %role, "Role switched");
        Ok(pair)
    }

    /// Drop the persisted refresh token so no further access tokens can be
    /// minted. The short access-token lifetime bounds what remains usable.
    pub async fn logout(&self, email: &str) -> Result<()> {
        self.db.delete_refresh_token(email).await?;
        tracing::info!(email, "Logged out");
        Ok(())
    }

    async fn issue_pair(&self, user: &User, issuer: &str) -> Result<TokenPair> {
        let access_token = self.tokens.issue(
            &user.email,
            user.role,
            TokenKind::Access,
            self.access_token_minutes,
            issuer,
        )?;
        let refresh_token = self.tokens.issue(
            &user.email,
            user.role,
            TokenKind::Refresh,
            self.refresh_token_minutes,
            issuer,
        )?;

        let expires_at =
            chrono::Utc::now().timestamp() + self.refresh_token_minutes * 60;
        self.db
            .upsert_refresh_token(
                &user.email,
                &TokenService::hash_token(&refresh_token),
                expires_at,
            )
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}
