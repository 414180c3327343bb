//! Token claims and persisted refresh-token model.

use crate::models::user::Role;
use serde::{Deserialize, Serialize};

/// Whether a token proves a session or only mints new access tokens.
/// Carried as the `typ` claim so the gate can reject refresh tokens
/// presented on protected resource routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    /// Role at issuance time
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer (request URL the token was minted for)
    pub iss: String,
    /// Token kind (access or refresh)
    pub typ: TokenKind,
}

/// Persisted refresh token, one active per user. Only a SHA-256 digest of
/// the token is stored; the plaintext exists only in the client's hands.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub email: String,
    pub token_hash: String,
    /// Expiration (Unix timestamp)
    pub expires_at: i64,
    /// RFC 3339
    pub created_at: String,
}

/// Access + refresh token pair returned on login and role switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}
