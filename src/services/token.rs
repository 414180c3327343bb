// SPDX-License-Identifier: MIT

//! Token codec: issue, decode, and expiry-check signed tokens.
//!
//! Tokens are HS256 JWTs carrying subject (email), role, expiration,
//! issuer, and a `typ` claim distinguishing access from refresh tokens.
//! `decode` only verifies the signature and shape; expiration is checked
//! separately via [`TokenService::is_expired`] so callers decide how to
//! react to expired-but-authentic claims.

use crate::error::AppError;
use crate::models::{Claims, Role, TokenKind};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sha2::{Digest, Sha256};

/// Stateless codec around the process-wide signing secret. The keys are
/// derived once from the secret loaded at startup; rotating the secret
/// invalidates everything issued before.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Build and sign a token. No side effects beyond signing.
    pub fn issue(
        &self,
        subject: &str,
        role: Role,
        kind: TokenKind,
        ttl_minutes: i64,
        issuer: &str,
    ) -> Result<String, AppError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            role,
            exp: now + ttl_minutes * 60,
            iat: now,
            iss: issuer.to_string(),
            typ: kind,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("token signing failed: {}", e)))
    }

    /// Verify the signature and recover the claims.
    ///
    /// Expired claims are returned as-is; only signature or structural
    /// failures are errors. `TokenMalformed` means the input was not a
    /// parseable JWT at all, `TokenInvalid` means it parsed but the
    /// signature did not verify.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AppError::TokenInvalid,
                _ => AppError::TokenMalformed,
            })
    }

    /// Whether the claims' expiration has passed. A token whose `exp`
    /// equals the current second is already expired.
    pub fn is_expired(&self, claims: &Claims) -> bool {
        claims.exp <= chrono::Utc::now().timestamp()
    }

    /// SHA-256 digest of a token, hex-encoded, for at-rest storage of
    /// refresh tokens.
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenService {
        TokenService::new(b"test_jwt_key_32_bytes_minimum!!!")
    }

    #[test]
    fn test_issue_decode_round_trip() {
        let tokens = codec();
        let token = tokens
            .issue(
                "owner@example.com",
                Role::Owner,
                TokenKind::Access,
                15,
                "http://localhost:8080/auth/login",
            )
            .unwrap();

        let claims = tokens.decode(&token).unwrap();
        assert_eq!(claims.sub, "owner@example.com");
        assert_eq!(claims.role, Role::Owner);
        assert_eq!(claims.iss, "http://localhost:8080/auth/login");
        assert_eq!(claims.typ, TokenKind::Access);
        assert_eq!(claims.exp, claims.iat + 15 * 60);
        assert!(!tokens.is_expired(&claims));
    }

    #[test]
    fn test_decode_returns_expired_claims_silently() {
        let tokens = codec();
        let token = tokens
            .issue("a@example.com", Role::Borrower, TokenKind::Access, -5, "test")
            .unwrap();

        // decode succeeds even though the token is past its expiration
        let claims = tokens.decode(&token).unwrap();
        assert!(tokens.is_expired(&claims));
    }

    #[test]
    fn test_expiration_boundary_now_counts_as_expired() {
        let tokens = codec();
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: "a@example.com".to_string(),
            role: Role::Guest,
            exp: now,
            iat: now - 60,
            iss: "test".to_string(),
            typ: TokenKind::Access,
        };
        assert!(tokens.is_expired(&claims));

        let future = Claims { exp: now + 3600, ..claims };
        assert!(!tokens.is_expired(&future));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let err = codec().decode("not-a-jwt").unwrap_err();
        assert!(matches!(err, AppError::TokenMalformed));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = codec()
            .issue("a@example.com", Role::Admin, TokenKind::Access, 15, "test")
            .unwrap();

        let other = TokenService::new(b"another_secret_32_bytes_minimum!");
        let err = other.decode(&token).unwrap_err();
        assert!(matches!(err, AppError::TokenInvalid));
    }

    #[test]
    fn test_hash_token_stable_and_hex() {
        let h1 = TokenService::hash_token("abc");
        let h2 = TokenService::hash_token("abc");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert_ne!(h1, TokenService::hash_token("abd"));
    }
}
