// SPDX-License-Identifier: MIT

//! LendHub: peer-to-peer rental marketplace API server.
//!
//! This crate provides the authentication and authorization core: user
//! onboarding, JWT access/refresh token rotation, and the authorization
//! gate protecting resource routes.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::Database;
use services::{AuthService, TokenService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub tokens: TokenService,
    pub auth: AuthService,
}

impl AppState {
    /// Wire up services around a connected database.
    pub fn new(config: Config, db: Database) -> Self {
        let tokens = TokenService::new(&config.jwt_signing_key);
        let auth = AuthService::new(
            db.clone(),
            tokens.clone(),
            config.access_token_minutes,
            config.refresh_token_minutes,
        );
        Self {
            config,
            db,
            tokens,
            auth,
        }
    }
}
