// SPDX-License-Identifier: MIT

use lendhub::config::Config;
use lendhub::db::Database;
use lendhub::models::{NewUser, Role, User};
use lendhub::routes::create_router;
use lendhub::AppState;
use std::sync::Arc;

/// Create a test app backed by an in-memory database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = Database::in_memory()
        .await
        .expect("Failed to open in-memory database");
    let state = Arc::new(AppState::new(config, db));
    (create_router(state.clone()), state)
}

/// Insert a user directly, bypassing the signup route. Uses a low bcrypt
/// cost to keep the test suite fast.
#[allow(dead_code)]
pub async fn insert_user(
    state: &Arc<AppState>,
    email: &str,
    phone_number: &str,
    password: &str,
    role: Role,
) -> User {
    let password_hash = bcrypt::hash(password, 4).expect("bcrypt hash");
    state
        .db
        .insert_user(&NewUser {
            email: email.to_string(),
            password_hash,
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            phone_number: phone_number.to_string(),
            role,
        })
        .await
        .expect("insert test user")
}
