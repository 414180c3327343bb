//! Data models shared by storage, services, and routes.

pub mod token;
pub mod user;

pub use token::{Claims, RefreshTokenRecord, TokenKind, TokenPair};
pub use user::{NewUser, Role, User, UserProfile};
