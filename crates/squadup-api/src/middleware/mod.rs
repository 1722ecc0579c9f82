//! API Middleware

pub mod auth;

pub use auth::{extract_token, require_auth, SESSION_COOKIE};
pub use crate::auth_gateway::AuthUser;
