//! Session tokens and password hashing for SquadUp accounts

pub mod jwt;
pub mod password;

pub use jwt::{JwtClaims, JwtError, JwtValidator, SESSION_TOKEN_TYPE};
pub use password::{
    check_password_strength, hash_password, verify_password, PasswordError, MIN_PASSWORD_LEN,
};
