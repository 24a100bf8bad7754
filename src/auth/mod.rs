pub mod authenticator;
pub mod extractors;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};

use crate::{config::Config, error::AppError};

// Re-export necessary items
pub use authenticator::{authenticate, resolve};
pub use extractors::AuthenticatedUser;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenKeys};

/// Authentication settings shared with handlers through `web::Data`.
#[derive(Clone)]
pub struct AuthSettings {
    pub tokens: TokenKeys,
    pub bcrypt_cost: u32,
    /// Hash of a random throwaway password at `bcrypt_cost`. Logins for unknown
    /// users are verified against it so they cost as much as a wrong password.
    pub dummy_hash: String,
}

impl AuthSettings {
    pub fn new(tokens: TokenKeys, bcrypt_cost: u32) -> Result<Self, AppError> {
        Ok(Self {
            tokens,
            bcrypt_cost,
            dummy_hash: password::dummy_hash(bcrypt_cost)?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(TokenKeys::from_config(config), config.bcrypt_cost)
    }
}

/// Credential exchange form for `POST /token` (`application/x-www-form-urlencoded`).
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Returned by `POST /token`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}
