use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// A registered account as stored in the `users` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Stable identifier, never reused.
    pub id: i32,
    /// Unique login name. Tokens carry this as their subject.
    pub username: String,
    /// bcrypt hash of the password. Never sent to clients.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Optional identifier of the same person on an external messaging service.
    pub external_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Registration payload for `POST /user`.
#[derive(Debug, Deserialize, Validate)]
pub struct NewUser {
    /// Any non-empty string.
    #[validate(length(min = 1, message = "Username must not be empty"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
    #[serde(default)]
    pub external_id: Option<i64>,
}

/// Applies the registration rule for usernames to a bare string, as sent to `PUT /user`.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        let mut err = ValidationError::new("length");
        err.message = Some("Username must not be empty".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_validation() {
        let input = NewUser {
            username: "u1".to_string(),
            password: "p1".to_string(),
            external_id: None,
        };
        assert!(input.validate().is_ok());

        let input = NewUser {
            username: "name with spaces!".to_string(),
            password: "x".to_string(),
            external_id: Some(42),
        };
        assert!(input.validate().is_ok());

        let input = NewUser {
            username: "".to_string(),
            password: "p1".to_string(),
            external_id: None,
        };
        assert!(input.validate().is_err());

        let input = NewUser {
            username: "u1".to_string(),
            password: "".to_string(),
            external_id: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("u2").is_ok());
        assert!(validate_username("a").is_ok());
        assert!(validate_username("renamed user").is_ok());
        assert!(validate_username("").is_err());
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let user = User {
            id: 7,
            username: "u1".to_string(),
            password_hash: "$2b$04$secret".to_string(),
            external_id: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["username"], "u1");
        assert!(json.get("password_hash").is_none());
    }
}
