/**
 * Authentication Handler Types
 *
 * Request and response bodies shared by the signup, login and me handlers.
 */

use serde::{Deserialize, Serialize};

use crate::shared::{SharedError, UserProfile};

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    /// Handle shown to other board members
    pub user_name: String,
    pub email: String,
    /// Hashed before storage
    pub password: String,
}

impl SignupRequest {
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.name.trim().is_empty() {
            return Err(SharedError::validation("name", "must not be empty"));
        }
        if !is_valid_user_name(&self.user_name) {
            return Err(SharedError::validation(
                "userName",
                "must be 3-30 chars, start with a letter, and contain only letters, numbers, and underscores",
            ));
        }
        if !self.email.contains('@') {
            return Err(SharedError::validation("email", "invalid email format"));
        }
        if self.password.len() < 8 {
            return Err(SharedError::validation("password", "must be at least 8 characters"));
        }
        Ok(())
    }
}

/// Handles are 3-30 chars, start with a letter, then letters, digits or `_`
fn is_valid_user_name(user_name: &str) -> bool {
    if user_name.len() < 3 || user_name.len() > 30 {
        return false;
    }
    let mut chars = user_name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by signup and login
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthResponse {
    /// JWT token (30-day expiration)
    pub token: String,
    pub user: UserProfile,
}
