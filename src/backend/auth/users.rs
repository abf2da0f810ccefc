/**
 * User Model and Store Operations
 *
 * This module handles user records and their lookups through the document
 * store.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::store::DocumentStore;
use crate::shared::{Actor, UserProfile};

/// User record as persisted in the store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID (UUID)
    pub id: Uuid,
    /// Full name
    pub name: String,
    /// Display handle shown to other board members
    pub user_name: String,
    /// User email address (stored lowercase)
    pub email: String,
    /// Hashed password (bcrypt)
    pub password_hash: String,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, user_name: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            user_name,
            email: email.trim().to_lowercase(),
            password_hash,
            created_at: Utc::now(),
        }
    }

    /// Name shown in realtime events; falls back to the full name
    pub fn display_name(&self) -> &str {
        if self.user_name.trim().is_empty() {
            &self.name
        } else {
            &self.user_name
        }
    }

    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.display_name())
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            user_name: self.user_name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Create a new user
///
/// # Errors
/// * `Validation` - if the email is already registered
/// * `StoreUnavailable` - if the store cannot be reached
pub async fn create_user(
    store: &dyn DocumentStore,
    name: String,
    user_name: String,
    email: String,
    password_hash: String,
) -> Result<User, BackendError> {
    let user = User::new(name, user_name, email, password_hash);

    if store.find_user_by_email(&user.email).await?.is_some() {
        return Err(BackendError::validation("email", "email is already registered"));
    }

    store.put_user(&user).await?;
    tracing::info!("[Store] Created user {} ({})", user.user_name, user.id);
    Ok(user)
}

/// Get user by email
pub async fn get_user_by_email(
    store: &dyn DocumentStore,
    email: &str,
) -> Result<Option<User>, BackendError> {
    Ok(store.find_user_by_email(&email.trim().to_lowercase()).await?)
}

/// Get user by ID
pub async fn get_user_by_id(
    store: &dyn DocumentStore,
    id: Uuid,
) -> Result<Option<User>, BackendError> {
    Ok(store.get_user(id).await?)
}
