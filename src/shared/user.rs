/**
 * Public User Profile
 *
 * The subset of a user record that is safe to return to other clients.
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub user_name: String,
    pub email: String,
}
