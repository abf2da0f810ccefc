/**
 * Get Current User Handler
 *
 * GET /api/auth/me, behind the auth middleware. Returns the public profile
 * of the caller, freshly read from the store.
 */

use axum::{extract::State, Json};

use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::UserProfile;

pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<UserProfile>, BackendError> {
    let user = get_user_by_id(state.store.as_ref(), user.user_id)
        .await?
        .ok_or_else(|| BackendError::unauthorized("user no longer exists"))?;
    Ok(Json(user.profile()))
}
