/**
 * Login Handler
 *
 * POST /api/auth/login
 *
 * Unknown email and wrong password produce the same 401 so that the
 * response does not reveal which accounts exist.
 */

use axum::{extract::State, Json};
use bcrypt::verify;

use crate::backend::auth::handlers::types::{AuthResponse, LoginRequest};
use crate::backend::auth::users::get_user_by_email;
use crate::backend::error::{ApiJson, BackendError};
use crate::backend::server::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, BackendError> {
    let rejected = || BackendError::unauthorized("invalid email or password");

    let user = get_user_by_email(state.store.as_ref(), &request.email)
        .await?
        .ok_or_else(|| {
            tracing::debug!("[Auth] Login for unknown email");
            rejected()
        })?;

    let valid = verify(&request.password, &user.password_hash).map_err(|e| {
        tracing::error!("[Auth] Password verification error: {:?}", e);
        rejected()
    })?;
    if !valid {
        tracing::warn!("[Auth] Invalid password for {}", user.id);
        return Err(rejected());
    }

    let token = state.sessions.create_token(user.id, &user.email)?;
    tracing::info!("[Auth] {} logged in", user.user_name);

    Ok(Json(AuthResponse {
        token,
        user: user.profile(),
    }))
}
