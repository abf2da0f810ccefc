/**
 * Signup Handler
 *
 * POST /api/auth/signup
 *
 * 1. Validate name, handle, email and password length
 * 2. Hash the password with bcrypt
 * 3. Create the user (duplicate email is a validation error)
 * 4. Issue a token and return it with the public profile
 */

use axum::{extract::State, http::StatusCode, Json};
use bcrypt::{hash, DEFAULT_COST};

use crate::backend::auth::handlers::types::{AuthResponse, SignupRequest};
use crate::backend::auth::users::create_user;
use crate::backend::error::{ApiJson, BackendError};
use crate::backend::server::state::AppState;

pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), BackendError> {
    request.validate()?;
    tracing::info!("[Auth] Signup request for {}", request.user_name);

    let password_hash = hash(&request.password, DEFAULT_COST).map_err(|e| {
        tracing::error!("[Auth] Failed to hash password: {:?}", e);
        BackendError::validation("password", "could not be processed")
    })?;

    let user = create_user(
        state.store.as_ref(),
        request.name.trim().to_string(),
        request.user_name.trim().to_string(),
        request.email,
        password_hash,
    )
    .await?;

    let token = state.sessions.create_token(user.id, &user.email)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.profile(),
        }),
    ))
}
