/**
 * Authentication Middleware
 *
 * Protects every `/api` route except signup and login. The bearer token is
 * verified, the user is re-resolved from the store and the email claim must
 * still match; any failure is a 401. The resolved identity is attached to
 * the request extensions for the `AuthUser` extractor.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::backend::auth::sessions::SessionKeys;
use crate::backend::auth::users::User;
use crate::backend::error::BackendError;
use crate::backend::mutations::Caller;
use crate::backend::server::state::AppState;
use crate::backend::store::DocumentStore;

/// Authenticated user data attached by the middleware
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub user_name: String,
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            user_name: user.display_name().to_string(),
        }
    }
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Verify a token and resolve its user. Fails closed: a valid signature for
/// a user that no longer exists, or whose email changed, is rejected.
pub async fn resolve_session(
    store: &dyn DocumentStore,
    keys: &SessionKeys,
    token: &str,
) -> Result<User, BackendError> {
    let claims = keys.verify_token(token)?;
    let user_id = claims.user_id()?;

    let user = store
        .get_user(user_id)
        .await?
        .ok_or_else(|| BackendError::unauthorized("user no longer exists"))?;

    if user.email != claims.email {
        tracing::warn!("[Auth] Email claim mismatch for {}", user_id);
        return Err(BackendError::unauthorized("token does not match user"));
    }
    Ok(user)
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let token = bearer_token(request.headers()).ok_or_else(|| {
        tracing::debug!("[Auth] Missing bearer token for {}", request.uri());
        BackendError::unauthorized("missing bearer token")
    })?;

    let user = resolve_session(state.store.as_ref(), &state.sessions, token).await?;
    request.extensions_mut().insert(AuthenticatedUser::from(&user));

    Ok(next.run(request).await)
}

/// Extractor for the user attached by `auth_middleware`
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl AuthUser {
    pub fn caller(&self) -> Caller {
        Caller::rest(self.0.user_id)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                tracing::warn!("[Auth] AuthenticatedUser not found in request extensions");
                BackendError::unauthorized("not authenticated")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::store::MemoryStore;
    use axum::http::HeaderValue;

    async fn stored_user(store: &MemoryStore) -> User {
        let user = User::new(
            "Ada".to_string(),
            "ada".to_string(),
            "ada@example.com".to_string(),
            "hash".to_string(),
        );
        store.put_user(&user).await.unwrap();
        user
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));
    }

    #[tokio::test]
    async fn test_resolve_session() {
        let store = MemoryStore::new();
        let keys = SessionKeys::new("secret");
        let user = stored_user(&store).await;
        let token = keys.create_token(user.id, &user.email).unwrap();

        let resolved = resolve_session(&store, &keys, &token).await.unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn test_unknown_user_fails_closed() {
        let store = MemoryStore::new();
        let keys = SessionKeys::new("secret");
        let token = keys.create_token(Uuid::new_v4(), "ghost@example.com").unwrap();

        let err = resolve_session(&store, &keys, &token).await.unwrap_err();
        assert!(matches!(err, BackendError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_email_mismatch_is_rejected() {
        let store = MemoryStore::new();
        let keys = SessionKeys::new("secret");
        let user = stored_user(&store).await;
        let token = keys.create_token(user.id, "someone-else@example.com").unwrap();

        assert!(resolve_session(&store, &keys, &token).await.is_err());
    }
}
