//! Middleware Module
//!
//! HTTP middleware run before handlers. Currently only bearer-token
//! authentication for the `/api` surface.

pub mod auth;

pub use auth::{auth_middleware, bearer_token, resolve_session, AuthUser, AuthenticatedUser};
