//! Backend Module
//!
//! All server-side code for the collaborative task board: an axum HTTP API,
//! a WebSocket endpoint for live updates, and the components behind them.
//!
//! # Architecture
//!
//! - **`server`** - configuration, application state, startup
//! - **`routes`** - route table and middleware layers
//! - **`handlers`** - REST handlers for boards, columns and tasks
//! - **`auth`** - users, JWT sessions, signup/login/me
//! - **`middleware`** - bearer-token authentication
//! - **`store`** - document persistence (memory or Postgres)
//! - **`guard`** - board membership and permission decisions
//! - **`ordering`** - dense positions for columns and tasks
//! - **`realtime`** - connections, rooms, socket protocol
//! - **`mutations`** - the coordinator every persisted change goes through
//! - **`error`** - `BackendError` and its HTTP mapping
//!
//! # Request Flow
//!
//! ```text
//! REST handler ─┐
//!               ├─► MutationCoordinator ─► BoardGuard ─► OrderedCollection ─► DocumentStore
//! socket frame ─┘            │
//!                            └─► RoomRouter::emit (after the write commits)
//! ```
//!
//! Ephemeral socket signals (cursor, typing, drag preview) bypass the
//! coordinator and are relayed by the room router to the rest of the room.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// REST handlers
pub mod handlers;

/// Authentication and user management
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// Document store
pub mod store;

/// Board membership guard
pub mod guard;

/// Ordered collection manager
pub mod ordering;

/// Real-time rooms and socket endpoint
pub mod realtime;

/// Mutation coordinator
pub mod mutations;

/// Backend error types
pub mod error;

pub use error::BackendError;
pub use mutations::{Caller, MutationCoordinator};
pub use server::{create_app, ServerConfig};
