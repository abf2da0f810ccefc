#![recursion_limit = "256"]

//! Taskboard - Collaborative Task Board Backend
//!
//! A multi-user, Trello-style board service. Boards hold ordered columns,
//! columns hold ordered tasks, and every change made by one user is pushed
//! to everyone else looking at the same board.
//!
//! # Module Structure
//!
//! - **`shared`** - plain serializable types: documents, request payloads,
//!   realtime events, validation errors
//! - **`backend`** - the axum server and everything behind it
//!
//! # Usage
//!
//! ```rust,no_run
//! use taskboard::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(ServerConfig::from_env()?).await;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Ordering
//!
//! Columns within a board and tasks within a column carry dense 1-based
//! positions. Moves shift the siblings in between, removals close the gap,
//! and concurrent writers to the same parent are serialized per parent.

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
