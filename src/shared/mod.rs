//! Shared Module
//!
//! Types shared between the backend and its clients: the board, column and
//! task documents, mutation payloads, realtime events and validation errors.
//! Everything here is plain serializable data.

/// Board document and membership roster
pub mod board;

/// Column document
pub mod column;

/// Task and comment documents
pub mod task;

/// Public user profile
pub mod user;

/// Mutation request payloads
pub mod requests;

/// Real-time event system
pub mod event;

/// Shared error types
pub mod error;

/// Re-export commonly used types for convenience
pub use board::{Board, Visibility};
pub use column::{Column, ColumnWithTasks};
pub use error::SharedError;
pub use event::{Actor, EventType, RealtimeEvent};
pub use task::{Comment, Task};
pub use user::UserProfile;
