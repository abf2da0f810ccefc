//! Authentication Module
//!
//! User records, JWT sessions and the signup/login/me handlers.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── users.rs        - User record and store lookups
//! ├── sessions.rs     - JWT token management
//! └── handlers/       - HTTP handlers
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Signup**: name, handle, email and password → user created → token returned
//! 2. **Login**: email and password → credentials verified → token returned
//! 3. **Every other request**: bearer token → verified → user re-resolved from the store
//!
//! # Security
//!
//! - Passwords are hashed with bcrypt before storage
//! - Tokens expire after 30 days
//! - Invalid credentials return 401 without saying which part was wrong

/// User data model and store operations
pub mod users;

/// JWT token generation and validation
pub mod sessions;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use handlers::types::{AuthResponse, LoginRequest, SignupRequest};
pub use handlers::{get_me, login, signup};
pub use sessions::{Claims, SessionKeys};
