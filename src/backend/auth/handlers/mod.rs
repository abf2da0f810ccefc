//! Authentication Handlers Module
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs      - Module exports
//! ├── types.rs    - Request/response types
//! ├── signup.rs   - POST /api/auth/signup
//! ├── login.rs    - POST /api/auth/login
//! └── me.rs       - GET /api/auth/me
//! ```

/// Request and response types
pub mod types;

/// Signup handler
pub mod signup;

/// Login handler
pub mod login;

/// Get current user handler
pub mod me;

pub use types::{AuthResponse, LoginRequest, SignupRequest};

pub use login::login;
pub use me::get_me;
pub use signup::signup;
