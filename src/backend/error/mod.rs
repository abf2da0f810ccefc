//! Backend Error Module
//!
//! Error taxonomy shared by the coordinator, the HTTP surface and the socket
//! surface, plus the conversions that put it on the wire.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - BackendError and its category mapping
//! └── conversion.rs - IntoResponse, rejection mapping, ApiJson/ApiPath
//! ```

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use conversion::{ApiJson, ApiPath};
pub use types::BackendError;
