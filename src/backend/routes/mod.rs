//! Routes Module
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs         - Module exports
//! ├── router.rs      - create_router: socket, API, layers, fallback
//! └── api_routes.rs  - /api route table and auth layer
//! ```

pub mod router;

pub mod api_routes;

pub use router::create_router;
