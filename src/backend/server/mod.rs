//! Server Module
//!
//! Configuration, application state and startup.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs     - Module exports
//! ├── config.rs  - ServerConfig from the environment, database loading
//! ├── state.rs   - AppState and its FromRef extractors
//! └── init.rs    - create_app, store selection, housekeeping task
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use taskboard::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! let app = create_app(config).await;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::{ConfigError, ServerConfig};
pub use init::{build_state, create_app};
pub use state::AppState;
