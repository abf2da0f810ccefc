//! REST Handlers
//!
//! Thin axum handlers over the mutation coordinator. Each one extracts the
//! authenticated caller, the path ids and the JSON body, delegates, and maps
//! the result to a status code. All error mapping lives in `BackendError`.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs     - Module exports
//! ├── boards.rs  - /api/boards, members, admins
//! ├── columns.rs - /api/columns, /api/boards/{id}/columns
//! └── tasks.rs   - /api/tasks, /api/columns/{id}/tasks, comments
//! ```

pub mod boards;
pub mod columns;
pub mod tasks;
