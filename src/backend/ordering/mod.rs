//! Ordered Collection Module
//!
//! Maintains dense 1-based positions for columns within a board and tasks
//! within a column.
//!
//! # Module Structure
//!
//! ```text
//! ordering/
//! ├── mod.rs        - Module exports
//! ├── sequence.rs   - Pure shift/insert/remove/reorder over sibling lists
//! ├── scopes.rs     - Per-parent locks, taken in ascending id order
//! └── collection.rs - Store-backed manager with bounded conflict retry
//! ```

/// Pure position arithmetic
pub mod sequence;

/// Per-parent mutual exclusion
pub mod scopes;

/// Store-backed collection manager
pub mod collection;

pub use collection::{ColumnSource, MoveOutcome, OrderedCollection, Removal, SiblingSource, TaskSource};
pub use scopes::ParentScopes;
pub use sequence::{OrderingError, Positioned};
