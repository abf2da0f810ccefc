//! Real-time Module
//!
//! Live connections, rooms and the socket protocol.
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs       - Module exports and documentation
//! ├── broadcast.rs - per-connection outbound queues and delivery errors
//! ├── presence.rs  - user → live connections
//! ├── rooms.rs     - RoomRouter: connections, rooms, fan-out
//! ├── protocol.rs  - client frames
//! ├── dispatch.rs  - per-connection frame handling
//! └── socket.rs    - GET /ws upgrade and frame pump
//! ```
//!
//! # Delivery
//!
//! Events are fire-and-forget. Emitting never fails the caller: a full or
//! closed connection queue is logged and the event is dropped for that
//! connection only.

/// Outbound queues and delivery errors
pub mod broadcast;

/// Presence registry
pub mod presence;

/// Room router
pub mod rooms;

/// Client frame definitions
pub mod protocol;

/// Per-connection frame dispatch
pub mod dispatch;

/// WebSocket endpoint
pub mod socket;

pub use broadcast::{DeliveryError, EventReceiver, EventSender};
pub use dispatch::SocketSession;
pub use presence::PresenceRegistry;
pub use protocol::ClientMessage;
pub use rooms::{ConnectionId, RoomKey, RoomRouter};
pub use socket::{close_session, handle_socket_upgrade, open_session};
