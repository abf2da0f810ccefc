/**
 * Real-time Event Delivery
 *
 * Events are queued per connection on a bounded `mpsc` channel and drained
 * by that connection's socket task. Queuing never waits: a full or closed
 * queue is a `DeliveryError`, which the router logs and otherwise ignores.
 * A committed mutation is never rolled back or failed because a peer could
 * not be reached.
 */

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::backend::realtime::rooms::ConnectionId;
use crate::shared::RealtimeEvent;

/// Sending half of a connection's outbound queue
pub type EventSender = mpsc::Sender<Arc<RealtimeEvent>>;

/// Receiving half, owned by the socket task
pub type EventReceiver = mpsc::Receiver<Arc<RealtimeEvent>>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The connection is not draining its queue fast enough
    #[error("outbound queue of {0} is full")]
    Backpressure(ConnectionId),

    /// The socket task is gone
    #[error("connection {0} is closed")]
    Closed(ConnectionId),

    #[error("connection {0} is not registered")]
    UnknownConnection(ConnectionId),
}

/// Queue one event without waiting
pub fn deliver(
    connection: ConnectionId,
    sender: &EventSender,
    event: Arc<RealtimeEvent>,
) -> Result<(), DeliveryError> {
    sender.try_send(event).map_err(|err| match err {
        TrySendError::Full(_) => DeliveryError::Backpressure(connection),
        TrySendError::Closed(_) => DeliveryError::Closed(connection),
    })
}
