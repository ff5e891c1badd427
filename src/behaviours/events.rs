//! In-memory queue of gateway events awaiting processing.
//!
//! The gateway event handler only pushes onto the queue, so it never waits on the
//! database. [`super::RoleplayLoggingBehaviour`] drains it on every tick.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::warn;

/// A Discord event relevant to the background behaviours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    /// A message was posted.
    MessageCreated {
        /// Channel the message was posted in
        channel_id: String,
        /// Message snowflake
        message_id: String,
        /// Author snowflake
        author_id: String,
        /// Author display name
        author_nickname: String,
        /// Message text
        contents: String,
        /// Posting time
        timestamp: DateTime<Utc>,
        /// Whether the author is a bot
        is_bot: bool,
    },
    /// A message was edited.
    MessageUpdated {
        /// Message snowflake
        message_id: String,
        /// New message text
        contents: String,
    },
    /// A message was deleted.
    MessageDeleted {
        /// Message snowflake
        message_id: String,
    },
}

/// Receiving half of the queue, owned by the behaviour that drains it.
pub type EventReceiver = mpsc::UnboundedReceiver<GatewayEvent>;

/// Sending half of the queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct EventQueue {
    sender: mpsc::UnboundedSender<GatewayEvent>,
}

impl EventQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> (Self, EventReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Adds an event. Events pushed after the receiver is gone are dropped.
    pub fn push(&self, event: GatewayEvent) {
        if self.sender.send(event).is_err() {
            warn!("Event queue receiver is closed; dropping event");
        }
    }
}
