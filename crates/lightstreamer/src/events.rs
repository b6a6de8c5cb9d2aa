use std::fmt;

use crate::decoder::ItemUpdate;
use crate::subscription::SubscriptionId;

/// Everything the session task reports back to its owner.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A create request is about to be sent (first attempt or reconnect).
    Connecting,
    Connected {
        session_id: String,
    },
    Subscribed {
        subscription: SubscriptionId,
        items: usize,
        fields: usize,
    },
    Update(ItemUpdate),
    SubscriptionError {
        subscription: SubscriptionId,
        code: i32,
        message: String,
    },
    Disconnected {
        reason: DisconnectReason,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The owner called `stop`.
    Stopped,
    /// The HTTP body ended without END or LOOP.
    StreamClosed,
    ServerClosed { code: i32, message: String },
    /// CONERR on session creation.
    Refused { code: i32, message: String },
    /// Nothing arrived within keepalive plus margin.
    Stalled,
    Transport(String),
}

impl DisconnectReason {
    /// Whether another session attempt makes sense after this.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, DisconnectReason::Stopped)
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisconnectReason::Stopped => f.write_str("stopped"),
            DisconnectReason::StreamClosed => f.write_str("stream closed by peer"),
            DisconnectReason::ServerClosed { code, message } => {
                write!(f, "server ended session ({code}): {message}")
            }
            DisconnectReason::Refused { code, message } => {
                write!(f, "session refused ({code}): {message}")
            }
            DisconnectReason::Stalled => f.write_str("stream stalled"),
            DisconnectReason::Transport(err) => write!(f, "transport error: {err}"),
        }
    }
}
