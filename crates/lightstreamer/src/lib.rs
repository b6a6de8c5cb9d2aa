//! Lightstreamer push client speaking TLCP over HTTP streaming.
//!
//! Only what a read-only telemetry viewer needs: create a session, add MERGE
//! subscriptions, follow rebinds, decode item updates and report everything as
//! [`StreamEvent`]s on a channel.
//!
//! ```ignore
//! let mut client = StreamClient::new(ClientConfig::default())?;
//! client.subscribe(Subscription::merge(["TIME_000001"], ["TimeStamp", "Value"]))?;
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! client.start(tx)?;
//! ```

mod client;
mod decoder;
mod error;
mod events;
mod lines;
pub mod protocol;
mod request;
mod subscription;

pub use client::{ClientConfig, StreamClient};
pub use decoder::{FieldValue, ItemUpdate, UpdateDecoder, decode_values};
pub use error::{ProtocolError, StreamError};
pub use events::{DisconnectReason, StreamEvent};
pub use lines::LineReader;
pub use subscription::{Subscription, SubscriptionId};
