//! # Notification Sink
//!
//! Publishing and updating the kitchen-facing order message, plus the
//! rendering that feeds it.

pub mod memory;
pub mod render;

pub use memory::*;
pub use render::*;

use crate::config::ChannelId;
use crate::model::Order;
use async_trait::async_trait;
use thiserror::Error;

/// A message that was sent and can later be edited or removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageHandle {
    pub channel: ChannelId,
    pub message_id: u64,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DeliveryError {
    #[error("Channel {0} is unavailable")]
    UnknownChannel(String),

    /// The message was already removed.
    #[error("Message {0} no longer exists")]
    MessageGone(u64),
}

/// Which staff buttons are enabled.
///
/// Always derived from the order, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlState {
    pub claim: bool,
    pub complete: bool,
    pub cancel: bool,
}

impl ControlState {
    /// `None` once the order is completed or cancelled: the message carries
    /// no controls at all.
    pub fn for_order(order: &Order) -> Option<Self> {
        if order.status.is_terminal() {
            return None;
        }
        let claimed = order.is_claimed();
        Some(Self {
            claim: !claimed,
            complete: claimed,
            cancel: !claimed,
        })
    }
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(
        &self,
        channel: &ChannelId,
        content: &str,
        controls: Option<ControlState>,
    ) -> Result<MessageHandle, DeliveryError>;

    async fn edit(
        &self,
        handle: &MessageHandle,
        content: &str,
        controls: Option<ControlState>,
    ) -> Result<(), DeliveryError>;

    async fn delete(&self, handle: &MessageHandle) -> Result<(), DeliveryError>;
}
