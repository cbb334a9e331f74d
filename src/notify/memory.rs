use crate::config::ChannelId;
use crate::notify::{ControlState, DeliveryError, MessageHandle, NotificationSink};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// A message as currently shown in a channel.
#[derive(Debug, Clone, PartialEq)]
pub struct PostedMessage {
    pub channel: ChannelId,
    pub content: String,
    pub controls: Option<ControlState>,
    pub edits: usize,
}

#[derive(Default)]
struct Board {
    live: BTreeMap<u64, PostedMessage>,
    deleted: Vec<u64>,
    failing: HashSet<ChannelId>,
}

/// Sink that keeps every message in memory. Used by the demo binary and tests.
#[derive(Default)]
pub struct MemorySink {
    next_id: AtomicU64,
    board: Mutex<Board>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn board(&self) -> MutexGuard<'_, Board> {
        self.board.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Makes every delivery to `channel` fail until [`restore`](Self::restore).
    pub fn fail_channel(&self, channel: &ChannelId) {
        self.board().failing.insert(channel.clone());
    }

    pub fn restore(&self, channel: &ChannelId) {
        self.board().failing.remove(channel);
    }

    pub fn message(&self, handle: &MessageHandle) -> Option<PostedMessage> {
        self.board().live.get(&handle.message_id).cloned()
    }

    /// Live messages in `channel`, oldest first.
    pub fn messages_in(&self, channel: &ChannelId) -> Vec<PostedMessage> {
        self.board()
            .live
            .values()
            .filter(|message| &message.channel == channel)
            .cloned()
            .collect()
    }

    pub fn was_deleted(&self, handle: &MessageHandle) -> bool {
        self.board().deleted.contains(&handle.message_id)
    }
}

#[async_trait]
impl NotificationSink for MemorySink {
    async fn send(
        &self,
        channel: &ChannelId,
        content: &str,
        controls: Option<ControlState>,
    ) -> Result<MessageHandle, DeliveryError> {
        let mut board = self.board();
        if board.failing.contains(channel) {
            return Err(DeliveryError::UnknownChannel(channel.to_string()));
        }
        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        board.live.insert(
            message_id,
            PostedMessage {
                channel: channel.clone(),
                content: content.to_string(),
                controls,
                edits: 0,
            },
        );
        debug!(%channel, message_id, "Message sent");
        Ok(MessageHandle {
            channel: channel.clone(),
            message_id,
        })
    }

    async fn edit(
        &self,
        handle: &MessageHandle,
        content: &str,
        controls: Option<ControlState>,
    ) -> Result<(), DeliveryError> {
        let mut board = self.board();
        if board.failing.contains(&handle.channel) {
            return Err(DeliveryError::UnknownChannel(handle.channel.to_string()));
        }
        let message = board
            .live
            .get_mut(&handle.message_id)
            .ok_or(DeliveryError::MessageGone(handle.message_id))?;
        message.content = content.to_string();
        message.controls = controls;
        message.edits += 1;
        Ok(())
    }

    async fn delete(&self, handle: &MessageHandle) -> Result<(), DeliveryError> {
        let mut board = self.board();
        if board.failing.contains(&handle.channel) {
            return Err(DeliveryError::UnknownChannel(handle.channel.to_string()));
        }
        board
            .live
            .remove(&handle.message_id)
            .ok_or(DeliveryError::MessageGone(handle.message_id))?;
        board.deleted.push(handle.message_id);
        debug!(channel = %handle.channel, message_id = handle.message_id, "Message deleted");
        Ok(())
    }
}
