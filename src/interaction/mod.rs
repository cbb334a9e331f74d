//! # Interaction Transport
//!
//! Every conversational step is one prompt sent to one user followed by one
//! awaited reply with a deadline. [`InteractionTransport`] is that primitive;
//! [`InteractionHub`] is the in-process implementation used by the bot front
//! end and by tests.

pub mod hub;

pub use hub::*;

use crate::model::{OrderId, UserId, VehicleDetails};
use async_trait::async_trait;
use std::fmt::Display;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;

/// Identifies one outstanding prompt. Replies must quote it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InteractionId(pub u64);

impl Display for InteractionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "interaction-{}", self.0)
    }
}

/// What the user is being asked.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptKind {
    /// Offer to collect vehicle details for a curbside order.
    VehicleOffer,
    VehicleForm,
    SelectCategory {
        summary: String,
        categories: Vec<String>,
    },
    SelectItem {
        category: String,
        items: Vec<String>,
    },
    SelectQuantity {
        item: String,
        choices: Vec<u32>,
    },
    ContinueDecision {
        summary: String,
    },
    NotesForm,
    CancelReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinueChoice {
    AddMore,
    AddNotes,
    Finish,
}

/// A user's answer to a prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Select(String),
    Quantity(u32),
    Continue(ContinueChoice),
    Text(String),
    Vehicle(VehicleDetails),
    Acknowledge,
}

/// A prompt as it leaves the core.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub id: InteractionId,
    pub user: UserId,
    pub order_id: OrderId,
    pub kind: PromptKind,
}

/// Everything the hub asks the front end to show.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Prompt(Prompt),
    /// A one-off, ephemeral message to a user.
    Notice { user: UserId, text: String },
}

/// An inbound reply from the front end.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub id: InteractionId,
    pub user: UserId,
    pub reply: Reply,
}

/// Handle to an outstanding prompt.
#[derive(Debug)]
pub struct PendingResponse {
    pub id: InteractionId,
    pub user: UserId,
    receiver: oneshot::Receiver<Reply>,
}

impl PendingResponse {
    pub(crate) fn new(id: InteractionId, user: UserId, receiver: oneshot::Receiver<Reply>) -> Self {
        Self { id, user, receiver }
    }

    pub(crate) fn into_receiver(self) -> oneshot::Receiver<Reply> {
        self.receiver
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AwaitError {
    #[error("No response before the deadline")]
    TimedOut,

    /// The transport dropped the prompt without an answer.
    #[error("Prompt was dismissed")]
    Dismissed,
}

#[async_trait]
pub trait InteractionTransport: Send + Sync {
    /// Shows `kind` to `user` and returns a handle for the single reply.
    async fn prompt(&self, user: &UserId, order_id: OrderId, kind: PromptKind) -> PendingResponse;

    /// Waits for the reply to `pending`, or fails once `timeout` elapses.
    async fn await_response(&self, pending: PendingResponse, timeout: Duration) -> Result<Reply, AwaitError>;

    /// Best-effort message to a user. Never fails the caller.
    async fn notify(&self, user: &UserId, text: &str);
}
