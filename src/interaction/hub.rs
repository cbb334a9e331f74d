use crate::interaction::{
    AwaitError, Interaction, InteractionId, InteractionTransport, Outbound, PendingResponse, Prompt,
    PromptKind, Reply,
};
use crate::model::{OrderId, UserId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

type Waiters = HashMap<InteractionId, (UserId, oneshot::Sender<Reply>)>;

/// In-process transport.
///
/// Prompts and notices are pushed onto a bounded queue for the front end to
/// render. The front end hands user replies back through [`deliver`], which
/// only accepts a reply from the prompted user quoting a live interaction id.
///
/// [`deliver`]: InteractionHub::deliver
pub struct InteractionHub {
    next_id: AtomicU64,
    waiters: Mutex<Waiters>,
    outbound: mpsc::Sender<Outbound>,
}

impl InteractionHub {
    pub fn new(buffer_size: usize) -> (Arc<Self>, mpsc::Receiver<Outbound>) {
        let (outbound, receiver) = mpsc::channel(buffer_size);
        let hub = Self {
            next_id: AtomicU64::new(1),
            waiters: Mutex::new(HashMap::new()),
            outbound,
        };
        (Arc::new(hub), receiver)
    }

    fn waiters(&self) -> MutexGuard<'_, Waiters> {
        self.waiters.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Routes a reply to its waiting prompt. Returns `false` when the reply is
    /// ignored: unknown or expired id, or sent by a different user.
    pub fn deliver(&self, interaction: Interaction) -> bool {
        let mut waiters = self.waiters();
        match waiters.get(&interaction.id) {
            Some((user, _)) if *user == interaction.user => {}
            Some(_) => {
                debug!(id = %interaction.id, user = %interaction.user, "Reply from another user ignored");
                return false;
            }
            None => {
                debug!(id = %interaction.id, "Reply to unknown prompt ignored");
                return false;
            }
        }
        let Some((_, sender)) = waiters.remove(&interaction.id) else {
            return false;
        };
        sender.send(interaction.reply).is_ok()
    }

    /// Number of prompts still waiting for a reply.
    pub fn outstanding(&self) -> usize {
        self.waiters().len()
    }

    async fn push(&self, message: Outbound) {
        if self.outbound.send(message).await.is_err() {
            warn!("Interaction front end is gone; message dropped");
        }
    }
}

#[async_trait]
impl InteractionTransport for InteractionHub {
    async fn prompt(&self, user: &UserId, order_id: OrderId, kind: PromptKind) -> PendingResponse {
        let id = InteractionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = oneshot::channel();
        self.waiters().insert(id, (user.clone(), sender));
        debug!(%id, %user, %order_id, ?kind, "Prompt");

        self.push(Outbound::Prompt(Prompt {
            id,
            user: user.clone(),
            order_id,
            kind,
        }))
        .await;
        PendingResponse::new(id, user.clone(), receiver)
    }

    async fn await_response(&self, pending: PendingResponse, timeout: Duration) -> Result<Reply, AwaitError> {
        let id = pending.id;
        match tokio::time::timeout(timeout, pending.into_receiver()).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(AwaitError::Dismissed),
            Err(_) => {
                self.waiters().remove(&id);
                debug!(%id, ?timeout, "Prompt timed out");
                Err(AwaitError::TimedOut)
            }
        }
    }

    async fn notify(&self, user: &UserId, text: &str) {
        self.push(Outbound::Notice {
            user: user.clone(),
            text: text.to_string(),
        })
        .await;
    }
}
