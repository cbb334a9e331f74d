//! # Lifecycle Controller
//!
//! Staff-facing claim / complete / cancel handling for finalized orders.
//!
//! [`publish`](LifecycleController::publish) posts the order to the kitchen
//! channel and starts a listener task for that one order. Transition requests
//! reach the listener through [`submit`](LifecycleController::submit) and are
//! applied one at a time. The listener stops when its window elapses, when the
//! order is cancelled, or when the post-completion cleanup removes the order.
//!
//! A cancellation asks the cook for a reason before it reaches the listener,
//! so a slow answer never holds up other staff working the same order. The
//! store re-checks the claim when the cancellation is finally applied.
//!
//! The kitchen message handle is kept apart from the listener. It survives the
//! window so later edits and the completion cleanup can still reach the message.
//!
//! The enabled buttons on the kitchen message are recomputed from the order
//! after every accepted transition (see [`ControlState::for_order`]).

use crate::audit::AuditLogger;
use crate::clients::{ActorClient, OrderClient};
use crate::config::{ChannelId, TimeoutConfig};
use crate::interaction::{InteractionTransport, PromptKind, Reply};
use crate::model::{Menu, Order, OrderId, UserId};
use crate::notify::{ControlState, MessageHandle, NotificationSink, OrderSummary};
use crate::order_actor::OrderError;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionAction {
    Claim,
    Complete,
    Cancel,
}

impl Display for TransitionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TransitionAction::Claim => "claim",
            TransitionAction::Complete => "complete",
            TransitionAction::Cancel => "cancel",
        };
        f.write_str(label)
    }
}

/// A staff action aimed at one order.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRequest {
    pub action: TransitionAction,
    pub order_id: OrderId,
    pub actor: UserId,
}

impl TransitionRequest {
    pub fn new(action: TransitionAction, order_id: OrderId, actor: UserId) -> Self {
        Self {
            action,
            order_id,
            actor,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LifecycleError {
    /// No listener for this order: never published, window elapsed, or removed.
    #[error("Order #{0} is no longer accepting actions")]
    NotAccepting(OrderId),

    #[error("Request for order #{received} ignored by the listener for #{listening}")]
    Ignored { listening: OrderId, received: OrderId },

    #[error("Cancellation abandoned: no reason was given in time")]
    CancellationAbandoned,

    #[error(transparent)]
    Order(#[from] OrderError),
}

type Responder = oneshot::Sender<Result<Order, LifecycleError>>;

struct Envelope {
    request: TransitionRequest,
    /// Collected before the request is queued; only set for cancellations.
    reason: Option<String>,
    respond_to: Responder,
}

struct Inner {
    orders: OrderClient,
    sink: Arc<dyn NotificationSink>,
    transport: Arc<dyn InteractionTransport>,
    audit: AuditLogger,
    menu: Arc<Menu>,
    kitchen: ChannelId,
    timeouts: TimeoutConfig,
    listeners: Mutex<HashMap<OrderId, mpsc::Sender<Envelope>>>,
    messages: Mutex<HashMap<OrderId, MessageHandle>>,
    cleanups: Mutex<HashMap<OrderId, JoinHandle<()>>>,
}

#[derive(Clone)]
pub struct LifecycleController {
    inner: Arc<Inner>,
}

impl LifecycleController {
    pub fn new(
        orders: OrderClient,
        sink: Arc<dyn NotificationSink>,
        transport: Arc<dyn InteractionTransport>,
        audit: AuditLogger,
        menu: Arc<Menu>,
        kitchen: ChannelId,
        timeouts: TimeoutConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                orders,
                sink,
                transport,
                audit,
                menu,
                kitchen,
                timeouts,
                listeners: Mutex::new(HashMap::new()),
                messages: Mutex::new(HashMap::new()),
                cleanups: Mutex::new(HashMap::new()),
            }),
        }
    }

    fn listeners(&self) -> MutexGuard<'_, HashMap<OrderId, mpsc::Sender<Envelope>>> {
        self.inner.listeners.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn messages(&self) -> MutexGuard<'_, HashMap<OrderId, MessageHandle>> {
        self.inner.messages.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn cleanups(&self) -> MutexGuard<'_, HashMap<OrderId, JoinHandle<()>>> {
        self.inner.cleanups.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Posts `order` to the kitchen and starts accepting transitions for it.
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn publish(&self, order: &Order) {
        if let Some(content) = self.render(order) {
            match self
                .inner
                .sink
                .send(&self.inner.kitchen, &content, ControlState::for_order(order))
                .await
            {
                Ok(handle) => {
                    self.messages().insert(order.id, handle);
                }
                Err(e) => warn!(error = %e, "Kitchen message not delivered"),
            }
        }

        let (sender, receiver) = mpsc::channel(16);
        self.listeners().insert(order.id, sender);

        let deadline = Instant::now() + self.inner.timeouts.listener_window();
        tokio::spawn(self.clone().listen(order.id, receiver, deadline));
        info!("Order published");
    }

    /// Hands a transition request to the order's listener and waits for the outcome.
    #[instrument(skip(self), fields(order_id = %request.order_id, action = %request.action, actor = %request.actor))]
    pub async fn submit(&self, request: TransitionRequest) -> Result<Order, LifecycleError> {
        let order_id = request.order_id;
        let sender = self
            .listeners()
            .get(&order_id)
            .cloned()
            .ok_or(LifecycleError::NotAccepting(order_id))?;

        let reason = match request.action {
            TransitionAction::Cancel => match self.cancel_reason(order_id, &request.actor).await {
                Ok(reason) => Some(reason),
                Err(e) => {
                    self.reject(&request, &e).await;
                    return Err(e);
                }
            },
            TransitionAction::Claim | TransitionAction::Complete => None,
        };

        let (respond_to, response) = oneshot::channel();
        sender
            .send(Envelope {
                request,
                reason,
                respond_to,
            })
            .await
            .map_err(|_| LifecycleError::NotAccepting(order_id))?;
        response.await.map_err(|_| LifecycleError::NotAccepting(order_id))?
    }

    /// Re-renders the kitchen message from the current order.
    pub async fn refresh(&self, order: &Order) {
        let Some(handle) = self.message_for(order.id) else {
            debug!(order_id = %order.id, "No kitchen message to refresh");
            return;
        };
        let Some(content) = self.render(order) else {
            return;
        };
        if let Err(e) = self
            .inner
            .sink
            .edit(&handle, &content, ControlState::for_order(order))
            .await
        {
            warn!(order_id = %order.id, error = %e, "Kitchen message not updated");
        }
    }

    pub fn is_accepting(&self, order_id: OrderId) -> bool {
        self.listeners().contains_key(&order_id)
    }

    /// The kitchen message for this order, kept until the order is removed.
    pub fn message_for(&self, order_id: OrderId) -> Option<MessageHandle> {
        self.messages().get(&order_id).cloned()
    }

    /// Stops every listener and pending cleanup.
    pub fn shutdown(&self) {
        let listeners = std::mem::take(&mut *self.listeners());
        for (_, handle) in self.cleanups().drain() {
            handle.abort();
        }
        info!(listeners = listeners.len(), "Lifecycle controller stopped");
    }

    fn render(&self, order: &Order) -> Option<String> {
        match OrderSummary::new(order, &self.inner.menu).render() {
            Ok(content) => Some(content),
            Err(e) => {
                warn!(order_id = %order.id, error = %e, "Order summary not rendered");
                None
            }
        }
    }

    async fn listen(self, order_id: OrderId, mut receiver: mpsc::Receiver<Envelope>, deadline: Instant) {
        debug!(%order_id, "Listener started");
        let window = tokio::time::sleep_until(deadline);
        tokio::pin!(window);

        loop {
            tokio::select! {
                _ = &mut window => {
                    info!(%order_id, "Listener window closed");
                    self.listeners().remove(&order_id);
                    break;
                }
                envelope = receiver.recv() => {
                    let Some(Envelope { request, reason, respond_to }) = envelope else {
                        break;
                    };
                    if request.order_id != order_id {
                        let _ = respond_to.send(Err(LifecycleError::Ignored {
                            listening: order_id,
                            received: request.order_id,
                        }));
                        continue;
                    }

                    let cancelled = request.action == TransitionAction::Cancel;
                    let result = self.apply(request, reason).await;
                    let stop = cancelled && result.is_ok();
                    let _ = respond_to.send(result);
                    if stop {
                        self.listeners().remove(&order_id);
                        break;
                    }
                }
            }
        }
        debug!(%order_id, "Listener stopped");
    }

    async fn apply(&self, request: TransitionRequest, reason: Option<String>) -> Result<Order, LifecycleError> {
        let order_id = request.order_id;
        let actor = &request.actor;
        let result = match request.action {
            TransitionAction::Claim => self.claim(order_id, actor).await,
            TransitionAction::Complete => self.complete(order_id, actor).await,
            TransitionAction::Cancel => self.cancel(order_id, actor, reason.unwrap_or_default()).await,
        };
        if let Err(e) = &result {
            self.reject(&request, e).await;
        }
        result
    }

    async fn reject(&self, request: &TransitionRequest, error: &LifecycleError) {
        info!(
            order_id = %request.order_id,
            action = %request.action,
            actor = %request.actor,
            reason = %error,
            "Transition rejected"
        );
        self.inner.transport.notify(&request.actor, &error.to_string()).await;
    }

    async fn claim(&self, order_id: OrderId, actor: &UserId) -> Result<Order, LifecycleError> {
        let order = self.inner.orders.claim(order_id, actor.clone()).await?;
        self.inner.audit.record(&order, "Claimed", actor).await;
        self.refresh(&order).await;
        Ok(order)
    }

    async fn complete(&self, order_id: OrderId, actor: &UserId) -> Result<Order, LifecycleError> {
        let order = self.inner.orders.complete(order_id, actor.clone()).await?;
        self.inner.audit.record(&order, "Completed", actor).await;
        self.refresh(&order).await;
        self.schedule_cleanup(order_id);
        Ok(order)
    }

    /// Asks the cook why the order is being cancelled.
    async fn cancel_reason(&self, order_id: OrderId, actor: &UserId) -> Result<String, LifecycleError> {
        let current = self.inner.orders.fetch(order_id).await?;
        if current.is_claimed() {
            return Err(OrderError::CannotCancelClaimed.into());
        }
        if current.status.is_terminal() {
            return Err(OrderError::OrderClosed(current.phase().to_string().to_lowercase()).into());
        }

        let transport = &self.inner.transport;
        let pending = transport.prompt(actor, order_id, PromptKind::CancelReason).await;
        match transport
            .await_response(pending, self.inner.timeouts.cancel_reason())
            .await
        {
            Ok(Reply::Text(reason)) if !reason.trim().is_empty() => Ok(reason.trim().to_string()),
            Ok(other) => {
                debug!(%order_id, reply = ?other, "Unusable cancellation reason");
                Err(LifecycleError::CancellationAbandoned)
            }
            Err(e) => {
                debug!(%order_id, error = %e, "No cancellation reason");
                Err(LifecycleError::CancellationAbandoned)
            }
        }
    }

    async fn cancel(&self, order_id: OrderId, actor: &UserId, reason: String) -> Result<Order, LifecycleError> {
        let order = self
            .inner
            .orders
            .cancel(order_id, actor.clone(), reason.clone())
            .await?;
        self.inner.audit.record(&order, "Cancelled", actor).await;
        self.remove(order_id).await;
        self.inner
            .transport
            .notify(actor, &format!("Order #{order_id} has been cancelled. Reason: {reason}"))
            .await;
        Ok(order)
    }

    fn schedule_cleanup(&self, order_id: OrderId) {
        let controller = self.clone();
        let delay = self.inner.timeouts.cleanup_delay();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            controller.remove(order_id).await;
            controller.listeners().remove(&order_id);
            controller.cleanups().remove(&order_id);
            info!(%order_id, "Completed order cleaned up");
        });
        self.cleanups().insert(order_id, handle);
    }

    /// Deletes the kitchen message and drops the order from the store.
    async fn remove(&self, order_id: OrderId) {
        let handle = self.messages().remove(&order_id);
        if let Some(handle) = handle {
            if let Err(e) = self.inner.sink.delete(&handle).await {
                warn!(%order_id, error = %e, "Kitchen message not deleted");
            }
        }
        if let Err(e) = self.inner.orders.delete(order_id).await {
            warn!(%order_id, error = %e, "Order not removed from store");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::InteractionHub;
    use crate::model::{Location, OrderCreate, OrderItem, PromoRegistry};
    use crate::notify::MemorySink;
    use crate::order_actor::OrderContext;

    async fn published() -> (LifecycleController, Order) {
        let menu = Arc::new(Menu::standard());
        let (actor, orders) = crate::order_actor::new();
        tokio::spawn(actor.run(OrderContext {
            promos: PromoRegistry::new(),
            menu: menu.clone(),
        }));
        let sink = Arc::new(MemorySink::new());
        let (hub, _outbound) = InteractionHub::new(64);
        let kitchen: ChannelId = "111111111111111111".parse().unwrap();
        let controller = LifecycleController::new(
            orders.clone(),
            sink.clone(),
            hub,
            AuditLogger::new(sink, None),
            menu,
            kitchen,
            TimeoutConfig::default(),
        );

        let id = orders
            .create_order(OrderCreate {
                customer: "Ada".into(),
                location: Location::Indoor,
                promo_code: None,
                created_by: UserId(1),
            })
            .await
            .unwrap();
        orders
            .add_item(id, UserId(1), OrderItem::new("sides", "Fruit Cup", 1))
            .await
            .unwrap();
        orders.end_session(id, UserId(1)).await.unwrap();
        let order = orders.finalize(id).await.unwrap();
        controller.publish(&order).await;
        (controller, order)
    }

    #[tokio::test]
    async fn test_listener_ignores_other_orders() {
        let (controller, order) = published().await;
        let sender = controller.listeners().get(&order.id).unwrap().clone();

        let (respond_to, response) = oneshot::channel();
        sender
            .send(Envelope {
                request: TransitionRequest::new(TransitionAction::Claim, OrderId(999), UserId(2)),
                reason: None,
                respond_to,
            })
            .await
            .unwrap();
        assert_eq!(
            response.await.unwrap(),
            Err(LifecycleError::Ignored {
                listening: order.id,
                received: OrderId(999),
            })
        );

        let claimed = controller
            .submit(TransitionRequest::new(TransitionAction::Claim, order.id, UserId(2)))
            .await
            .unwrap();
        assert_eq!(claimed.claimed_by, Some(UserId(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_expiry_stops_accepting() {
        let (controller, order) = published().await;
        assert!(controller.is_accepting(order.id));

        tokio::time::sleep(TimeoutConfig::default().listener_window() + std::time::Duration::from_secs(1)).await;
        assert!(!controller.is_accepting(order.id));
        assert_eq!(
            controller
                .submit(TransitionRequest::new(TransitionAction::Claim, order.id, UserId(2)))
                .await,
            Err(LifecycleError::NotAccepting(order.id))
        );
    }
}
