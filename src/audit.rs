//! Audit trail for order actions.
//!
//! Each record goes to an in-memory, append-only history and, best effort,
//! to the log channel. A delivery failure is logged and otherwise ignored.

use crate::config::ChannelId;
use crate::model::{Order, OrderId, OrderPhase, UserId};
use crate::notify::{render_log_entry, NotificationSink};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub actor: UserId,
    /// Phase of the order right after the action.
    pub status: OrderPhase,
}

type History = HashMap<OrderId, Vec<AuditRecord>>;

#[derive(Clone)]
pub struct AuditLogger {
    sink: Arc<dyn NotificationSink>,
    channel: Option<ChannelId>,
    history: Arc<Mutex<History>>,
}

impl AuditLogger {
    /// With `channel` unset, records are kept in history only.
    pub fn new(sink: Arc<dyn NotificationSink>, channel: Option<ChannelId>) -> Self {
        Self {
            sink,
            channel,
            history: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn history_mut(&self) -> MutexGuard<'_, History> {
        self.history.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub async fn record(&self, order: &Order, action: &str, actor: &UserId) {
        let record = AuditRecord {
            timestamp: Utc::now(),
            action: action.to_string(),
            actor: actor.clone(),
            status: order.phase(),
        };
        self.history_mut().entry(order.id).or_default().push(record);
        info!(order_id = %order.id, action, %actor, status = %order.phase(), "Audit");

        let Some(channel) = &self.channel else {
            return;
        };
        let entry = render_log_entry(order, action, &actor.mention());
        if let Err(e) = self.sink.send(channel, &entry, None).await {
            warn!(order_id = %order.id, action, error = %e, "Audit log delivery failed");
        }
    }

    /// Every record for `order_id`, oldest first.
    pub fn history(&self, order_id: OrderId) -> Vec<AuditRecord> {
        self.history_mut().get(&order_id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Location, OrderCreate};
    use crate::notify::MemorySink;

    fn order() -> Order {
        Order::new(
            OrderId(100),
            OrderCreate {
                customer: "Ada".into(),
                location: Location::Indoor,
                promo_code: None,
                created_by: UserId(1),
            },
        )
    }

    #[tokio::test]
    async fn test_history_is_ordered_and_survives_delivery_failure() {
        let sink = Arc::new(MemorySink::new());
        let log: ChannelId = "222222222222222222".parse().unwrap();
        let audit = AuditLogger::new(sink.clone(), Some(log.clone()));
        let mut order = order();

        audit.record(&order, "Created", &UserId(1)).await;
        sink.fail_channel(&log);
        order.claimed_by = Some(UserId(2));
        audit.record(&order, "Claimed", &UserId(2)).await;

        let history = audit.history(OrderId(100));
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].action, "Created");
        assert_eq!(history[0].status, OrderPhase::Pending);
        assert_eq!(history[1].actor, UserId(2));
        assert_eq!(history[1].status, OrderPhase::Claimed);
        assert!(history[0].timestamp <= history[1].timestamp);
        assert_eq!(sink.messages_in(&log).len(), 1);
        assert!(audit.history(OrderId(101)).is_empty());
    }
}
