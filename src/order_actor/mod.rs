//! The order store: a [`ResourceActor`] managing [`Order`] entities.

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::OrderClient;
use crate::framework::ResourceActor;
use crate::model::{Menu, Order, OrderId, PromoRegistry};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// First order number handed out.
pub const FIRST_ORDER_ID: u64 = 100;

/// Collaborators the order entity consults while applying actions.
#[derive(Debug, Clone)]
pub struct OrderContext {
    pub promos: PromoRegistry,
    pub menu: Arc<Menu>,
}

/// Creates a new Order actor and its client.
///
/// Ids start at [`FIRST_ORDER_ID`] and are never reused, including ids of
/// creates that were rejected.
pub fn new() -> (ResourceActor<Order>, OrderClient) {
    let order_id_counter = Arc::new(AtomicU64::new(FIRST_ORDER_ID));
    let next_order_id = move || OrderId(order_id_counter.fetch_add(1, Ordering::SeqCst));

    let (actor, generic_client) = ResourceActor::new(32, next_order_id);
    (actor, OrderClient::new(generic_client))
}
