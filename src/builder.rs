//! # Order Builder
//!
//! Conversational order entry. [`OrderBuilder::create_order`] takes a new
//! order from nothing to the kitchen; [`OrderBuilder::update_order`] lets
//! staff add to an unclaimed order once.
//!
//! Both drive the same item-collection loop, modelled as an explicit [`Step`]
//! machine. Every step sends one prompt to the requester and waits for one
//! reply. A timeout or an unusable reply at any step ends the loop and
//! finalizes whatever was collected so far.

use crate::audit::AuditLogger;
use crate::clients::OrderClient;
use crate::config::TimeoutConfig;
use crate::interaction::{AwaitError, ContinueChoice, InteractionTransport, PromptKind, Reply};
use crate::lifecycle::LifecycleController;
use crate::model::{Location, Menu, Order, OrderCreate, OrderId, OrderItem, SessionPurpose, UserId};
use crate::notify::running_summary;
use crate::order_actor::OrderError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Quantities offered by the quantity prompt.
pub const QUANTITY_CHOICES: [u32; 5] = [1, 2, 3, 4, 5];

/// A request to start a new order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer: String,
    pub location: Location,
    pub promo_code: Option<String>,
}

/// States of the item-collection loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    SelectCategory,
    SelectItem { category: String },
    SelectQuantity { category: String, item: String },
    ContinueDecision,
    CollectNotes,
    Finalize,
}

#[derive(Clone)]
pub struct OrderBuilder {
    orders: OrderClient,
    transport: Arc<dyn InteractionTransport>,
    audit: AuditLogger,
    lifecycle: LifecycleController,
    menu: Arc<Menu>,
    timeouts: TimeoutConfig,
}

impl OrderBuilder {
    pub fn new(
        orders: OrderClient,
        transport: Arc<dyn InteractionTransport>,
        audit: AuditLogger,
        lifecycle: LifecycleController,
        menu: Arc<Menu>,
        timeouts: TimeoutConfig,
    ) -> Self {
        Self {
            orders,
            transport,
            audit,
            lifecycle,
            menu,
            timeouts,
        }
    }

    /// Creates, fills, finalizes and publishes a new order.
    ///
    /// Only validation of the request itself (customer name, promo code)
    /// fails the call. Timeouts along the way degrade to a smaller order.
    #[instrument(skip(self, request, requester), fields(customer = %request.customer, requester = %requester))]
    pub async fn create_order(&self, request: NewOrder, requester: &UserId) -> Result<Order, OrderError> {
        let params = OrderCreate {
            customer: request.customer,
            location: request.location,
            promo_code: request.promo_code,
            created_by: requester.clone(),
        };
        let id = match self.orders.create_order(params).await {
            Ok(id) => id,
            Err(e) => {
                self.transport.notify(requester, &e.to_string()).await;
                return Err(e);
            }
        };
        let order = self.orders.fetch(id).await?;
        self.audit.record(&order, "Created", requester).await;

        if order.location == Location::Outdoor {
            self.collect_vehicle(id, requester).await;
        }

        self.collect_items(id, requester).await?;
        self.orders.end_session(id, requester.clone()).await?;
        let order = self.orders.finalize(id).await?;
        info!(order_id = %id, items = order.items.len(), "Order finalized");

        self.lifecycle.publish(&order).await;
        self.transport
            .notify(requester, &format!("Order #{id} has been sent to the kitchen."))
            .await;
        Ok(order)
    }

    /// Runs the item-collection loop once more on a finalized, unclaimed order.
    ///
    /// Fails with [`OrderError::AlreadyUpdated`] on a second attempt, even if
    /// the first one added nothing, and with [`OrderError::OrderClaimed`] once
    /// the order is claimed.
    #[instrument(skip(self, requester), fields(requester = %requester))]
    pub async fn update_order(&self, id: OrderId, requester: &UserId) -> Result<Order, OrderError> {
        if let Err(e) = self
            .orders
            .begin_session(id, requester.clone(), SessionPurpose::Update)
            .await
        {
            self.transport.notify(requester, &e.to_string()).await;
            return Err(e);
        }

        let collected = self.collect_items(id, requester).await;
        let order = self.orders.end_session(id, requester.clone()).await?;
        collected?;

        self.audit.record(&order, "Updated", requester).await;
        self.lifecycle.refresh(&order).await;
        self.transport
            .notify(requester, &format!("Order #{id} has been updated."))
            .await;
        Ok(order)
    }

    /// Offers the vehicle form. Any timeout or refusal continues without it.
    async fn collect_vehicle(&self, id: OrderId, user: &UserId) {
        let offer = self.transport.prompt(user, id, PromptKind::VehicleOffer).await;
        match self.transport.await_response(offer, self.timeouts.vehicle_ack()).await {
            Ok(Reply::Acknowledge) => {}
            other => {
                debug!(order_id = %id, reply = ?other, "Vehicle offer not accepted");
                self.skip_vehicle(user).await;
                return;
            }
        }

        let form = self.transport.prompt(user, id, PromptKind::VehicleForm).await;
        let vehicle = match self.transport.await_response(form, self.timeouts.vehicle_form()).await {
            Ok(Reply::Vehicle(vehicle)) => vehicle,
            other => {
                debug!(order_id = %id, reply = ?other, "Vehicle form not submitted");
                self.skip_vehicle(user).await;
                return;
            }
        };

        match self.orders.set_vehicle(id, vehicle).await {
            Ok(order) => self.audit.record(&order, "Added Vehicle Details", user).await,
            Err(e) => {
                warn!(order_id = %id, error = %e, "Vehicle details not recorded");
                self.transport.notify(user, &e.to_string()).await;
            }
        }
    }

    async fn skip_vehicle(&self, user: &UserId) {
        self.transport
            .notify(user, "Vehicle details not received. Continuing without them.")
            .await;
    }

    /// The item-collection loop. Returns the order as it stands at `Finalize`.
    async fn collect_items(&self, id: OrderId, user: &UserId) -> Result<Order, OrderError> {
        let mut order = self.orders.fetch(id).await?;
        let mut step = Step::SelectCategory;

        loop {
            debug!(order_id = %id, ?step, "Step");
            step = match step {
                Step::SelectCategory => {
                    let kind = PromptKind::SelectCategory {
                        summary: running_summary(&order),
                        categories: self.menu.categories(),
                    };
                    match self.ask(user, id, kind, self.timeouts.category()).await {
                        Ok(Reply::Select(category)) if self.menu.has_category(&category) => {
                            Step::SelectItem { category }
                        }
                        reply => self.stop_early(user, id, "category", reply).await,
                    }
                }
                Step::SelectItem { category } => {
                    let items = self
                        .menu
                        .items_in(&category)
                        .map(|items| items.keys().cloned().collect::<Vec<_>>())?;
                    let kind = PromptKind::SelectItem {
                        category: category.clone(),
                        items: items.clone(),
                    };
                    match self.ask(user, id, kind, self.timeouts.item()).await {
                        Ok(Reply::Select(item)) if items.contains(&item) => {
                            Step::SelectQuantity { category, item }
                        }
                        reply => self.stop_early(user, id, "item", reply).await,
                    }
                }
                Step::SelectQuantity { category, item } => {
                    let kind = PromptKind::SelectQuantity {
                        item: item.clone(),
                        choices: QUANTITY_CHOICES.to_vec(),
                    };
                    match self.ask(user, id, kind, self.timeouts.quantity()).await {
                        Ok(Reply::Quantity(quantity)) if quantity >= 1 => {
                            let line = OrderItem::new(category, item, quantity);
                            match self.orders.add_item(id, user.clone(), line).await {
                                Ok(updated) => {
                                    order = updated;
                                    Step::ContinueDecision
                                }
                                Err(e) => self.rejected(user, id, e).await,
                            }
                        }
                        reply => self.stop_early(user, id, "quantity", reply).await,
                    }
                }
                Step::ContinueDecision => {
                    let kind = PromptKind::ContinueDecision {
                        summary: running_summary(&order),
                    };
                    match self.ask(user, id, kind, self.timeouts.continue_decision()).await {
                        Ok(Reply::Continue(ContinueChoice::AddMore)) => Step::SelectCategory,
                        Ok(Reply::Continue(ContinueChoice::AddNotes)) => Step::CollectNotes,
                        Ok(Reply::Continue(ContinueChoice::Finish)) => Step::Finalize,
                        reply => self.stop_early(user, id, "next step", reply).await,
                    }
                }
                Step::CollectNotes => {
                    match self.ask(user, id, PromptKind::NotesForm, self.timeouts.notes()).await {
                        Ok(Reply::Text(note)) if note.trim().is_empty() => Step::ContinueDecision,
                        Ok(Reply::Text(note)) => match self.orders.add_note(id, user.clone(), note).await {
                            Ok(updated) => {
                                order = updated;
                                self.audit.record(&order, "Added Special Instructions", user).await;
                                Step::ContinueDecision
                            }
                            Err(e) => self.rejected(user, id, e).await,
                        },
                        reply => self.stop_early(user, id, "special instructions", reply).await,
                    }
                }
                Step::Finalize => return Ok(order),
            };
        }
    }

    async fn ask(
        &self,
        user: &UserId,
        id: OrderId,
        kind: PromptKind,
        timeout: Duration,
    ) -> Result<Reply, AwaitError> {
        let pending = self.transport.prompt(user, id, kind).await;
        self.transport.await_response(pending, timeout).await
    }

    async fn stop_early(
        &self,
        user: &UserId,
        id: OrderId,
        stage: &str,
        reply: Result<Reply, AwaitError>,
    ) -> Step {
        let text = match reply {
            Err(AwaitError::TimedOut) => format!("No {stage} selected in time. Finalizing your order."),
            Err(AwaitError::Dismissed) | Ok(_) => {
                format!("Invalid {stage} selection. Finalizing your order.")
            }
        };
        debug!(order_id = %id, stage, "Item collection stopped early");
        self.transport.notify(user, &text).await;
        Step::Finalize
    }

    async fn rejected(&self, user: &UserId, id: OrderId, error: OrderError) -> Step {
        warn!(order_id = %id, error = %error, "Change rejected");
        self.transport.notify(user, &error.to_string()).await;
        Step::Finalize
    }
}
