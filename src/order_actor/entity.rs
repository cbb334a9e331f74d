//! [`ActorEntity`] implementation for [`Order`].
//!
//! All order rules live here. The store actor applies one action at a time,
//! so each check-then-write below is atomic with respect to other requests
//! for the same order.

use crate::framework::ActorEntity;
use crate::model::{
    Location, Order, OrderAction, OrderCreate, OrderId, OrderStatus, SessionLease, SessionPurpose,
    UserId,
};
use crate::order_actor::{OrderContext, OrderError};
use async_trait::async_trait;
use tracing::{debug, info};

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type CreateParams = OrderCreate;
    type Action = OrderAction;
    type ActionResult = Order;
    type Context = OrderContext;
    type Error = OrderError;

    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, OrderError> {
        if params.customer.trim().is_empty() {
            return Err(OrderError::MissingCustomer);
        }
        Ok(Order::new(id, params))
    }

    /// Resolves the requested promo code. Unknown codes reject the order.
    async fn on_create(&mut self, ctx: &OrderContext) -> Result<(), OrderError> {
        if let Some(promo) = self.promo.as_mut() {
            let percent = ctx
                .promos
                .lookup(&promo.code)
                .ok_or_else(|| OrderError::InvalidPromoCode(promo.code.clone()))?;
            promo.discount_percent = percent;
            debug!(order_id = %self.id, code = %promo.code, percent, "Promo applied");
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: OrderAction,
        ctx: &OrderContext,
    ) -> Result<Order, OrderError> {
        match action {
            OrderAction::BeginSession { user, purpose } => self.begin_session(user, purpose)?,
            OrderAction::EndSession { user } => self.end_session(&user)?,
            OrderAction::SetVehicle(vehicle) => {
                self.ensure_open()?;
                if self.location != Location::Outdoor {
                    return Err(OrderError::NotCurbside);
                }
                if self.vehicle.is_some() {
                    return Err(OrderError::VehicleAlreadyRecorded);
                }
                self.vehicle = Some(vehicle);
            }
            OrderAction::AddItem { user, item } => {
                self.ensure_editable_by(&user)?;
                if item.quantity == 0 {
                    return Err(OrderError::InvalidQuantity(item.quantity));
                }
                ctx.menu.price_of(&item.category, &item.name)?;
                self.items.push(item);
            }
            OrderAction::AddNote { user, note } => {
                self.ensure_editable_by(&user)?;
                let note = note.trim();
                if !note.is_empty() {
                    self.notes.push(note.to_string());
                }
            }
            OrderAction::Finalize => {
                self.ensure_open()?;
                self.finalized = true;
            }
            OrderAction::Claim { actor } => {
                if !self.finalized {
                    return Err(OrderError::NotFinalized);
                }
                self.ensure_open()?;
                if let Some(holder) = &self.claimed_by {
                    return Err(OrderError::AlreadyClaimed(holder.mention()));
                }
                info!(order_id = %self.id, %actor, "Claimed");
                self.claimed_by = Some(actor);
            }
            OrderAction::Complete { actor } => {
                if self.claimed_by.as_ref() != Some(&actor) {
                    return Err(OrderError::NotClaimedByYou);
                }
                self.ensure_open()?;
                info!(order_id = %self.id, %actor, "Completed");
                self.status = OrderStatus::Completed;
            }
            OrderAction::Cancel { actor, reason } => {
                if self.is_claimed() {
                    return Err(OrderError::CannotCancelClaimed);
                }
                self.ensure_open()?;
                if reason.trim().is_empty() {
                    return Err(OrderError::MissingReason);
                }
                info!(order_id = %self.id, %actor, reason = reason.trim(), "Cancelled");
                self.status = OrderStatus::Cancelled;
                self.session = None;
            }
        }
        Ok(self.clone())
    }
}

impl Order {
    fn ensure_open(&self) -> Result<(), OrderError> {
        if self.status.is_terminal() {
            return Err(OrderError::OrderClosed(self.phase().to_string().to_lowercase()));
        }
        Ok(())
    }

    fn ensure_editable_by(&self, user: &UserId) -> Result<(), OrderError> {
        self.ensure_open()?;
        if self.is_claimed() {
            return Err(OrderError::OrderClaimed);
        }
        if !self.is_edited_by(user) {
            return Err(OrderError::NoActiveSession);
        }
        Ok(())
    }

    fn begin_session(&mut self, user: UserId, purpose: SessionPurpose) -> Result<(), OrderError> {
        match purpose {
            // A completed order is always claimed, so these come before the terminal check.
            SessionPurpose::Update => {
                if self.updated {
                    return Err(OrderError::AlreadyUpdated);
                }
                if self.is_claimed() {
                    return Err(OrderError::OrderClaimed);
                }
                self.ensure_open()?;
                if !self.finalized {
                    return Err(OrderError::NotFinalized);
                }
            }
            SessionPurpose::Create => {
                self.ensure_open()?;
                if self.finalized {
                    return Err(OrderError::OrderClosed("finalized".into()));
                }
            }
        }
        if let Some(lease) = &self.session {
            return Err(OrderError::SessionBusy(lease.holder.mention()));
        }
        debug!(order_id = %self.id, %user, ?purpose, "Session started");
        self.session = Some(SessionLease {
            holder: user,
            purpose,
        });
        Ok(())
    }

    fn end_session(&mut self, user: &UserId) -> Result<(), OrderError> {
        let purpose = match &self.session {
            Some(lease) if &lease.holder == user => lease.purpose,
            _ => return Err(OrderError::NoActiveSession),
        };
        if purpose == SessionPurpose::Update {
            self.updated = true;
        }
        self.session = None;
        debug!(order_id = %self.id, %user, ?purpose, "Session ended");
        Ok(())
    }
}
