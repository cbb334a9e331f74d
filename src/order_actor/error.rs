//! Error types for the Order actor.

use crate::model::MenuError;
use thiserror::Error;

/// Errors that can occur during order operations.
///
/// Every precondition violation leaves the order unchanged.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The requested order was not found.
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Customer name is required")]
    MissingCustomer,

    #[error("Invalid promo code: {0}")]
    InvalidPromoCode(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown item \"{item}\" in category \"{category}\"")]
    UnknownItem { category: String, item: String },

    /// Quantities are positive integers.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),

    #[error("This order has already been updated once")]
    AlreadyUpdated,

    /// The update flow and item edits are closed once the order is claimed.
    #[error("This order has been claimed and can no longer be changed")]
    OrderClaimed,

    #[error("Order already claimed by {0}")]
    AlreadyClaimed(String),

    #[error("Only the staff member who claimed this order can complete it")]
    NotClaimedByYou,

    #[error("Claimed orders cannot be cancelled")]
    CannotCancelClaimed,

    /// The order is completed or cancelled.
    #[error("Order is already {0}")]
    OrderClosed(String),

    #[error("Order has not been finalized yet")]
    NotFinalized,

    #[error("Order is being edited by {0}")]
    SessionBusy(String),

    #[error("No edit session held by this user")]
    NoActiveSession,

    #[error("Vehicle details were already recorded")]
    VehicleAlreadyRecorded,

    #[error("Vehicle details only apply to outdoor orders")]
    NotCurbside,

    #[error("A cancellation reason is required")]
    MissingReason,

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<MenuError> for OrderError {
    fn from(e: MenuError) -> Self {
        match e {
            MenuError::UnknownCategory(category) => OrderError::UnknownCategory(category),
            MenuError::UnknownItem { category, item } => OrderError::UnknownItem { category, item },
        }
    }
}
