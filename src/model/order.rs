//! The kitchen order and its messages.
//!
//! `Order` implements [`ActorEntity`](crate::framework::ActorEntity) (see
//! [`order_actor::entity`](crate::order_actor::entity)), so every mutation is an
//! [`OrderAction`] applied by the order store actor.

use crate::model::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Order number. Rendered zero-padded to at least three digits (`"100"`, `"007"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

impl FromStr for OrderId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Indoor,
    Outdoor,
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Indoor => write!(f, "Indoor"),
            Location::Outdoor => write!(f, "Outdoor"),
        }
    }
}

impl FromStr for Location {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "indoor" => Ok(Location::Indoor),
            "outdoor" => Ok(Location::Outdoor),
            other => Err(format!("unknown location \"{other}\"")),
        }
    }
}

/// Curbside identification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleDetails {
    pub make: String,
    pub model: String,
    pub color: String,
    pub license_plate: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub category: String,
    pub name: String,
    pub quantity: u32,
}

impl OrderItem {
    pub fn new(category: impl Into<String>, name: impl Into<String>, quantity: u32) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
            quantity,
        }
    }
}

/// Stored status. Claiming does not change it; see [`Order::phase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

/// What staff see: the status with the claim folded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderPhase {
    Pending,
    Claimed,
    Completed,
    Cancelled,
}

impl Display for OrderPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            OrderPhase::Pending => "Pending",
            OrderPhase::Claimed => "Claimed",
            OrderPhase::Completed => "Completed",
            OrderPhase::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}

/// A promo code applied at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedPromo {
    pub code: String,
    pub discount_percent: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPurpose {
    Create,
    Update,
}

/// Exclusive right to run the item-collection loop on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLease {
    pub holder: UserId,
    pub purpose: SessionPurpose,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer: String,
    pub location: Location,
    pub vehicle: Option<VehicleDetails>,
    pub items: Vec<OrderItem>,
    #[serde(default, deserialize_with = "notes_from_text_or_list")]
    pub notes: Vec<String>,
    pub promo: Option<AppliedPromo>,
    pub status: OrderStatus,
    pub claimed_by: Option<UserId>,
    pub created_by: UserId,
    pub updated: bool,
    pub finalized: bool,
    pub session: Option<SessionLease>,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a new order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub customer: String,
    pub location: Location,
    pub promo_code: Option<String>,
    pub created_by: UserId,
}

impl Order {
    /// Creates a draft order. The creator holds the build session from the start.
    ///
    /// A requested promo code is recorded with a zero discount; the store
    /// resolves it against the registry before the order becomes visible.
    pub fn new(id: OrderId, params: OrderCreate) -> Self {
        Self {
            id,
            customer: params.customer.trim().to_string(),
            location: params.location,
            vehicle: None,
            items: Vec::new(),
            notes: Vec::new(),
            promo: params
                .promo_code
                .map(|code| code.trim().to_uppercase())
                .filter(|code| !code.is_empty())
                .map(|code| AppliedPromo {
                    code,
                    discount_percent: 0,
                }),
            status: OrderStatus::Pending,
            claimed_by: None,
            session: Some(SessionLease {
                holder: params.created_by.clone(),
                purpose: SessionPurpose::Create,
            }),
            created_by: params.created_by,
            updated: false,
            finalized: false,
            created_at: Utc::now(),
        }
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed_by.is_some()
    }

    pub fn phase(&self) -> OrderPhase {
        match self.status {
            OrderStatus::Completed => OrderPhase::Completed,
            OrderStatus::Cancelled => OrderPhase::Cancelled,
            OrderStatus::Pending if self.is_claimed() => OrderPhase::Claimed,
            OrderStatus::Pending => OrderPhase::Pending,
        }
    }

    pub fn discount_percent(&self) -> Option<u8> {
        self.promo
            .as_ref()
            .map(|p| p.discount_percent)
            .filter(|percent| *percent > 0)
    }

    /// True while `user` holds the build session.
    pub fn is_edited_by(&self, user: &UserId) -> bool {
        self.session.as_ref().is_some_and(|lease| &lease.holder == user)
    }
}

/// Messages understood by the order store for a single order.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Takes the build-session lease. `Update` also checks the one-shot rules.
    BeginSession { user: UserId, purpose: SessionPurpose },
    /// Releases the lease; ending an `Update` session marks the order updated.
    EndSession { user: UserId },
    SetVehicle(VehicleDetails),
    AddItem { user: UserId, item: OrderItem },
    AddNote { user: UserId, note: String },
    Finalize,
    Claim { actor: UserId },
    Complete { actor: UserId },
    Cancel { actor: UserId, reason: String },
}

fn notes_from_text_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Notes {
        Text(String),
        List(Vec<String>),
    }

    Ok(match Option::<Notes>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Notes::Text(text)) if text.trim().is_empty() => Vec::new(),
        Some(Notes::Text(text)) => vec![text],
        Some(Notes::List(list)) => list,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> Order {
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

    #[test]
    fn test_order_id_is_zero_padded() {
        assert_eq!(OrderId(7).to_string(), "007");
        assert_eq!(OrderId(100).to_string(), "100");
        assert_eq!(OrderId(1234).to_string(), "1234");
        assert_eq!("#105".parse::<OrderId>(), Ok(OrderId(105)));
    }

    #[test]
    fn test_phase_folds_claim_into_pending() {
        let mut order = draft();
        assert_eq!(order.phase(), OrderPhase::Pending);
        order.claimed_by = Some(UserId(2));
        assert_eq!(order.phase(), OrderPhase::Claimed);
        assert_eq!(order.status, OrderStatus::Pending);
        order.status = OrderStatus::Completed;
        assert_eq!(order.phase(), OrderPhase::Completed);
    }

    #[test]
    fn test_notes_accept_legacy_single_string() {
        let mut value = serde_json::to_value(draft()).unwrap();
        value["notes"] = serde_json::json!("no pickles");
        let order: Order = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(order.notes, vec!["no pickles".to_string()]);

        value["notes"] = serde_json::json!(["a", "b"]);
        let order: Order = serde_json::from_value(value).unwrap();
        assert_eq!(order.notes.len(), 2);
    }

    #[test]
    fn test_location_parsing() {
        assert_eq!("Outdoor".parse::<Location>(), Ok(Location::Outdoor));
        assert!("drive-thru".parse::<Location>().is_err());
    }
}
