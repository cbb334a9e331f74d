use crate::clients::actor_client::ActorClient;
use crate::framework::{FrameworkError, ResourceClient};
use crate::model::{
    Order, OrderAction, OrderCreate, OrderId, OrderItem, SessionPurpose, UserId, VehicleDetails,
};
use crate::order_actor::OrderError;
use async_trait::async_trait;
use tracing::{debug, info, instrument};

/// Client for interacting with the Order actor.
///
/// Every mutating call returns the order as it stands after the action, so
/// callers can render without a second round trip.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }

    /// Allocates an id and stores a draft. The creator holds the build session.
    #[instrument(skip(self, params), fields(customer = %params.customer))]
    pub async fn create_order(&self, params: OrderCreate) -> Result<OrderId, OrderError> {
        debug!(?params, "create_order called");
        let id = self.inner.create(params).await.map_err(Self::map_error)?;
        info!(order_id = %id, "Order created");
        Ok(id)
    }

    /// Like [`ActorClient::get`], but a missing order is an error.
    pub async fn fetch(&self, id: OrderId) -> Result<Order, OrderError> {
        self.get(id)
            .await?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))
    }

    /// Orders that are neither completed nor cancelled, oldest first.
    pub async fn active(&self) -> Result<Vec<Order>, OrderError> {
        let mut orders: Vec<Order> = self
            .list()
            .await?
            .into_iter()
            .filter(|order| !order.status.is_terminal())
            .collect();
        orders.sort_by_key(|order| order.id);
        Ok(orders)
    }

    async fn act(&self, id: OrderId, action: OrderAction) -> Result<Order, OrderError> {
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn begin_session(
        &self,
        id: OrderId,
        user: UserId,
        purpose: SessionPurpose,
    ) -> Result<Order, OrderError> {
        self.act(id, OrderAction::BeginSession { user, purpose }).await
    }

    #[instrument(skip(self))]
    pub async fn end_session(&self, id: OrderId, user: UserId) -> Result<Order, OrderError> {
        self.act(id, OrderAction::EndSession { user }).await
    }

    #[instrument(skip(self, vehicle))]
    pub async fn set_vehicle(&self, id: OrderId, vehicle: VehicleDetails) -> Result<Order, OrderError> {
        self.act(id, OrderAction::SetVehicle(vehicle)).await
    }

    #[instrument(skip(self))]
    pub async fn add_item(&self, id: OrderId, user: UserId, item: OrderItem) -> Result<Order, OrderError> {
        self.act(id, OrderAction::AddItem { user, item }).await
    }

    #[instrument(skip(self, note))]
    pub async fn add_note(&self, id: OrderId, user: UserId, note: String) -> Result<Order, OrderError> {
        self.act(id, OrderAction::AddNote { user, note }).await
    }

    #[instrument(skip(self))]
    pub async fn finalize(&self, id: OrderId) -> Result<Order, OrderError> {
        self.act(id, OrderAction::Finalize).await
    }

    #[instrument(skip(self))]
    pub async fn claim(&self, id: OrderId, actor: UserId) -> Result<Order, OrderError> {
        self.act(id, OrderAction::Claim { actor }).await
    }

    #[instrument(skip(self))]
    pub async fn complete(&self, id: OrderId, actor: UserId) -> Result<Order, OrderError> {
        self.act(id, OrderAction::Complete { actor }).await
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, id: OrderId, actor: UserId, reason: String) -> Result<Order, OrderError> {
        self.act(id, OrderAction::Cancel { actor, reason }).await
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    /// Recovers the entity's own error so callers can match on it.
    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            FrameworkError::EntityError(inner) => match inner.downcast::<OrderError>() {
                Ok(err) => *err,
                Err(other) => OrderError::ActorCommunicationError(other.to_string()),
            },
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}
