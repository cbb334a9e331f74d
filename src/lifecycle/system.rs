use crate::audit::AuditLogger;
use crate::builder::OrderBuilder;
use crate::clients::OrderClient;
use crate::config::{BotConfig, ConfigError};
use crate::interaction::InteractionTransport;
use crate::lifecycle::LifecycleController;
use crate::model::{Menu, PromoRegistry};
use crate::notify::NotificationSink;
use crate::order_actor::OrderContext;
use std::sync::Arc;
use tracing::{error, info};

/// The running kitchen: the order store actor plus the services built on it.
///
/// `KitchenSystem` is responsible for:
/// - **Lifecycle Management**: starting the order store and stopping it again
/// - **Dependency Wiring**: handing the store client, sink, transport and
///   audit logger to the builder and the lifecycle controller
///
/// # Example
///
/// ```ignore
/// let config = BotConfig::from_env()?;
/// let promos = PromoRegistry::load(&config.promo_codes)?;
/// let system = KitchenSystem::new(&config, promos, sink, hub)?;
///
/// let order = system.builder.create_order(request, &cashier).await?;
/// system.lifecycle.submit(TransitionRequest::new(TransitionAction::Claim, order.id, cook)).await?;
///
/// system.shutdown().await?;
/// ```
pub struct KitchenSystem {
    pub orders: OrderClient,
    pub builder: OrderBuilder,
    pub lifecycle: LifecycleController,
    pub audit: AuditLogger,
    pub promos: PromoRegistry,
    pub menu: Arc<Menu>,

    /// Task handles for running actors (used for graceful shutdown)
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl KitchenSystem {
    /// Starts the order store with the standard menu and wires everything up.
    ///
    /// Fails only when the kitchen channel is not configured.
    pub fn new(
        config: &BotConfig,
        promos: PromoRegistry,
        sink: Arc<dyn NotificationSink>,
        transport: Arc<dyn InteractionTransport>,
    ) -> Result<Self, ConfigError> {
        Self::with_menu(config, Menu::standard(), promos, sink, transport)
    }

    pub fn with_menu(
        config: &BotConfig,
        menu: Menu,
        promos: PromoRegistry,
        sink: Arc<dyn NotificationSink>,
        transport: Arc<dyn InteractionTransport>,
    ) -> Result<Self, ConfigError> {
        let kitchen = config.kitchen_channel()?.clone();
        let menu = Arc::new(menu);

        let (order_actor, orders) = crate::order_actor::new();
        let order_handle = tokio::spawn(order_actor.run(OrderContext {
            promos: promos.clone(),
            menu: menu.clone(),
        }));

        let audit = AuditLogger::new(sink.clone(), config.channels.log.clone());
        let lifecycle = LifecycleController::new(
            orders.clone(),
            sink,
            transport.clone(),
            audit.clone(),
            menu.clone(),
            kitchen,
            config.timeouts.clone(),
        );
        let builder = OrderBuilder::new(
            orders.clone(),
            transport,
            audit.clone(),
            lifecycle.clone(),
            menu.clone(),
            config.timeouts.clone(),
        );

        info!(prefix = %config.prefix, "Kitchen system started");
        Ok(Self {
            orders,
            builder,
            lifecycle,
            audit,
            promos,
            menu,
            handles: vec![order_handle],
        })
    }

    /// Gracefully shuts down the system.
    ///
    /// Listeners and pending cleanups are stopped first, then every client is
    /// dropped so the order store's mailbox closes and its task exits.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down kitchen...");
        self.lifecycle.shutdown();

        drop(self.builder);
        drop(self.lifecycle);
        drop(self.orders);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("Kitchen shutdown complete.");
        Ok(())
    }
}
