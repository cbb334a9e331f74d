//! # Kitchen Orders demo
//!
//! Runs one order end to end against in-memory collaborators:
//! 1. A cashier builds an order through scripted replies.
//! 2. A cook claims it and completes it.
//! 3. The audit history is printed.

use kitchen_orders::builder::NewOrder;
use kitchen_orders::config::{BotConfig, ChannelId};
use kitchen_orders::interaction::{
    ContinueChoice, Interaction, InteractionHub, Outbound, Reply,
};
use kitchen_orders::lifecycle::tracing::setup_tracing;
use kitchen_orders::lifecycle::{KitchenSystem, TransitionAction, TransitionRequest};
use kitchen_orders::model::{Location, PromoRegistry, UserId};
use kitchen_orders::notify::MemorySink;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let mut config = BotConfig::from_env().map_err(|e| e.to_string())?;
    if config.channels.kitchen.is_none() {
        warn!("No kitchen channel configured; using demo channels");
        config.channels.kitchen = Some(demo_channel("100000000000000001")?);
        config.channels.log = Some(demo_channel("100000000000000002")?);
    }
    let promos = PromoRegistry::load(&config.promo_codes).map_err(|e| e.to_string())?;
    promos.upsert("SAVE10", 10).map_err(|e| e.to_string())?;

    let sink = Arc::new(MemorySink::new());
    let (hub, mut outbound) = InteractionHub::new(64);
    let system = KitchenSystem::new(&config, promos, sink.clone(), hub.clone()).map_err(|e| e.to_string())?;

    // Scripted front end: answers each prompt with the next reply.
    let mut script: VecDeque<Reply> = VecDeque::from([
        Reply::Select("entrees".into()),
        Reply::Select("Chick-Fil-A Chicken Sandwich Entree".into()),
        Reply::Quantity(2),
        Reply::Continue(ContinueChoice::AddMore),
        Reply::Select("sides".into()),
        Reply::Select("Waffle Potato Fries".into()),
        Reply::Quantity(1),
        Reply::Continue(ContinueChoice::AddNotes),
        Reply::Text("Extra pickles".into()),
        Reply::Continue(ContinueChoice::Finish),
    ]);
    let front_end_hub = hub.clone();
    let front_end = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            match message {
                Outbound::Prompt(prompt) => {
                    let Some(reply) = script.pop_front() else {
                        info!(id = %prompt.id, "Script finished; leaving prompt unanswered");
                        continue;
                    };
                    front_end_hub.deliver(Interaction {
                        id: prompt.id,
                        user: prompt.user,
                        reply,
                    });
                }
                Outbound::Notice { user, text } => info!(%user, %text, "Notice"),
            }
        }
    });

    let cashier = UserId(1001);
    let cook = UserId(2002);

    let order = async {
        system
            .builder
            .create_order(
                NewOrder {
                    customer: "Ada".into(),
                    location: Location::Indoor,
                    promo_code: Some("save10".into()),
                },
                &cashier,
            )
            .await
            .map_err(|e| e.to_string())
    }
    .instrument(tracing::info_span!("order_entry"))
    .await?;
    info!(order_id = %order.id, items = order.items.len(), "Order created");

    let span = tracing::info_span!("kitchen");
    async {
        for action in [TransitionAction::Claim, TransitionAction::Complete] {
            system
                .lifecycle
                .submit(TransitionRequest::new(action, order.id, cook.clone()))
                .await
                .map_err(|e| e.to_string())?;
        }
        Ok::<_, String>(())
    }
    .instrument(span)
    .await?;

    if let Some(handle) = system.lifecycle.message_for(order.id) {
        if let Some(message) = sink.message(&handle) {
            println!("{}\n", message.content);
        }
    }
    for record in system.audit.history(order.id) {
        println!(
            "{} | {:<28} | {} | {}",
            record.timestamp.format("%H:%M:%S"),
            record.action,
            record.actor.mention(),
            record.status
        );
    }

    system.shutdown().await?;
    drop(hub);
    front_end.abort();
    info!("Demo completed successfully");
    Ok(())
}

fn demo_channel(id: &str) -> Result<ChannelId, String> {
    id.parse().map_err(|e: kitchen_orders::config::ConfigError| e.to_string())
}
