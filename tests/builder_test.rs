mod common;

use common::*;
use kitchen_orders::builder::NewOrder;
use kitchen_orders::clients::ActorClient;
use kitchen_orders::interaction::{ContinueChoice, PromptKind, Reply};
use kitchen_orders::lifecycle::{LifecycleError, TransitionAction, TransitionRequest};
use kitchen_orders::model::{Location, Menu, OrderId, Totals, VehicleDetails};
use kitchen_orders::order_actor::OrderError;
use rust_decimal::Decimal;

fn civic() -> VehicleDetails {
    VehicleDetails {
        make: "Honda".into(),
        model: "Civic".into(),
        color: "Blue".into(),
        license_plate: "ABC123".into(),
    }
}

fn outdoor(customer: &str) -> NewOrder {
    NewOrder {
        customer: customer.to_string(),
        location: Location::Outdoor,
        promo_code: None,
    }
}

fn actions(h: &Harness, id: OrderId) -> Vec<String> {
    h.system.audit.history(id).into_iter().map(|r| r.action).collect()
}

#[tokio::test(start_paused = true)]
async fn test_ada_scenario_subtotal_claim_and_complete() {
    let h = start();
    h.customer.enqueue(ada_answers());

    let order = h.system.builder.create_order(indoor("Ada"), &CASHIER).await.unwrap();
    assert_eq!(order.id, OrderId(100));
    assert_eq!(order.id.to_string(), "100");
    assert_eq!(order.items.len(), 2);
    assert!(order.finalized);
    assert!(order.session.is_none());

    let totals = Totals::compute(&order, &h.system.menu).unwrap();
    assert_eq!(totals.subtotal, Decimal::new(982, 2));

    let handle = h.system.lifecycle.message_for(order.id).unwrap();
    let message = h.sink.message(&handle).unwrap();
    assert_eq!(message.channel, h.kitchen);
    assert!(message.content.contains("Subtotal: $9.82"));

    let claim = TransitionRequest::new(TransitionAction::Claim, order.id, COOK_A);
    h.system.lifecycle.submit(claim).await.unwrap();

    let complete_a = TransitionRequest::new(TransitionAction::Complete, order.id, COOK_A);
    let done = h.system.lifecycle.submit(complete_a).await.unwrap();
    assert_eq!(done.phase().to_string(), "Completed");

    let complete_b = TransitionRequest::new(TransitionAction::Complete, order.id, COOK_B);
    assert_eq!(
        h.system.lifecycle.submit(complete_b).await,
        Err(LifecycleError::Order(OrderError::NotClaimedByYou))
    );
    assert_eq!(actions(&h, order.id), ["Created", "Claimed", "Completed"]);
}

#[tokio::test(start_paused = true)]
async fn test_running_summary_is_shown_in_prompts() {
    let h = start();
    h.customer.enqueue(ada_answers());
    h.system.builder.create_order(indoor("Ada"), &CASHIER).await.unwrap();

    let summaries: Vec<String> = h
        .customer
        .prompt_kinds()
        .await
        .into_iter()
        .filter_map(|kind| match kind {
            PromptKind::ContinueDecision { summary } => Some(summary),
            _ => None,
        })
        .collect();
    assert_eq!(summaries.len(), 2);
    assert!(summaries[0].contains("2x Chick-Fil-A Chicken Sandwich Entree"));
    assert!(summaries[1].contains("1x Waffle Potato Fries"));
}

#[tokio::test(start_paused = true)]
async fn test_outdoor_vehicle_timeout_still_finalizes() {
    let h = start();
    h.customer.enqueue([Answer::Silence]);
    h.customer.enqueue(ada_answers());

    let order = h.system.builder.create_order(outdoor("Grace"), &CASHIER).await.unwrap();
    assert!(order.vehicle.is_none());
    assert!(order.finalized);
    assert_eq!(order.items.len(), 2);
    assert!(h.system.lifecycle.is_accepting(order.id));

    let notices = h.customer.notices().await;
    assert!(notices
        .iter()
        .any(|(user, text)| *user == CASHIER && text.contains("Continuing without")));
}

#[tokio::test(start_paused = true)]
async fn test_outdoor_vehicle_form_timeout_still_finalizes() {
    let h = start();
    h.customer.enqueue([Answer::Reply(Reply::Acknowledge), Answer::Silence]);
    h.customer.enqueue(ada_answers());

    let order = h.system.builder.create_order(outdoor("Grace"), &CASHIER).await.unwrap();
    assert!(order.vehicle.is_none());
    assert_eq!(order.items.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_outdoor_vehicle_details_recorded() {
    let h = start();
    h.customer.enqueue([
        Answer::Reply(Reply::Acknowledge),
        Answer::Reply(Reply::Vehicle(civic())),
    ]);
    h.customer.enqueue(ada_answers());

    let order = h.system.builder.create_order(outdoor("Grace"), &CASHIER).await.unwrap();
    assert_eq!(order.vehicle, Some(civic()));
    assert_eq!(actions(&h, order.id), ["Created", "Added Vehicle Details"]);

    let handle = h.system.lifecycle.message_for(order.id).unwrap();
    assert!(h.sink.message(&handle).unwrap().content.contains("Car Model: Civic"));
}

#[tokio::test(start_paused = true)]
async fn test_category_timeout_finalizes_empty_order() {
    let h = start();

    let order = h.system.builder.create_order(indoor("Linus"), &CASHIER).await.unwrap();
    assert!(order.items.is_empty());
    assert!(order.finalized);
    assert!(h.system.lifecycle.is_accepting(order.id));

    let notices = h.customer.notices().await;
    assert!(notices.iter().any(|(_, text)| text.contains("No category selected in time")));
}

#[tokio::test(start_paused = true)]
async fn test_invalid_reply_keeps_collected_items() {
    let h = start();
    h.customer.enqueue([
        select("sides"),
        select("Fruit Cup"),
        quantity(3),
        next(ContinueChoice::AddMore),
        select("breakfast"),
    ]);

    let order = h.system.builder.create_order(indoor("Ken"), &CASHIER).await.unwrap();
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].quantity, 3);

    let notices = h.customer.notices().await;
    assert!(notices.iter().any(|(_, text)| text.contains("Invalid category selection")));
}

#[tokio::test(start_paused = true)]
async fn test_zero_quantity_is_rejected_and_finalizes() {
    let h = start();
    h.customer.enqueue([select("sides"), select("Fruit Cup"), quantity(0)]);

    let order = h.system.builder.create_order(indoor("Ken"), &CASHIER).await.unwrap();
    assert!(order.items.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_notes_are_appended() {
    let h = start();
    h.customer.enqueue([
        select("sides"),
        select("Fruit Cup"),
        quantity(1),
        next(ContinueChoice::AddNotes),
        text("no pickles"),
        next(ContinueChoice::AddNotes),
        text("   "),
        next(ContinueChoice::AddNotes),
        text("extra napkins"),
        next(ContinueChoice::Finish),
    ]);

    let order = h.system.builder.create_order(indoor("Ada"), &CASHIER).await.unwrap();
    assert_eq!(order.notes, ["no pickles", "extra napkins"]);
    assert_eq!(
        actions(&h, order.id),
        ["Created", "Added Special Instructions", "Added Special Instructions"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_notes_timeout_finalizes() {
    let h = start();
    h.customer.enqueue([
        select("sides"),
        select("Fruit Cup"),
        quantity(1),
        next(ContinueChoice::AddNotes),
        Answer::Silence,
        // Never reached: the loop finalizes after the notes timeout.
        next(ContinueChoice::AddMore),
    ]);

    let order = h.system.builder.create_order(indoor("Ada"), &CASHIER).await.unwrap();
    assert!(order.notes.is_empty());
    assert_eq!(order.items.len(), 1);
    assert_eq!(h.customer.unused_answers(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_promo_rejects_order_and_burns_id() {
    let h = start();
    let request = NewOrder {
        promo_code: Some("BOGUS".into()),
        ..indoor("Ada")
    };

    let err = h.system.builder.create_order(request, &CASHIER).await.unwrap_err();
    assert_eq!(err, OrderError::InvalidPromoCode("BOGUS".into()));
    assert!(h.system.orders.list().await.unwrap().is_empty());

    let order = place_simple_order(&h, "Ada").await;
    assert_eq!(order.id, OrderId(101));

    let notices = h.customer.notices().await;
    assert!(notices.iter().any(|(_, text)| text.contains("Invalid promo code")));
}

#[tokio::test(start_paused = true)]
async fn test_promo_discount_on_ten_dollars() {
    let h = start_with_menu(Menu::standard().with_item("specials", "Ten Dollar Box", 1000));
    h.customer.enqueue([
        select("specials"),
        select("Ten Dollar Box"),
        quantity(1),
        next(ContinueChoice::Finish),
    ]);
    let request = NewOrder {
        promo_code: Some("save10".into()),
        ..indoor("Ada")
    };

    let order = h.system.builder.create_order(request, &CASHIER).await.unwrap();
    assert_eq!(order.discount_percent(), Some(10));

    let totals = Totals::compute(&order, &h.system.menu).unwrap();
    assert_eq!(totals.subtotal, Decimal::new(1000, 2));
    assert_eq!(totals.discount_amount, Decimal::new(100, 2));
    assert_eq!(totals.total, Decimal::new(900, 2));

    let handle = h.system.lifecycle.message_for(order.id).unwrap();
    let content = h.sink.message(&handle).unwrap().content;
    assert!(content.contains("Promo Code: SAVE10"));
    assert!(content.contains("Final Total: $9.00"));
}

#[tokio::test(start_paused = true)]
async fn test_update_is_one_shot() {
    let h = start();
    let order = place_simple_order(&h, "Ada").await;

    h.customer.enqueue([
        select("treats"),
        select("Ice Cream Cone"),
        quantity(2),
        next(ContinueChoice::Finish),
    ]);
    let updated = h.system.builder.update_order(order.id, &CASHIER).await.unwrap();
    assert!(updated.updated);
    assert_eq!(updated.items.len(), 2);

    let handle = h.system.lifecycle.message_for(order.id).unwrap();
    let message = h.sink.message(&handle).unwrap();
    assert!(message.content.contains("2x Ice Cream Cone"));
    assert_eq!(message.edits, 1);
    assert_eq!(actions(&h, order.id).last().map(String::as_str), Some("Updated"));

    assert_eq!(
        h.system.builder.update_order(order.id, &CASHIER).await,
        Err(OrderError::AlreadyUpdated)
    );
}

#[tokio::test(start_paused = true)]
async fn test_empty_update_still_counts() {
    let h = start();
    let order = place_simple_order(&h, "Ada").await;

    // Category prompt times out: nothing is added.
    let updated = h.system.builder.update_order(order.id, &COOK_B).await.unwrap();
    assert!(updated.updated);
    assert_eq!(updated.items.len(), 1);

    assert_eq!(
        h.system.builder.update_order(order.id, &COOK_B).await,
        Err(OrderError::AlreadyUpdated)
    );
}

#[tokio::test(start_paused = true)]
async fn test_update_rejected_after_claim() {
    let h = start();
    let order = place_simple_order(&h, "Ada").await;
    h.system
        .lifecycle
        .submit(TransitionRequest::new(TransitionAction::Claim, order.id, COOK_A))
        .await
        .unwrap();

    assert_eq!(
        h.system.builder.update_order(order.id, &CASHIER).await,
        Err(OrderError::OrderClaimed)
    );
    let stored = h.system.orders.fetch(order.id).await.unwrap();
    assert!(!stored.updated);
}

#[tokio::test(start_paused = true)]
async fn test_update_rejected_after_completion() {
    let h = start();
    let order = place_simple_order(&h, "Ada").await;
    for action in [TransitionAction::Claim, TransitionAction::Complete] {
        h.system
            .lifecycle
            .submit(TransitionRequest::new(action, order.id, COOK_A))
            .await
            .unwrap();
    }

    assert_eq!(
        h.system.builder.update_order(order.id, &CASHIER).await,
        Err(OrderError::OrderClaimed)
    );
}
