//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter driven by
//! `RUST_LOG`. Module paths are hidden (`with_target(false)`); log lines carry
//! structured fields such as `order_id`, `actor` and `entity_type` instead.
//!
//! ```bash
//! # Transitions, audits and store operations
//! RUST_LOG=info cargo run
//!
//! # Every prompt, reply and builder step
//! RUST_LOG=debug cargo run
//!
//! # Only the order store engine
//! RUST_LOG=kitchen_orders::framework=debug cargo run
//! ```
//!
//! With `RUST_LOG=info` a short order reads roughly like:
//!
//! ```text
//! INFO Actor started entity_type="Order"
//! INFO create_order: Created entity_type="Order" id=100 size=1
//! INFO create_order: Audit order_id=100 action="Created" actor=1 status=Pending
//! INFO create_order: Order finalized order_id=100 items=2
//! INFO submit: Claimed order_id=100 actor=2
//! INFO submit: Audit order_id=100 action="Claimed" actor=2 status=Claimed
//! ```

pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
