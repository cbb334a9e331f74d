//! # Kitchen Orders
//!
//! > **The order-taking core of a restaurant chat bot.**
//!
//! Cashiers build orders through a short conversation (category, item,
//! quantity, notes and, for curbside pickup, vehicle details). Finalized
//! orders are posted to the kitchen channel where staff claim, complete or
//! cancel them, and every step is written to an audit trail.
//!
//! ## 🏗️ Design
//!
//! ### One actor owns the orders
//! Orders live inside a single [`ResourceActor`](framework::ResourceActor).
//! Id allocation and every field change are messages in its mailbox, so two
//! cashiers creating orders at once never share an id and a claim can never
//! interleave with a cancel. The rules themselves (who may complete, when an
//! order may still be changed) sit in the entity's
//! [`handle_action`](framework::ActorEntity::handle_action).
//!
//! ### Waiting is explicit
//! Every conversational step is "send one prompt, await one reply before a
//! deadline" through [`InteractionTransport`](interaction::InteractionTransport).
//! A missed deadline never fails an order; the builder finalizes what it has.
//!
//! ### Controls are derived
//! Which buttons the kitchen sees is computed from the order on each render
//! ([`ControlState::for_order`](notify::ControlState::for_order)), never stored.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! The generic `ResourceActor<T>` / `ResourceClient<T>` pair and test mocks.
//!
//! ### 2. The Store ([`order_actor`], [`clients`], [`model`])
//! The `Order` entity, its actions and errors, and the typed
//! [`OrderClient`](clients::OrderClient).
//!
//! ### 3. The Conversation ([`builder`], [`interaction`])
//! [`OrderBuilder`](builder::OrderBuilder) and its [`Step`](builder::Step) machine.
//!
//! ### 4. The Kitchen ([`lifecycle`], [`notify`], [`audit`])
//! [`LifecycleController`](lifecycle::LifecycleController) handles
//! claim / complete / cancel; [`KitchenSystem`](lifecycle::KitchenSystem)
//! wires everything together.
//!
//! ### 5. Settings ([`config`])
//! Channel ids, command prefix and every timeout.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Scripted demo with info logs
//! RUST_LOG=info cargo run
//!
//! cargo test
//! ```

pub mod audit;
pub mod builder;
pub mod clients;
pub mod config;
pub mod framework;
pub mod interaction;
pub mod lifecycle;
pub mod model;
pub mod notify;
pub mod order_actor;
