//! Generic actor engine used by the order store.
//!
//! - [`ActorEntity`] - Trait an entity implements to be managed by an actor
//! - [`ResourceActor`] - The task that owns the entities
//! - [`ResourceClient`] - Cloneable handle for sending requests
//! - [`FrameworkError`] - Engine-level failures
//!
//! See [`mock`] for testing clients without spawning an actor.

pub mod core;
pub mod mock;

pub use self::core::*;
