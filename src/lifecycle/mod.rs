//! Order lifecycle after finalization, and the system that wires it up.

pub mod controller;
pub mod system;
pub mod tracing;

pub use controller::*;
pub use system::*;
