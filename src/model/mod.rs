//! Plain data: the order entity, the menu catalog, promo codes and pricing.

pub mod menu;
pub mod order;
pub mod pricing;
pub mod promo;
pub mod user;

pub use menu::*;
pub use order::*;
pub use pricing::*;
pub use promo::*;
pub use user::*;
