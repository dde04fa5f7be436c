//! Order processing core for the storefront service.
//!
//! Ties the workflow model in `shop-types` to storage and cache
//! invalidation. Every status mutation follows the same sequence: check the
//! proposed move against the transition table, persist it, then publish the
//! event and request invalidation of the affected cache tags.

pub mod builder;
pub mod cache;
pub mod engine;
pub mod handlers;
pub mod state;

pub use builder::{BuilderError, ShopBuilder, ShopFactories};
pub use cache::{CacheError, CacheInvalidator, EventBusInvalidator};
pub use engine::{event_bus::EventBus, EngineError, ShopEngine};
pub use handlers::{CheckoutError, CheckoutHandler, OrderError, OrderHandler};
pub use state::{OrderStateError, OrderStateMachine};

#[cfg(test)]
pub(crate) mod test_support;
