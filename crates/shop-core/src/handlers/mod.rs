//! Handlers for checkout submissions and order status changes.

pub mod checkout;
pub mod order;

pub use checkout::{CheckoutError, CheckoutHandler};
pub use order::{OrderError, OrderHandler};
