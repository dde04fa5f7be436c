//! Order state management: persistence plus workflow-checked transitions.

pub mod order;

pub use order::{OrderStateError, OrderStateMachine};
