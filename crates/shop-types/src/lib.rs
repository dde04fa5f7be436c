//! Common types for the storefront order back-office.
//!
//! This crate holds the order workflow model (status enumeration, the
//! transition table and the gates derived from it), the payment and delivery
//! enumerations, checkout validation, and the data types shared by the
//! storage, engine and HTTP layers.

/// Admin-facing view of the order workflow.
pub mod admin;
/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Checkout submission parsing and validation.
pub mod checkout;
/// Delivery types and the checkout fields they require.
pub mod delivery;
/// Workflow error taxonomy.
pub mod error;
/// Event types for inter-service communication.
pub mod events;
/// Order records and the status enumeration.
pub mod order;
/// Payment methods and the customer-facing allow-list.
pub mod payment;
/// Registry trait for pluggable implementations.
pub mod registry;
/// Storage keys for persisted collections.
pub mod storage;
/// Small helpers shared across crates.
pub mod utils;
/// Configuration validation types for backend-specific TOML tables.
pub mod validation;
/// The transition table and the queries derived from it.
pub mod workflow;

pub use api::*;
pub use checkout::{validate_phone, CheckoutRequest, LineItem, ValidatedCheckout, PHONE_PATTERN};
pub use delivery::{optional_fields_for, required_fields_for, CheckoutField, DeliveryType};
pub use error::WorkflowError;
pub use events::*;
pub use order::{Order, OrderStatus, StatusChange};
pub use payment::{is_available_payment_method, PaymentMethod};
pub use registry::ImplementationRegistry;
pub use storage::*;
pub use utils::{current_timestamp, truncate_id};
pub use validation::*;
pub use workflow::{
	can_transition, check_transition, is_terminal, next_statuses_for, valid_transitions,
};
