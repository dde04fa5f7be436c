//! Fixtures shared by the unit tests of this crate.

use rust_decimal::Decimal;
use shop_storage::{implementations::memory::MemoryStorage, StorageService};
use shop_types::{
	CheckoutRequest, DeliveryType, LineItem, Order, OrderStatus, PaymentMethod,
};
use std::sync::Arc;

pub(crate) fn memory_storage() -> Arc<StorageService> {
	Arc::new(StorageService::new(Box::new(MemoryStorage::new())))
}

fn items() -> Vec<LineItem> {
	vec![LineItem {
		product_id: "sku-rose".into(),
		name: "Red roses".into(),
		quantity: 3,
		unit_price: Decimal::new(450, 2),
	}]
}

pub(crate) fn checkout_request(delivery_type: DeliveryType) -> CheckoutRequest {
	CheckoutRequest {
		name: "Sara".into(),
		phone: "0791234567".into(),
		delivery_type,
		selected_address_id: match delivery_type {
			DeliveryType::Delivery => Some("addr-1".into()),
			DeliveryType::Pickup => None,
		},
		payment_method: PaymentMethod::Cliq,
		notes: None,
		is_gift: false,
		delivery_date: None,
		items: items(),
	}
}

pub(crate) fn sample_order(id: &str, delivery_type: DeliveryType) -> Order {
	Order {
		id: id.to_string(),
		created_at: 1_700_000_000,
		updated_at: 1_700_000_000,
		status: OrderStatus::Pending,
		customer_name: "Sara".into(),
		phone: "0791234567".into(),
		delivery_type,
		address_id: None,
		payment_method: PaymentMethod::CashOnDelivery,
		notes: None,
		is_gift: false,
		delivery_date: None,
		items: items(),
		total: Decimal::new(1350, 2),
		history: Vec::new(),
	}
}
