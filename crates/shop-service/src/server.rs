//! HTTP server for the storefront API.
//!
//! Routes are nested under `/api`. Handlers live in [`crate::apis`] and
//! share the engine through [`AppState`].

use crate::apis;
use axum::{
	extract::DefaultBodyLimit,
	http::HeaderValue,
	routing::{get, patch, post},
	Router,
};
use shop_config::ApiConfig;
use shop_core::ShopEngine;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
	cors::{AllowOrigin, Any, CorsLayer},
	trace::TraceLayer,
};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Reference to the shop engine for processing requests.
	pub engine: Arc<ShopEngine>,
}

/// Builds the `/api` router with its middleware.
pub fn router(state: AppState, api_config: &ApiConfig) -> Router {
	let api = Router::new()
		.route("/health", get(apis::catalog::health))
		.route("/catalog/options", get(apis::catalog::options))
		.route("/checkout", post(apis::checkout::place_order))
		.route("/orders/{id}", get(apis::order::get_order))
		.route("/orders/{id}/cancel", post(apis::order::cancel_order))
		.route("/customers/{phone}/orders", get(apis::order::customer_orders))
		.route("/admin/statuses", get(apis::admin::statuses))
		.route("/admin/orders/{id}/status", patch(apis::admin::update_status));

	Router::new()
		.nest("/api", api)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(cors_layer(api_config))
				.layer(DefaultBodyLimit::max(api_config.max_request_size)),
		)
		.with_state(state)
}

fn cors_layer(api_config: &ApiConfig) -> CorsLayer {
	let Some(cors) = &api_config.cors else {
		return CorsLayer::permissive();
	};

	let origins: Vec<HeaderValue> = cors
		.allowed_origins
		.iter()
		.filter_map(|origin| match HeaderValue::from_str(origin) {
			Ok(value) => Some(value),
			Err(_) => {
				tracing::warn!("Ignoring invalid CORS origin: {}", origin);
				None
			},
		})
		.collect();

	CorsLayer::new()
		.allow_origin(AllowOrigin::list(origins))
		.allow_methods(Any)
		.allow_headers(Any)
}

/// Starts the HTTP server for the API.
pub async fn start_server(
	api_config: ApiConfig,
	engine: Arc<ShopEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(AppState { engine }, &api_config);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Storefront API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::{
		body::{to_bytes, Body},
		http::{Request, StatusCode},
	};
	use serde_json::{json, Value};
	use shop_config::builders::config::ConfigBuilder;
	use shop_core::{ShopBuilder, ShopFactories};
	use shop_storage::get_all_implementations;
	use tower::ServiceExt;

	fn api_config() -> ApiConfig {
		ApiConfig {
			enabled: true,
			host: "127.0.0.1".to_string(),
			port: 0,
			max_request_size: 64 * 1024,
			cors: None,
		}
	}

	fn app() -> Router {
		let engine = ShopBuilder::new(ConfigBuilder::new().build())
			.build(ShopFactories {
				storage_factories: get_all_implementations()
					.into_iter()
					.map(|(name, factory)| (name.to_string(), factory))
					.collect(),
			})
			.unwrap();
		router(
			AppState {
				engine: Arc::new(engine),
			},
			&api_config(),
		)
	}

	async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
		let mut request = Request::builder().method(method).uri(uri);
		let body = match body {
			Some(value) => {
				request = request.header("content-type", "application/json");
				Body::from(value.to_string())
			},
			None => Body::empty(),
		};
		let response = app
			.clone()
			.oneshot(request.body(body).unwrap())
			.await
			.unwrap();
		let status = response.status();
		let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		let value = if bytes.is_empty() {
			Value::Null
		} else {
			serde_json::from_slice(&bytes).unwrap_or(Value::Null)
		};
		(status, value)
	}

	fn checkout_body(delivery_type: &str) -> Value {
		json!({
			"name": "Sara",
			"phone": "0791234567",
			"delivery_type": delivery_type,
			"selected_address_id": "addr-1",
			"payment_method": "CASH_ON_DELIVERY",
			"items": [
				{ "product_id": "sku-tulip", "name": "Tulips", "quantity": 2, "unit_price": "7.25" }
			]
		})
	}

	#[tokio::test]
	async fn test_health() {
		let (status, body) = send(&app(), "GET", "/api/health", None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["status"], "ok");
		assert_eq!(body["shop"], "test-shop");
	}

	#[tokio::test]
	async fn test_catalog_options_hide_visa_from_checkout() {
		let (status, body) = send(&app(), "GET", "/api/catalog/options", None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["statuses"].as_array().unwrap().len(), 6);
		assert_eq!(body["paymentMethods"].as_array().unwrap().len(), 3);

		let available: Vec<_> = body["availablePaymentMethods"]
			.as_array()
			.unwrap()
			.iter()
			.map(|entry| entry["value"].as_str().unwrap().to_string())
			.collect();
		assert_eq!(available, vec!["CASH_ON_DELIVERY", "CLIQ"]);
	}

	#[tokio::test]
	async fn test_checkout_then_admin_workflow() {
		let app = app();

		let (status, order) = send(&app, "POST", "/api/checkout", Some(checkout_body("DELIVERY"))).await;
		assert_eq!(status, StatusCode::CREATED);
		assert_eq!(order["status"], "PENDING");
		assert_eq!(order["total"], "14.50");
		assert_eq!(order["nextStatuses"], json!(["CONFIRMED", "CANCELLED"]));
		let id = order["id"].as_str().unwrap().to_string();

		let (status, body) = send(
			&app,
			"PATCH",
			&format!("/api/admin/orders/{}/status", id),
			Some(json!({ "status": "DELIVERED" })),
		)
		.await;
		assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
		assert_eq!(body["error"], "INVALID_TRANSITION");
		assert_eq!(body["details"]["from"], "PENDING");

		let (status, body) = send(
			&app,
			"PATCH",
			&format!("/api/admin/orders/{}/status", id),
			Some(json!({ "status": "CONFIRMED" })),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["status"], "CONFIRMED");
		assert_eq!(body["statusLabel"], "Confirmed");

		let (status, body) = send(&app, "GET", &format!("/api/orders/{}", id), None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["history"].as_array().unwrap().len(), 1);
	}

	#[tokio::test]
	async fn test_pickup_order_cannot_ship() {
		let app = app();
		let (_, order) = send(&app, "POST", "/api/checkout", Some(checkout_body("PICKUP"))).await;
		let id = order["id"].as_str().unwrap().to_string();
		assert!(order.get("address_id").is_none());

		for next in ["CONFIRMED", "PROCESSING"] {
			let (status, _) = send(
				&app,
				"PATCH",
				&format!("/api/admin/orders/{}/status", id),
				Some(json!({ "status": next })),
			)
			.await;
			assert_eq!(status, StatusCode::OK);
		}

		let (status, body) = send(
			&app,
			"PATCH",
			&format!("/api/admin/orders/{}/status", id),
			Some(json!({ "status": "SHIPPED" })),
		)
		.await;
		assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
		assert_eq!(body["error"], "TRANSITION_NOT_PERMITTED_FOR_DELIVERY");
	}

	#[tokio::test]
	async fn test_checkout_rejections() {
		let app = app();

		let mut missing_address = checkout_body("DELIVERY");
		missing_address["selected_address_id"] = Value::Null;
		let (status, body) = send(&app, "POST", "/api/checkout", Some(missing_address)).await;
		assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
		assert_eq!(body["error"], "MISSING_REQUIRED_FIELD");

		let mut visa = checkout_body("PICKUP");
		visa["payment_method"] = json!("VISA");
		let (status, body) = send(&app, "POST", "/api/checkout", Some(visa)).await;
		assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
		assert_eq!(body["error"], "UNAVAILABLE_PAYMENT_METHOD");

		let mut bad_phone = checkout_body("PICKUP");
		bad_phone["phone"] = json!("07-1234567");
		let (status, body) = send(&app, "POST", "/api/checkout", Some(bad_phone)).await;
		assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
		assert_eq!(body["error"], "MALFORMED_PHONE_NUMBER");

		let mut unknown_method = checkout_body("PICKUP");
		unknown_method["payment_method"] = json!("BITCOIN");
		let (status, body) = send(&app, "POST", "/api/checkout", Some(unknown_method)).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["error"], "INVALID_REQUEST");

		let (status, body) = send(&app, "GET", "/api/customers/0791234567/orders", None).await;
		assert_eq!(status, StatusCode::OK);
		assert!(body["orders"].as_array().unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_checkout_without_name_or_phone_reports_missing_field() {
		let app = app();
		for (key, field) in [("name", "name"), ("phone", "phone")] {
			let mut body = checkout_body("PICKUP");
			body.as_object_mut().unwrap().remove(key);
			let (status, body) = send(&app, "POST", "/api/checkout", Some(body)).await;
			assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
			assert_eq!(body["error"], "MISSING_REQUIRED_FIELD");
			assert_eq!(body["details"]["field"], field);
		}
	}

	#[tokio::test]
	async fn test_customer_history_and_cancel() {
		let app = app();
		let (_, first) = send(&app, "POST", "/api/checkout", Some(checkout_body("PICKUP"))).await;
		let (_, second) = send(&app, "POST", "/api/checkout", Some(checkout_body("DELIVERY"))).await;

		let (status, body) = send(&app, "GET", "/api/customers/0791234567/orders", None).await;
		assert_eq!(status, StatusCode::OK);
		let ids: Vec<_> = body["orders"]
			.as_array()
			.unwrap()
			.iter()
			.map(|order| order["id"].clone())
			.collect();
		assert_eq!(ids, vec![second["id"].clone(), first["id"].clone()]);

		let cancel_uri = format!("/api/orders/{}/cancel", first["id"].as_str().unwrap());
		let (status, body) = send(&app, "POST", &cancel_uri, None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["status"], "CANCELLED");
		assert_eq!(body["nextStatuses"], json!([]));

		let (status, body) = send(&app, "POST", &cancel_uri, None).await;
		assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
		assert_eq!(body["error"], "INVALID_TRANSITION");

		let (status, body) = send(&app, "GET", "/api/customers/12345/orders", None).await;
		assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
		assert_eq!(body["error"], "MALFORMED_PHONE_NUMBER");
	}

	#[tokio::test]
	async fn test_unknown_order_is_not_found() {
		let (status, body) = send(&app(), "GET", "/api/orders/missing", None).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(body["error"], "ORDER_NOT_FOUND");
	}

	#[tokio::test]
	async fn test_admin_statuses_come_from_the_table() {
		let (status, body) = send(&app(), "GET", "/api/admin/statuses", None).await;
		assert_eq!(status, StatusCode::OK);
		let statuses = body["statuses"].as_array().unwrap();
		assert_eq!(statuses[0]["value"], "PENDING");
		assert_eq!(
			statuses[0]["next"],
			json!({ "DELIVERY": ["CONFIRMED", "CANCELLED"], "PICKUP": ["CONFIRMED", "CANCELLED"] })
		);
		assert_eq!(
			statuses[2]["next"],
			json!({ "DELIVERY": ["SHIPPED", "CANCELLED"], "PICKUP": ["DELIVERED", "CANCELLED"] })
		);
		assert_eq!(statuses[5]["isFinal"], true);
	}

	#[test]
	fn test_cors_layer_with_origins() {
		let mut config = api_config();
		config.cors = Some(shop_config::CorsConfig {
			allowed_origins: vec!["https://shop.example".into(), "bad\norigin".into()],
		});
		let _ = cors_layer(&config);
	}
}
