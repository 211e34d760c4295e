//! JSON API over the storefront core.
//!
//! Handlers stay thin: they read identity and the session cart, call one core operation and
//! shape its result. Errors are rendered by [`error`].

pub mod addresses;
pub mod cart;
pub mod error;
pub mod identity;
pub mod orders;
pub mod products;
pub mod returns;
pub mod vendor;

use crate::core::{
    notify::{LogNotifier, Notifier},
    session::{MemorySessionStore, SessionStore},
};
use axum::{
    Router,
    routing::{delete, get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub sessions: Arc<dyn SessionStore>,
    pub notifier: Arc<dyn Notifier>,
    /// Base URL for payment-gateway callbacks
    pub public_url: String,
}

impl AppState {
    /// State with in-memory sessions and log-only notifications.
    #[must_use]
    pub fn new(db: DatabaseConnection, public_url: impl Into<String>) -> Self {
        Self {
            db,
            sessions: Arc::new(MemorySessionStore::new()),
            notifier: Arc::new(LogNotifier),
            public_url: public_url.into(),
        }
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/cart", get(cart::show_cart))
        .route("/cart/items", post(cart::add_to_cart))
        .route(
            "/cart/items/:product_id",
            delete(cart::remove_from_cart).patch(cart::update_cart_quantity),
        )
        .route("/orders", get(orders::list_orders))
        .route("/orders/pending", post(orders::open_pending_order))
        .route("/orders/:id", get(orders::order_detail))
        .route("/orders/:id/checkout", post(orders::checkout_enter))
        .route("/orders/:id/coupon", post(orders::apply_coupon))
        .route("/orders/:id/cod", post(orders::cod_checkout))
        .route("/orders/:id/cod/accept", post(orders::cod_accept))
        .route("/orders/:id/gateway", get(orders::gateway_request))
        .route(
            "/orders/:id/gateway/confirm",
            post(orders::confirm_gateway_payment),
        )
        .route("/vendor/orders/:id/status", post(vendor::change_order_status))
        .route(
            "/vendor/coupons",
            get(vendor::list_coupons).post(vendor::create_coupon),
        )
        .route(
            "/vendor/coupons/:id",
            delete(vendor::delete_coupon).put(vendor::update_coupon),
        )
        .route("/vendor/coupons/:id/toggle", post(vendor::toggle_coupon))
        .route(
            "/addresses",
            get(addresses::list_addresses).post(addresses::add_address),
        )
        .route("/addresses/:id/default", post(addresses::make_default))
        .route("/products", get(products::list_products))
        .route("/products/:id/images", get(products::product_images))
        .route("/vendor/products", post(products::create_product))
        .route(
            "/vendor/products/:id",
            delete(products::delete_product).patch(products::update_product),
        )
        .route("/vendor/products/:id/restore", post(products::restore_product))
        .route("/vendor/images", post(products::add_image))
        .route("/vendor/images/:id/primary", post(products::make_primary_image))
        .route(
            "/returns",
            get(returns::list_returns).post(returns::open_return),
        )
        .route("/vendor/returns/:id", post(returns::resolve_return))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::notify::{StoreEvent, testing::RecordingNotifier};
    use crate::entities::{Product, ProductStatus};
    use crate::errors::Result;
    use crate::test_utils::*;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use sea_orm::EntityTrait;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    struct Call<'a> {
        method: Method,
        uri: &'a str,
        user: Option<&'a str>,
        vendor: Option<i64>,
        body: Option<Value>,
    }

    impl<'a> Call<'a> {
        fn new(method: Method, uri: &'a str) -> Self {
            Self {
                method,
                uri,
                user: Some("alice"),
                vendor: None,
                body: None,
            }
        }

        fn anonymous(mut self) -> Self {
            self.user = None;
            self
        }

        fn vendor(mut self, vendor_id: i64) -> Self {
            self.vendor = Some(vendor_id);
            self
        }

        fn json(mut self, body: Value) -> Self {
            self.body = Some(body);
            self
        }

        async fn send(self, app: &Router) -> (StatusCode, Value) {
            let mut request = Request::builder().method(self.method).uri(self.uri);
            if let Some(user) = self.user {
                request = request.header(identity::USER_HEADER, user);
            }
            if let Some(vendor) = self.vendor {
                request = request.header(identity::VENDOR_HEADER, vendor.to_string());
            }
            let body = match self.body {
                Some(value) => {
                    request = request.header("content-type", "application/json");
                    Body::from(value.to_string())
                }
                None => Body::empty(),
            };

            let response = app
                .clone()
                .oneshot(request.body(body).unwrap())
                .await
                .unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, value)
        }
    }

    fn money(value: &Value) -> Decimal {
        serde_json::from_value(value.clone()).unwrap()
    }

    fn add_widget(product_id: i64, quantity: i64) -> Value {
        json!({ "product_id": product_id, "quantity": quantity })
    }

    async fn app_with_product() -> Result<(Router, i64, i64)> {
        let (db, vendor, widget) = setup_with_product().await?;
        let app = router(AppState::new(db, "http://shop.test"));
        Ok((app, vendor.id, widget.id))
    }

    #[tokio::test]
    async fn test_cart_endpoints() -> Result<()> {
        let (app, _vendor_id, widget_id) = app_with_product().await?;

        let (status, body) = Call::new(Method::POST, "/cart/items")
            .json(add_widget(widget_id, 2))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(money(&body["total"]), dec!(200.00));
        assert!(body.get("advisory_message").is_none());

        let uri = format!("/cart/items/{widget_id}");
        let (status, body) = Call::new(Method::PATCH, &uri)
            .json(json!({ "quantity": 10 }))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["advisory_message"], "only 5 in stock");
        assert_eq!(body["cart_snapshot"]["lines"][0]["quantity"], 5);
        assert_eq!(money(&body["total"]), dec!(500.00));

        let (_, body) = Call::new(Method::DELETE, &uri).send(&app).await;
        assert_eq!(body["cart_snapshot"]["item_count"], 0);
        assert_eq!(money(&body["total"]), Decimal::ZERO);
        Ok(())
    }

    #[tokio::test]
    async fn test_cart_rejects_bad_input() -> Result<()> {
        let (app, _vendor_id, widget_id) = app_with_product().await?;

        let (status, body) = Call::new(Method::POST, "/cart/items")
            .json(add_widget(widget_id, 0))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["reason"], "invalid_quantity");

        let (status, body) = Call::new(Method::POST, "/cart/items")
            .json(add_widget(999, 1))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["reason"], "product_not_found");

        let (status, _) = Call::new(Method::GET, "/cart").anonymous().send(&app).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_to_cart_ignores_client_price_and_clamps_to_stock() -> Result<()> {
        let (app, _vendor_id, widget_id) = app_with_product().await?;

        let (status, body) = Call::new(Method::POST, "/cart/items")
            .json(json!({
                "product_id": widget_id,
                "quantity": 50,
                "unit_price": "0.01",
                "title": "Free Widget",
            }))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["advisory_message"], "only 5 in stock");
        let line = &body["cart_snapshot"]["lines"][0];
        assert_eq!(line["quantity"], 5);
        assert_eq!(money(&line["unit_price"]), dec!(100.00));
        assert_eq!(line["display_title"], "Widget");
        assert_eq!(money(&body["total"]), dec!(500.00));

        // The order is priced from the catalog as well
        let (_, body) = Call::new(Method::POST, "/orders/pending").send(&app).await;
        let order_id = body["order"]["id"].as_i64().unwrap();
        let (_, body) = Call::new(Method::POST, &format!("/orders/{order_id}/checkout"))
            .send(&app)
            .await;
        assert_eq!(money(&body["total"]), dec!(500.00));
        Ok(())
    }

    #[tokio::test]
    async fn test_add_to_cart_rejects_unlisted_product() -> Result<()> {
        let (db, vendor, _widget) = setup_with_product().await?;
        let empty = create_custom_product(&db, vendor.id, "Empty Shelf", dec!(5.00), 0).await?;
        let app = router(AppState::new(db, "http://shop.test"));

        let (status, body) = Call::new(Method::POST, "/cart/items")
            .json(add_widget(empty.id, 1))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["reason"], "product_not_found");

        let (_, body) = Call::new(Method::GET, "/cart").send(&app).await;
        assert_eq!(body["cart_snapshot"]["item_count"], 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_with_coupon() -> Result<()> {
        let (db, vendor, widget) = setup_with_product().await?;
        create_test_coupon(&db, vendor.id, "SAVE10").await?;
        let app = router(AppState::new(db, "http://shop.test"));

        Call::new(Method::POST, "/cart/items")
            .json(add_widget(widget.id, 2))
            .send(&app)
            .await;
        let (status, body) = Call::new(Method::POST, "/orders/pending").send(&app).await;
        assert_eq!(status, StatusCode::OK);
        let order_id = body["order"]["id"].as_i64().unwrap();

        let checkout = format!("/orders/{order_id}/checkout");
        let (status, body) = Call::new(Method::POST, &checkout)
            .json(json!({ "coupon_code": "save10" }))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["line_items"].as_array().unwrap().len(), 1);
        assert_eq!(money(&body["subtotal"]), dec!(200.00));
        assert_eq!(money(&body["discount"]), dec!(15.00));
        assert_eq!(money(&body["total"]), dec!(185.00));

        let coupon = format!("/orders/{order_id}/coupon");
        let (status, body) = Call::new(Method::POST, &coupon)
            .json(json!({ "code": "SAVE10" }))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["reason"], "coupon_already_applied");

        // Re-entering checkout without a code drops the coupon
        let (_, body) = Call::new(Method::POST, &checkout).send(&app).await;
        assert_eq!(money(&body["total"]), dec!(200.00));
        assert_eq!(body["notices"][0], "coupon removed because cart changed");
        Ok(())
    }

    #[tokio::test]
    async fn test_cod_checkout_then_status_changes() -> Result<()> {
        let (db, vendor, widget) = setup_with_product().await?;
        let notifier = Arc::new(RecordingNotifier::default());
        let app = router(
            AppState::new(db.clone(), "http://shop.test").with_notifier(notifier.clone()),
        );

        Call::new(Method::POST, "/cart/items")
            .json(add_widget(widget.id, 5))
            .send(&app)
            .await;
        let (_, body) = Call::new(Method::POST, "/orders/pending").send(&app).await;
        let order_id = body["order"]["id"].as_i64().unwrap();
        Call::new(Method::POST, &format!("/orders/{order_id}/checkout"))
            .send(&app)
            .await;

        let (status, body) = Call::new(Method::POST, &format!("/orders/{order_id}/cod"))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["order"]["order_status"], "shipped");
        assert_eq!(body["order"]["paid_status"], false);
        assert_eq!(body["inventory"]["adjusted"][0]["delisted"], true);

        let product = Product::find_by_id(widget.id).one(&db).await?.unwrap();
        assert_eq!(product.stock_count, 0);
        assert_eq!(product.product_status, ProductStatus::Draft);
        assert!(matches!(
            notifier.events.lock().as_slice(),
            [StoreEvent::OrderConfirmed { .. }]
        ));

        let (_, body) = Call::new(Method::GET, "/cart").send(&app).await;
        assert_eq!(body["cart_snapshot"]["item_count"], 0);

        let status_uri = format!("/vendor/orders/{order_id}/status");
        let (status, body) = Call::new(Method::POST, &status_uri)
            .vendor(vendor.id)
            .json(json!({ "status": "delivered" }))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["order"]["order_status"], "delivered");

        let (status, body) = Call::new(Method::POST, &status_uri)
            .vendor(vendor.id)
            .json(json!({ "status": "processing" }))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["reason"], "invalid_transition");
        assert_eq!(body["order"]["id"], order_id);
        assert_eq!(body["order"]["order_status"], "delivered");

        let (status, _) = Call::new(Method::POST, &status_uri)
            .vendor(vendor.id + 100)
            .json(json!({ "status": "delivered" }))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        Ok(())
    }

    #[tokio::test]
    async fn test_gateway_flow() -> Result<()> {
        let (app, _vendor_id, widget_id) = app_with_product().await?;
        Call::new(Method::POST, "/cart/items")
            .json(add_widget(widget_id, 1))
            .send(&app)
            .await;
        let (_, body) = Call::new(Method::POST, "/orders/pending").send(&app).await;
        let order_id = body["order"]["id"].as_i64().unwrap();
        Call::new(Method::POST, &format!("/orders/{order_id}/checkout"))
            .send(&app)
            .await;

        let (status, body) = Call::new(Method::GET, &format!("/orders/{order_id}/gateway"))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["gateway"]["notify_url"],
            format!("http://shop.test/orders/{order_id}/gateway/confirm")
        );

        let confirm = format!("/orders/{order_id}/gateway/confirm");
        let (status, body) = Call::new(Method::POST, &confirm).anonymous().send(&app).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["order"]["order_status"], "processing");
        assert_eq!(body["order"]["paid_status"], true);

        let (status, _) = Call::new(Method::GET, "/orders/999").send(&app).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_vendor_coupon_endpoints() -> Result<()> {
        let (app, vendor_id, _widget_id) = app_with_product().await?;
        let expires = (chrono::Utc::now() + chrono::Duration::days(7)).to_rfc3339();

        let (status, body) = Call::new(Method::POST, "/vendor/coupons")
            .vendor(vendor_id)
            .json(json!({
                "code": " spring ",
                "discount_percent": 20.0,
                "expires_at": expires,
            }))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["coupon"]["code"], "SPRING");
        let coupon_id = body["coupon"]["id"].as_i64().unwrap();

        let (_, body) = Call::new(Method::POST, &format!("/vendor/coupons/{coupon_id}/toggle"))
            .vendor(vendor_id)
            .send(&app)
            .await;
        assert_eq!(body["coupon"]["active"], false);

        let (_, body) = Call::new(Method::GET, "/vendor/coupons?filter=inactive")
            .vendor(vendor_id)
            .send(&app)
            .await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, body) = Call::new(Method::DELETE, &format!("/vendor/coupons/{coupon_id}"))
            .vendor(vendor_id)
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        Ok(())
    }

    #[tokio::test]
    async fn test_address_default_switch() -> Result<()> {
        let (app, _vendor_id, _widget_id) = app_with_product().await?;
        for line in ["1 High St", "2 Low Rd"] {
            let (status, _) = Call::new(Method::POST, "/addresses")
                .json(json!({ "address": line }))
                .send(&app)
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, body) = Call::new(Method::GET, "/addresses").send(&app).await;
        let second = body
            .as_array()
            .unwrap()
            .iter()
            .find(|a| a["address"] == "2 Low Rd")
            .unwrap()["id"]
            .as_i64()
            .unwrap();

        let (status, body) = Call::new(Method::POST, &format!("/addresses/{second}/default"))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["address"]["is_default"], true);

        let (_, body) = Call::new(Method::GET, "/addresses").send(&app).await;
        let defaults = body
            .as_array()
            .unwrap()
            .iter()
            .filter(|a| a["is_default"] == true)
            .count();
        assert_eq!(defaults, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_vendor_product_lifecycle_endpoints() -> Result<()> {
        let (app, vendor_id, widget_id) = app_with_product().await?;

        let (status, body) = Call::new(Method::POST, "/vendor/products")
            .vendor(vendor_id)
            .json(json!({
                "title": "Gadget",
                "amount": "12.50",
                "stock_count": 0,
                "publish": true,
            }))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["product"]["product_status"], "draft");
        assert_eq!(
            body["advisory_message"],
            crate::core::product::PUBLISH_ADVISORY
        );
        let gadget_id = body["product"]["id"].as_i64().unwrap();

        let (status, body) = Call::new(Method::PATCH, &format!("/vendor/products/{gadget_id}"))
            .vendor(vendor_id)
            .json(json!({ "stock_count": 3, "publish": true }))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["product"]["product_status"], "published");
        assert!(body.get("advisory_message").is_none());

        let (_, body) = Call::new(Method::GET, "/products").anonymous().send(&app).await;
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (status, _) = Call::new(Method::DELETE, &format!("/vendor/products/{widget_id}"))
            .vendor(vendor_id + 100)
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = Call::new(Method::DELETE, &format!("/vendor/products/{widget_id}"))
            .vendor(vendor_id)
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["product"]["product_status"], "deleted");
        let (_, body) = Call::new(Method::GET, "/products").anonymous().send(&app).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let restore = format!("/vendor/products/{widget_id}/restore");
        let (status, body) = Call::new(Method::POST, &restore)
            .vendor(vendor_id)
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["product"]["product_status"], "draft");
        Ok(())
    }

    #[tokio::test]
    async fn test_vendor_image_endpoints() -> Result<()> {
        let (app, vendor_id, widget_id) = app_with_product().await?;
        let owner = json!({ "kind": "product", "id": widget_id });

        let (status, body) = Call::new(Method::POST, "/vendor/images")
            .vendor(vendor_id + 100)
            .json(json!({ "owner": owner, "url": "/media/w.jpg" }))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["reason"], "permission_denied");

        let mut ids = Vec::new();
        for url in ["/media/a.jpg", "/media/b.jpg"] {
            let (status, body) = Call::new(Method::POST, "/vendor/images")
                .vendor(vendor_id)
                .json(json!({ "owner": owner, "url": url, "is_primary": true }))
                .send(&app)
                .await;
            assert_eq!(status, StatusCode::CREATED);
            ids.push(body["image"]["id"].as_i64().unwrap());
        }

        let primary = format!("/vendor/images/{}/primary", ids[0]);
        let (status, _) = Call::new(Method::POST, &primary)
            .vendor(vendor_id + 100)
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, body) = Call::new(Method::POST, &primary)
            .vendor(vendor_id)
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["image"]["is_primary"], true);

        let (_, body) = Call::new(Method::GET, &format!("/products/{widget_id}/images"))
            .anonymous()
            .send(&app)
            .await;
        let images = body.as_array().unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0]["id"], ids[0]);
        assert_eq!(images[0]["is_primary"], true);
        assert_eq!(images[1]["is_primary"], false);

        // The cart line picks up the primary image
        let (_, body) = Call::new(Method::POST, "/cart/items")
            .json(add_widget(widget_id, 1))
            .send(&app)
            .await;
        assert_eq!(body["cart_snapshot"]["lines"][0]["display_image"], "/media/a.jpg");
        Ok(())
    }

    #[tokio::test]
    async fn test_return_request_endpoints() -> Result<()> {
        let (db, vendor, widget) = setup_with_product().await?;
        let app = router(AppState::new(db, "http://shop.test"));

        Call::new(Method::POST, "/cart/items")
            .json(add_widget(widget.id, 1))
            .send(&app)
            .await;
        let (_, body) = Call::new(Method::POST, "/orders/pending").send(&app).await;
        let order_id = body["order"]["id"].as_i64().unwrap();
        Call::new(Method::POST, &format!("/orders/{order_id}/checkout"))
            .send(&app)
            .await;
        Call::new(Method::POST, &format!("/orders/{order_id}/cod"))
            .send(&app)
            .await;
        let (_, body) = Call::new(Method::GET, &format!("/orders/{order_id}"))
            .send(&app)
            .await;
        let line_item_id = body["line_items"][0]["id"].as_i64().unwrap();
        let request = json!({ "line_item_id": line_item_id, "reason": "Arrived broken" });

        // Shipped orders cannot be returned yet
        let (status, body) = Call::new(Method::POST, "/returns")
            .json(request.clone())
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["reason"], "return_not_allowed");

        Call::new(Method::POST, &format!("/vendor/orders/{order_id}/status"))
            .vendor(vendor.id)
            .json(json!({ "status": "delivered" }))
            .send(&app)
            .await;
        let (status, body) = Call::new(Method::POST, "/returns")
            .json(request)
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["return_request"]["status"], "pending");
        let request_id = body["return_request"]["id"].as_i64().unwrap();

        let (_, body) = Call::new(Method::GET, "/returns").send(&app).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let resolve = format!("/vendor/returns/{request_id}");
        let (status, _) = Call::new(Method::POST, &resolve)
            .vendor(vendor.id + 100)
            .json(json!({ "approve": true }))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, body) = Call::new(Method::POST, &resolve)
            .vendor(vendor.id)
            .json(json!({ "approve": true }))
            .send(&app)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["return_request"]["status"], "approved");
        Ok(())
    }
}
