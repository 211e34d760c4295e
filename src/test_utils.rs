//! Shared test utilities for the storefront.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        coupon::{self, CouponDraft},
        notify::LogNotifier,
        product::{self, ProductDraft},
        vendor,
    },
    entities::{self, OrderStatus, coupon as coupon_entity, order, order_line_item},
    errors::Result,
};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test vendor with no owning user.
pub async fn create_test_vendor(
    db: &DatabaseConnection,
    title: &str,
) -> Result<entities::vendor::Model> {
    vendor::create_vendor(db, title, None).await
}

/// Creates a published test product with sensible defaults.
///
/// # Defaults
/// * price: 100.00
/// * stock: 5
pub async fn create_test_product(
    db: &DatabaseConnection,
    vendor_id: i64,
    title: &str,
) -> Result<entities::product::Model> {
    create_custom_product(db, vendor_id, title, dec!(100.00), 5).await
}

/// Creates a test product with custom price and stock.
/// Publishing is requested; products with zero stock end up as drafts.
pub async fn create_custom_product(
    db: &DatabaseConnection,
    vendor_id: i64,
    title: &str,
    price: Decimal,
    stock: i32,
) -> Result<entities::product::Model> {
    let draft = ProductDraft {
        title: title.to_string(),
        amount: price,
        old_price: Decimal::ZERO,
        stock_count: stock,
    };
    Ok(product::create_product(db, vendor_id, draft, true)
        .await?
        .product)
}

/// Sets up a complete test environment with a vendor and one published product.
/// Returns (db, vendor, product) where the product is "Widget" at 100.00 with 5 in stock.
pub async fn setup_with_product() -> Result<(
    DatabaseConnection,
    entities::vendor::Model,
    entities::product::Model,
)> {
    let db = setup_test_db().await?;
    let vendor = create_test_vendor(&db, "Test Vendor").await?;
    let product = create_test_product(&db, vendor.id, "Widget").await?;
    Ok((db, vendor, product))
}

/// Creates an active test coupon.
///
/// # Defaults
/// * `discount_percent`: 10
/// * `min_order`: 50.00
/// * `max_discount`: 15.00
/// * expires in 30 days
/// * `apply_once_per_user`: true
pub async fn create_test_coupon(
    db: &DatabaseConnection,
    vendor_id: i64,
    code: &str,
) -> Result<entities::coupon::Model> {
    let draft = CouponDraft {
        code: code.to_string(),
        discount_percent: 10.0,
        expires_at: Utc::now() + Duration::days(30),
        min_order: dec!(50.00),
        max_discount: dec!(15.00),
        active: true,
        apply_once_per_user: true,
    };
    coupon::create_coupon(db, &LogNotifier, vendor_id, &draft).await
}

/// Inserts a coupon that expired yesterday, bypassing draft validation.
pub async fn create_expired_coupon(
    db: &DatabaseConnection,
    vendor_id: i64,
    code: &str,
) -> Result<entities::coupon::Model> {
    let now = Utc::now();
    coupon_entity::ActiveModel {
        vendor_id: Set(vendor_id),
        code: Set(code.to_uppercase()),
        discount_percent: Set(10.0),
        active: Set(true),
        expires_at: Set(now - Duration::days(1)),
        min_order_cents: Set(0),
        max_discount_cents: Set(0),
        apply_once_per_user: Set(true),
        created_at: Set(now - Duration::days(31)),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a pending order for `user_id` with no line items.
pub async fn create_empty_order(
    db: &DatabaseConnection,
    user_id: &str,
    vendor_id: i64,
) -> Result<entities::order::Model> {
    let now = Utc::now();
    order::ActiveModel {
        user_id: Set(user_id.to_string()),
        vendor_id: Set(vendor_id),
        amount_cents: Set(0),
        coupon_id: Set(None),
        paid_status: Set(false),
        order_status: Set(OrderStatus::Pending),
        payment_method: Set(None),
        pending_key: Set(Some(user_id.to_string())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a pending order holding `quantity` units of `product`.
///
/// The amount is stored as quantity times the current product price, without coupon.
pub async fn create_test_order(
    db: &DatabaseConnection,
    user_id: &str,
    product: &entities::product::Model,
    quantity: i32,
) -> Result<entities::order::Model> {
    let line_total = product.amount_cents * i64::from(quantity);
    let order = create_empty_order(db, user_id, product.vendor_id).await?;

    order_line_item::ActiveModel {
        order_id: Set(order.id),
        product_id: Set(Some(product.id)),
        item_title: Set(product.title.clone()),
        image_ref: Set(String::new()),
        quantity: Set(quantity),
        unit_price_cents: Set(product.amount_cents),
        line_total_cents: Set(line_total),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let mut active: order::ActiveModel = order.into();
    active.amount_cents = Set(line_total);
    active.update(db).await.map_err(Into::into)
}

/// A pending order model that was never stored.
#[must_use]
pub fn order_fixture(user_id: &str) -> entities::order::Model {
    let now = Utc::now();
    entities::order::Model {
        id: 1,
        user_id: user_id.to_string(),
        vendor_id: 1,
        amount_cents: 0,
        coupon_id: None,
        paid_status: false,
        order_status: OrderStatus::Pending,
        payment_method: None,
        pending_key: Some(user_id.to_string()),
        created_at: now,
        updated_at: now,
    }
}
