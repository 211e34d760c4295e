//! Inventory adjuster - stock decrement on COD fulfilment.
//!
//! Each decrement is one conditional `UPDATE` so that concurrent fulfilments of the same product
//! cannot drive stock below zero:
//!
//! ```sql
//! stock_count    = CASE WHEN stock_count > :qty THEN stock_count - :qty ELSE 0 END,
//! in_stock       = CASE WHEN stock_count > :qty THEN in_stock ELSE FALSE END,
//! status         = CASE WHEN stock_count > :qty THEN status ELSE FALSE END,
//! product_status = CASE WHEN stock_count > :qty OR product_status = 'deleted'
//!                       THEN product_status ELSE 'draft' END
//! ```
//!
//! Reaching zero stock therefore delists the product (auto-draft) in the same statement.

use crate::{
    core::product::find_live_product_by_title,
    entities::{OrderLineItem, Product, ProductStatus, order_line_item, product},
    errors::Result,
};
use sea_orm::{
    ActiveEnum, ConnectionTrait, QueryOrder,
    prelude::*,
    sea_query::{Expr, SimpleExpr},
};
use serde::Serialize;
use tracing::{info, warn};

/// Stock change applied to one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockAdjustment {
    pub product_id: i64,
    pub quantity: i32,
    pub remaining: i32,
    /// Stock hit zero and the product was moved to draft
    pub delisted: bool,
}

/// What happened to every line of an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventoryReport {
    pub adjusted: Vec<StockAdjustment>,
    /// Titles of lines whose product could not be resolved
    pub skipped: Vec<String>,
}

/// Atomically decrements a product's stock, floored at zero.
///
/// Returns the product as stored afterwards, or `None` if it does not exist.
pub async fn decrement_stock<C>(db: &C, product_id: i64, quantity: i32) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    let quantity = quantity.max(0);
    let has_more = || Expr::col(product::Column::StockCount).gt(quantity);

    let remaining: SimpleExpr = Expr::case(
        has_more(),
        Expr::col(product::Column::StockCount).sub(quantity),
    )
    .finally(0)
    .into();
    let in_stock: SimpleExpr = Expr::case(has_more(), Expr::col(product::Column::InStock))
        .finally(false)
        .into();
    let listed: SimpleExpr = Expr::case(has_more(), Expr::col(product::Column::Status))
        .finally(false)
        .into();
    let keeps_status = has_more().or(
        Expr::col(product::Column::ProductStatus).eq(ProductStatus::Deleted.to_value()),
    );
    let product_status: SimpleExpr =
        Expr::case(keeps_status, Expr::col(product::Column::ProductStatus))
            .finally(Expr::val(ProductStatus::Draft.to_value()))
            .into();

    let result = Product::update_many()
        .col_expr(product::Column::StockCount, remaining)
        .col_expr(product::Column::InStock, in_stock)
        .col_expr(product::Column::Status, listed)
        .col_expr(product::Column::ProductStatus, product_status)
        .col_expr(
            product::Column::UpdatedAt,
            Expr::value(chrono::Utc::now()),
        )
        .filter(product::Column::Id.eq(product_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Ok(None);
    }
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

async fn resolve_product<C>(
    db: &C,
    line: &order_line_item::Model,
) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    if let Some(product_id) = line.product_id {
        return Ok(Product::find_by_id(product_id).one(db).await?);
    }
    // Lines written before product references were stored
    find_live_product_by_title(db, &line.item_title).await
}

/// Decrements stock for every line of `order_id`.
///
/// Lines whose product cannot be resolved are skipped with a warning; the batch never fails
/// because of them. Run inside the caller's transaction.
pub async fn adjust_for_order<C>(db: &C, order_id: i64) -> Result<InventoryReport>
where
    C: ConnectionTrait,
{
    let lines = OrderLineItem::find()
        .filter(order_line_item::Column::OrderId.eq(order_id))
        .order_by_asc(order_line_item::Column::Id)
        .all(db)
        .await?;

    let mut report = InventoryReport::default();
    for line in lines {
        let Some(before) = resolve_product(db, &line).await? else {
            warn!(
                "Order {}: no product matches line '{}', stock not adjusted",
                order_id, line.item_title
            );
            report.skipped.push(line.item_title);
            continue;
        };

        let product_id = before.id;
        let Some(product) = decrement_stock(db, product_id, line.quantity).await? else {
            report.skipped.push(line.item_title);
            continue;
        };

        // Only a sale that empties a listed product delists it
        let delisted = before.stock_count > 0
            && before.product_status != ProductStatus::Draft
            && product.stock_count == 0
            && product.product_status == ProductStatus::Draft;
        if delisted {
            info!("Product {} is out of stock and was moved to draft", product.id);
        }
        report.adjusted.push(StockAdjustment {
            product_id,
            quantity: line.quantity,
            remaining: product.stock_count,
            delisted,
        });
    }

    info!(
        "Order {}: adjusted stock for {} lines, skipped {}",
        order_id,
        report.adjusted.len(),
        report.skipped.len()
    );
    Ok(report)
}
