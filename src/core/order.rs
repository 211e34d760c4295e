//! Order lookups shared by the reconciler and the status machine.

use crate::{
    core::pricing::{self, CouponTerms, PriceBreakdown},
    entities::{Coupon, Order, OrderLineItem, OrderStatus, coupon, order, order_line_item},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, QueryOrder, QuerySelect, prelude::*};
use serde::Serialize;

/// An order with its line items and current price breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDetail {
    pub order: order::Model,
    pub line_items: Vec<order_line_item::Model>,
    pub pricing: PriceBreakdown,
    pub coupon: Option<coupon::Model>,
}

/// Retrieves an order by id.
///
/// # Errors
/// Returns [`Error::OrderNotFound`] if no such order exists.
pub async fn get_order<C>(db: &C, order_id: i64) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { order_id })
}

/// Loads an order owned by `user_id` and locks it for the rest of the transaction.
///
/// Orders of other users are reported as missing.
pub async fn lock_user_order<C>(db: &C, user_id: &str, order_id: i64) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    Order::find_by_id(order_id)
        .filter(order::Column::UserId.eq(user_id))
        .lock_exclusive()
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { order_id })
}

/// Loads any order and locks it for the rest of the transaction.
pub async fn lock_order<C>(db: &C, order_id: i64) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    Order::find_by_id(order_id)
        .lock_exclusive()
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { order_id })
}

/// Fails unless the order is still `pending`.
pub fn require_pending(order: &order::Model) -> Result<()> {
    if order.order_status == OrderStatus::Pending {
        Ok(())
    } else {
        Err(Error::OrderNotPending {
            order_id: order.id,
            status: order.order_status,
        })
    }
}

/// Line items of an order in creation order.
pub async fn line_items<C>(db: &C, order_id: i64) -> Result<Vec<order_line_item::Model>>
where
    C: ConnectionTrait,
{
    OrderLineItem::find()
        .filter(order_line_item::Column::OrderId.eq(order_id))
        .order_by_asc(order_line_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The coupon attached to `order`, whatever its current state.
pub async fn attached_coupon<C>(db: &C, order: &order::Model) -> Result<Option<coupon::Model>>
where
    C: ConnectionTrait,
{
    match order.coupon_id {
        Some(coupon_id) => Coupon::find_by_id(coupon_id)
            .one(db)
            .await
            .map_err(Into::into),
        None => Ok(None),
    }
}

/// Prices an order from its stored line items and attached coupon.
pub async fn order_pricing<C>(db: &C, order: &order::Model) -> Result<PriceBreakdown>
where
    C: ConnectionTrait,
{
    let lines = line_items(db, order.id).await?;
    let terms = attached_coupon(db, order)
        .await?
        .as_ref()
        .map(CouponTerms::from_coupon);
    Ok(pricing::compute(&lines, terms.as_ref()))
}

/// Lists a user's orders, newest first.
pub async fn list_orders_for_user<C>(db: &C, user_id: &str) -> Result<Vec<order::Model>>
where
    C: ConnectionTrait,
{
    Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Order, line items and pricing for one of the user's orders.
pub async fn get_order_detail<C>(db: &C, user_id: &str, order_id: i64) -> Result<OrderDetail>
where
    C: ConnectionTrait,
{
    let order = Order::find_by_id(order_id)
        .filter(order::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { order_id })?;

    let line_items = line_items(db, order.id).await?;
    let coupon = attached_coupon(db, &order).await?;
    let pricing = pricing::compute(
        &line_items,
        coupon.as_ref().map(CouponTerms::from_coupon).as_ref(),
    );

    Ok(OrderDetail {
        order,
        line_items,
        pricing,
        coupon,
    })
}
