//! Order reconciler - turns the session cart into a persisted, priced order.
//!
//! Entering checkout always rebuilds the order from the cart inside one transaction:
//!
//! 1. an attached coupon is detached (and the caller told so);
//! 2. every existing line item is deleted;
//! 3. each cart line whose product still exists becomes a fresh line item, priced at the
//!    unit price cached in the cart;
//! 4. the order amount is set to the new subtotal;
//! 5. an optional coupon code is validated against that subtotal and, when accepted, the
//!    amount is re-priced.
//!
//! Any failure rolls back the whole pass.

use crate::{
    core::{
        cart::Cart,
        coupon::{self, CouponOutcome, CouponRejection},
        image::{ImageOwner, primary_image_url},
        money::to_cents,
        order::{attached_coupon, line_items, lock_user_order, require_pending},
        pricing::{self, CouponTerms, LineAmount, PriceBreakdown},
        product::{find_live_product, get_product},
    },
    entities::{
        Order, OrderLineItem, OrderStatus, PaymentMethod, coupon as coupon_entity, order,
        order_line_item,
    },
    errors::{Error, Result},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect,
    Set, TransactionTrait, sea_query::OnConflict,
};
use serde::Serialize;
use std::fmt;
use tracing::{info, instrument, warn};

/// Where a checkout session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "payment_method", rename_all = "snake_case")]
pub enum CheckoutState {
    /// No line items yet
    Empty,
    /// Line items written and priced
    Priced,
    Finalized(PaymentMethod),
}

impl CheckoutState {
    #[must_use]
    pub fn of(order: &order::Model, line_count: usize) -> Self {
        match (order.order_status, order.payment_method) {
            (OrderStatus::Pending, _) if line_count == 0 => Self::Empty,
            (OrderStatus::Pending, _) | (_, None) => Self::Priced,
            (_, Some(method)) => Self::Finalized(method),
        }
    }
}

/// Informational messages produced while reconciling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckoutNotice {
    /// The order's coupon was detached and must be applied again
    CouponRemoved { code: Option<String> },
    /// A cart line was skipped because its product left the catalog
    ProductUnavailable { product_id: i64, title: String },
}

impl fmt::Display for CheckoutNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CouponRemoved { .. } => f.write_str("coupon removed because cart changed"),
            Self::ProductUnavailable { title, .. } => write!(
                f,
                "'{title}' is no longer available and has been removed from your order"
            ),
        }
    }
}

/// Everything the checkout page needs after one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutSummary {
    pub order: order::Model,
    pub line_items: Vec<order_line_item::Model>,
    pub pricing: PriceBreakdown,
    /// Coupon attached during this pass
    pub coupon: Option<coupon_entity::Model>,
    /// Why the requested coupon was not attached
    pub coupon_rejection: Option<CouponRejection>,
    pub notices: Vec<CheckoutNotice>,
    pub state: CheckoutState,
}

/// Result of applying a coupon outside a checkout pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CouponApplication {
    pub success: bool,
    pub reason: Option<CouponRejection>,
    pub order: order::Model,
    pub pricing: PriceBreakdown,
}

/// Returns the user's pending order, creating it from the cart if there is none.
///
/// The vendor comes from the first cart line's product. The amount is reset to the cart
/// subtotal on every call. A unique `pending_key` makes concurrent calls for the same user
/// converge on one order.
///
/// # Errors
/// Returns [`Error::EmptyCart`] for an empty cart and [`Error::ProductNotFound`] when the first
/// line's product has left the catalog.
#[instrument(skip(db, cart))]
pub async fn open_pending_order<C>(db: &C, user_id: &str, cart: &Cart) -> Result<order::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    let Some(first) = cart.lines().first() else {
        return Err(Error::EmptyCart);
    };
    let vendor_id = get_product(db, first.product_id).await?.vendor_id;
    let amount_cents = to_cents(cart.subtotal(), "amount")?;
    let now = chrono::Utc::now();

    let txn = db.begin().await?;
    let candidate = order::ActiveModel {
        user_id: Set(user_id.to_string()),
        vendor_id: Set(vendor_id),
        amount_cents: Set(amount_cents),
        coupon_id: Set(None),
        paid_status: Set(false),
        order_status: Set(OrderStatus::Pending),
        payment_method: Set(None),
        pending_key: Set(Some(user_id.to_string())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let inserted = Order::insert(candidate)
        .on_conflict(
            OnConflict::column(order::Column::PendingKey)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

    let existing = Order::find()
        .filter(order::Column::PendingKey.eq(user_id))
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| {
            DbErr::RecordNotFound(format!("pending order for user {user_id}"))
        })?;

    let order = if inserted == 0 && existing.amount_cents != amount_cents {
        let mut active: order::ActiveModel = existing.into();
        active.amount_cents = Set(amount_cents);
        active.updated_at = Set(now);
        active.update(&txn).await?
    } else {
        existing
    };
    txn.commit().await?;

    if inserted > 0 {
        info!("Opened pending order {} for user {}", order.id, user_id);
    }
    Ok(order)
}

async fn reprice<C>(
    db: &C,
    order: order::Model,
    lines: &[order_line_item::Model],
    terms: Option<&CouponTerms>,
) -> Result<(order::Model, PriceBreakdown)>
where
    C: ConnectionTrait,
{
    let pricing = pricing::compute(lines, terms);
    let amount_cents = to_cents(pricing.total, "amount")?;
    if order.amount_cents == amount_cents {
        return Ok((order, pricing));
    }
    let mut active: order::ActiveModel = order.into();
    active.amount_cents = Set(amount_cents);
    active.updated_at = Set(chrono::Utc::now());
    Ok((active.update(db).await?, pricing))
}

/// Rebuilds order `order_id` from `cart` and optionally applies `coupon_code`.
///
/// A rejected coupon does not fail the pass: the rebuilt order is committed and the rejection
/// is reported in [`CheckoutSummary::coupon_rejection`].
///
/// # Errors
/// Returns [`Error::OrderNotFound`] if the order does not belong to the user and
/// [`Error::OrderNotPending`] if it was already finalised.
#[instrument(skip(db, cart))]
pub async fn checkout_enter<C>(
    db: &C,
    user_id: &str,
    order_id: i64,
    cart: &Cart,
    coupon_code: Option<&str>,
) -> Result<CheckoutSummary>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let mut order = lock_user_order(&txn, user_id, order_id).await?;
    require_pending(&order)?;
    let mut notices = Vec::new();

    if order.coupon_id.is_some() {
        let code = attached_coupon(&txn, &order).await?.map(|c| c.code);
        order = coupon::detach_coupon(&txn, order).await?;
        info!("Order {}: coupon {:?} removed because cart changed", order_id, code);
        notices.push(CheckoutNotice::CouponRemoved { code });
    }

    OrderLineItem::delete_many()
        .filter(order_line_item::Column::OrderId.eq(order_id))
        .exec(&txn)
        .await?;

    let mut lines = Vec::with_capacity(cart.len());
    for cart_line in cart.lines() {
        let Some(product) = find_live_product(&txn, cart_line.product_id).await? else {
            warn!(
                "Order {}: product {} vanished before checkout, skipping",
                order_id, cart_line.product_id
            );
            notices.push(CheckoutNotice::ProductUnavailable {
                product_id: cart_line.product_id,
                title: cart_line.display_title.clone(),
            });
            continue;
        };

        let quantity = i32::try_from(cart_line.quantity).map_err(|_| Error::InvalidQuantity {
            quantity: i64::from(cart_line.quantity),
        })?;
        let image_ref = primary_image_url(&txn, ImageOwner::Product(product.id)).await?;
        let line = order_line_item::ActiveModel {
            order_id: Set(order_id),
            product_id: Set(Some(product.id)),
            item_title: Set(product.title),
            image_ref: Set(image_ref),
            quantity: Set(quantity),
            unit_price_cents: Set(to_cents(cart_line.unit_price, "unit_price")?),
            line_total_cents: Set(to_cents(cart_line.line_total(), "line_total")?),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        lines.push(line);
    }

    let subtotal = pricing::subtotal(&lines);
    let (mut order, mut pricing) = reprice(&txn, order, &lines, None).await?;

    let mut applied = None;
    let mut coupon_rejection = None;
    if let Some(code) = coupon_code.map(str::trim).filter(|c| !c.is_empty()) {
        match coupon::validate_and_attach(&txn, order.clone(), code, subtotal).await? {
            CouponOutcome::Applied {
                order: with_coupon,
                coupon,
            } => {
                let terms = CouponTerms::from_coupon(&coupon);
                (order, pricing) = reprice(&txn, with_coupon, &lines, Some(&terms)).await?;
                applied = Some(coupon);
            }
            CouponOutcome::Rejected(reason) => coupon_rejection = Some(reason),
        }
    }

    txn.commit().await?;

    info!(
        "Order {} reconciled: {} lines, subtotal {}, total {}",
        order.id,
        lines.len(),
        pricing.subtotal,
        pricing.total
    );
    let state = CheckoutState::of(&order, lines.len());
    Ok(CheckoutSummary {
        order,
        line_items: lines,
        pricing,
        coupon: applied,
        coupon_rejection,
        notices,
        state,
    })
}

/// Applies a coupon to a pending order using its current line items.
#[instrument(skip(db))]
pub async fn apply_coupon<C>(
    db: &C,
    user_id: &str,
    order_id: i64,
    code: &str,
) -> Result<CouponApplication>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let order = lock_user_order(&txn, user_id, order_id).await?;
    require_pending(&order)?;

    let lines = line_items(&txn, order_id).await?;
    let subtotal = pricing::subtotal(&lines);

    let application = match coupon::validate_and_attach(&txn, order.clone(), code, subtotal).await? {
        CouponOutcome::Applied { order, coupon } => {
            let terms = CouponTerms::from_coupon(&coupon);
            let (order, pricing) = reprice(&txn, order, &lines, Some(&terms)).await?;
            CouponApplication {
                success: true,
                reason: None,
                order,
                pricing,
            }
        }
        CouponOutcome::Rejected(reason) => {
            let terms = attached_coupon(&txn, &order)
                .await?
                .as_ref()
                .map(CouponTerms::from_coupon);
            CouponApplication {
                success: false,
                reason: Some(reason),
                pricing: pricing::compute(&lines, terms.as_ref()),
                order,
            }
        }
    };
    txn.commit().await?;
    Ok(application)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::cart::CartLineDraft;
    use crate::core::product::delete_product;
    use crate::entities::{Coupon, ProductModel};
    use crate::test_utils::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn cart_with(items: &[(&ProductModel, i64, Decimal)]) -> Cart {
        let mut cart = Cart::new();
        for (product, quantity, price) in items {
            cart.add(CartLineDraft {
                product_id: Some(product.id),
                quantity: Some(*quantity),
                unit_price: Some(*price),
                title: Some(product.title.clone()),
                image: Some(String::new()),
            });
        }
        cart
    }

    #[tokio::test]
    async fn test_open_pending_order_is_get_or_create() -> Result<()> {
        let (db, vendor, widget) = setup_with_product().await?;
        let cart = cart_with(&[(&widget, 2, dec!(100.00))]);

        let first = open_pending_order(&db, "alice", &cart).await?;
        assert_eq!(first.vendor_id, vendor.id);
        assert_eq!(first.amount_cents, 20000);
        assert_eq!(first.order_status, OrderStatus::Pending);

        let cart = cart_with(&[(&widget, 3, dec!(100.00))]);
        let second = open_pending_order(&db, "alice", &cart).await?;
        assert_eq!(second.id, first.id);
        assert_eq!(second.amount_cents, 30000);

        let other = open_pending_order(&db, "bob", &cart).await?;
        assert_ne!(other.id, first.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_open_pending_order_concurrent_calls_share_one_order() -> Result<()> {
        let (db, _vendor, widget) = setup_with_product().await?;
        let cart = cart_with(&[(&widget, 1, dec!(100.00))]);

        let (a, b) = tokio::join!(
            open_pending_order(&db, "alice", &cart),
            open_pending_order(&db, "alice", &cart)
        );
        assert_eq!(a?.id, b?.id);
        let pending = Order::find()
            .filter(order::Column::UserId.eq("alice"))
            .all(&db)
            .await?;
        assert_eq!(pending.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_open_pending_order_rejects_empty_cart() -> Result<()> {
        let db = setup_test_db().await?;
        let result = open_pending_order(&db, "alice", &Cart::new()).await;
        assert!(matches!(result, Err(Error::EmptyCart)));
        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_without_coupon() -> Result<()> {
        let (db, _vendor, widget) = setup_with_product().await?;
        let cart = cart_with(&[(&widget, 2, dec!(100.00))]);
        let order = open_pending_order(&db, "alice", &cart).await?;

        let summary = checkout_enter(&db, "alice", order.id, &cart, None).await?;
        assert_eq!(summary.pricing.subtotal, dec!(200.00));
        assert_eq!(summary.pricing.discount, dec!(0));
        assert_eq!(summary.pricing.total, dec!(200.00));
        assert_eq!(summary.order.amount_cents, 20000);
        assert_eq!(summary.state, CheckoutState::Priced);
        assert_eq!(summary.line_items.len(), 1);
        let line = &summary.line_items[0];
        assert_eq!(line.item_title, "Widget");
        assert_eq!(line.product_id, Some(widget.id));
        assert_eq!(line.image_ref, "/static/assets/imgs/default.jpg");
        assert!(summary.notices.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_applies_capped_coupon() -> Result<()> {
        let (db, vendor, widget) = setup_with_product().await?;
        create_test_coupon(&db, vendor.id, "SAVE10").await?;
        let cart = cart_with(&[(&widget, 2, dec!(100.00))]);
        let order = open_pending_order(&db, "alice", &cart).await?;

        let summary = checkout_enter(&db, "alice", order.id, &cart, Some("save10")).await?;
        assert_eq!(summary.pricing.discount, dec!(15.00));
        assert_eq!(summary.pricing.total, dec!(185.00));
        assert_eq!(summary.order.amount_cents, 18500);
        assert_eq!(summary.coupon.as_ref().map(|c| c.code.as_str()), Some("SAVE10"));
        assert!(summary.coupon_rejection.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_apply_same_coupon_twice_is_rejected() -> Result<()> {
        let (db, vendor, widget) = setup_with_product().await?;
        create_test_coupon(&db, vendor.id, "SAVE10").await?;
        let cart = cart_with(&[(&widget, 2, dec!(100.00))]);
        let order = open_pending_order(&db, "alice", &cart).await?;
        checkout_enter(&db, "alice", order.id, &cart, Some("SAVE10")).await?;

        let again = apply_coupon(&db, "alice", order.id, "SAVE10").await?;
        assert!(!again.success);
        assert_eq!(again.reason, Some(CouponRejection::AlreadyApplied));
        // The first application still stands
        assert_eq!(again.pricing.total, dec!(185.00));
        assert_eq!(again.order.amount_cents, 18500);
        Ok(())
    }

    #[tokio::test]
    async fn test_reentering_checkout_detaches_coupon() -> Result<()> {
        let (db, vendor, widget) = setup_with_product().await?;
        create_test_coupon(&db, vendor.id, "SAVE10").await?;
        let cart = cart_with(&[(&widget, 2, dec!(100.00))]);
        let order = open_pending_order(&db, "alice", &cart).await?;
        checkout_enter(&db, "alice", order.id, &cart, Some("SAVE10")).await?;

        let summary = checkout_enter(&db, "alice", order.id, &cart, None).await?;
        assert!(summary.order.coupon_id.is_none());
        assert_eq!(summary.pricing.total, dec!(200.00));
        assert_eq!(
            summary.notices,
            vec![CheckoutNotice::CouponRemoved {
                code: Some("SAVE10".to_string())
            }]
        );
        assert_eq!(
            summary.notices[0].to_string(),
            "coupon removed because cart changed"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_replaces_stale_line_items() -> Result<()> {
        let (db, vendor, widget) = setup_with_product().await?;
        let gadget = create_custom_product(&db, vendor.id, "Gadget", dec!(3.50), 10).await?;
        let cart = cart_with(&[(&widget, 2, dec!(100.00)), (&gadget, 1, dec!(3.50))]);
        let order = open_pending_order(&db, "alice", &cart).await?;
        checkout_enter(&db, "alice", order.id, &cart, None).await?;

        let smaller = cart_with(&[(&gadget, 4, dec!(3.50))]);
        let summary = checkout_enter(&db, "alice", order.id, &smaller, None).await?;

        let stored = line_items(&db, order.id).await?;
        assert_eq!(stored, summary.line_items);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].product_id, Some(gadget.id));
        assert_eq!(stored[0].quantity, 4);
        assert_eq!(summary.pricing.total, dec!(14.00));
        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_uses_cart_cached_price() -> Result<()> {
        let (db, _vendor, widget) = setup_with_product().await?;
        let cart = cart_with(&[(&widget, 1, dec!(80.00))]);
        let order = open_pending_order(&db, "alice", &cart).await?;

        let summary = checkout_enter(&db, "alice", order.id, &cart, None).await?;
        assert_eq!(summary.line_items[0].unit_price_cents, 8000);
        assert_eq!(summary.pricing.total, dec!(80.00));
        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_skips_vanished_product() -> Result<()> {
        let (db, vendor, widget) = setup_with_product().await?;
        let gadget = create_custom_product(&db, vendor.id, "Gadget", dec!(3.50), 10).await?;
        let cart = cart_with(&[(&widget, 1, dec!(100.00)), (&gadget, 2, dec!(3.50))]);
        let order = open_pending_order(&db, "alice", &cart).await?;
        delete_product(&db, vendor.id, gadget.id).await?;

        let summary = checkout_enter(&db, "alice", order.id, &cart, None).await?;
        assert_eq!(summary.line_items.len(), 1);
        assert_eq!(summary.pricing.total, dec!(100.00));
        assert_eq!(
            summary.notices,
            vec![CheckoutNotice::ProductUnavailable {
                product_id: gadget.id,
                title: "Gadget".to_string(),
            }]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_rejected_coupon_still_commits_lines() -> Result<()> {
        let (db, vendor, widget) = setup_with_product().await?;
        create_test_coupon(&db, vendor.id, "SAVE10").await?;
        let cart = cart_with(&[(&widget, 1, dec!(40.00))]);
        let order = open_pending_order(&db, "alice", &cart).await?;

        let summary = checkout_enter(&db, "alice", order.id, &cart, Some("SAVE10")).await?;
        assert_eq!(
            summary.coupon_rejection,
            Some(CouponRejection::BelowMinimum {
                minimum: dec!(50.00)
            })
        );
        assert_eq!(summary.pricing.total, dec!(40.00));
        assert_eq!(line_items(&db, order.id).await?.len(), 1);

        let summary = checkout_enter(&db, "alice", order.id, &cart, Some("NOPE")).await?;
        assert_eq!(summary.coupon_rejection, Some(CouponRejection::NotFound));
        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_failure_rolls_back_everything() -> Result<()> {
        let (db, vendor, widget) = setup_with_product().await?;
        create_test_coupon(&db, vendor.id, "SAVE10").await?;
        let cart = cart_with(&[(&widget, 2, dec!(100.00))]);
        let order = open_pending_order(&db, "alice", &cart).await?;
        let before = checkout_enter(&db, "alice", order.id, &cart, Some("SAVE10")).await?;

        // A price that cannot be stored aborts the pass after the coupon was detached
        // and the old lines deleted
        let mut broken = Cart::new();
        broken.add(CartLineDraft {
            product_id: Some(widget.id),
            quantity: Some(1),
            unit_price: Some(Decimal::MAX),
            title: Some("Widget".to_string()),
            image: None,
        });
        let result = checkout_enter(&db, "alice", order.id, &broken, None).await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        let order = crate::core::order::get_order(&db, order.id).await?;
        assert_eq!(order.coupon_id, before.order.coupon_id);
        assert_eq!(order.amount_cents, 18500);
        assert_eq!(line_items(&db, order.id).await?, before.line_items);
        assert!(Coupon::find().one(&db).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_rejects_finalized_order() -> Result<()> {
        let (db, vendor, widget) = setup_with_product().await?;
        let cart = cart_with(&[(&widget, 1, dec!(100.00))]);
        let order = open_pending_order(&db, "alice", &cart).await?;
        crate::core::order_status::change_order_status(
            &db,
            vendor.id,
            order.id,
            OrderStatus::Processing,
        )
        .await?;

        let result = checkout_enter(&db, "alice", order.id, &cart, None).await;
        assert!(matches!(result, Err(Error::OrderNotPending { .. })));
        let result = apply_coupon(&db, "alice", order.id, "SAVE10").await;
        assert!(matches!(result, Err(Error::OrderNotPending { .. })));
        Ok(())
    }

    #[test]
    fn test_checkout_state_of() {
        let mut order = crate::test_utils::order_fixture("alice");
        assert_eq!(CheckoutState::of(&order, 0), CheckoutState::Empty);
        assert_eq!(CheckoutState::of(&order, 2), CheckoutState::Priced);
        order.order_status = OrderStatus::Shipped;
        order.payment_method = Some(PaymentMethod::Cod);
        assert_eq!(
            CheckoutState::of(&order, 2),
            CheckoutState::Finalized(PaymentMethod::Cod)
        );
    }
}
