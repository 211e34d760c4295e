//! Order status machine.
//!
//! Status only moves forward through `pending < processing < shipped < delivered`. The single
//! backward move is [`COD_ACCEPT_TRANSITION`], taken when a COD customer accepts delivery.
//! Delivered orders never change status here; corrections go through return requests.
//!
//! Fulfilment methods differ in when stock is touched: COD checkout runs the inventory
//! adjuster, gateway confirmation does not.

use crate::{
    core::{
        inventory::{self, InventoryReport},
        money::{from_cents, to_cents},
        notify::{Notifier, StoreEvent, dispatch},
        order::{line_items, lock_order, lock_user_order, require_pending},
        pricing,
    },
    entities::{OrderStatus, PaymentMethod, order},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, TransactionTrait};
use serde::Serialize;
use tracing::{info, instrument};

/// The COD "delivery accepted" step, `shipped -> processing`.
pub const COD_ACCEPT_TRANSITION: (OrderStatus, OrderStatus) =
    (OrderStatus::Shipped, OrderStatus::Processing);

/// Which rule a transition is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Strictly forward moves
    Standard,
    /// Only [`COD_ACCEPT_TRANSITION`]
    CodAccept,
}

/// Checks whether `from -> to` is allowed.
///
/// # Errors
/// Returns [`Error::InvalidTransition`] for any backward or same-rank move other than the
/// COD acceptance, and for any move out of `delivered`.
pub fn check_transition(from: OrderStatus, to: OrderStatus, kind: TransitionKind) -> Result<()> {
    let allowed = match kind {
        TransitionKind::CodAccept => (from, to) == COD_ACCEPT_TRANSITION,
        TransitionKind::Standard => from != OrderStatus::Delivered && to.rank() > from.rank(),
    };
    if allowed {
        Ok(())
    } else {
        Err(Error::InvalidTransition { from, to })
    }
}

fn apply_status(order: order::Model, status: OrderStatus) -> order::ActiveModel {
    let mut active: order::ActiveModel = order.into();
    active.order_status = Set(status);
    if status != OrderStatus::Pending {
        // Frees the user's pending slot
        active.pending_key = Set(None);
    }
    active.updated_at = Set(chrono::Utc::now());
    active
}

/// Vendor-driven status change.
#[instrument(skip(db))]
pub async fn change_order_status<C>(
    db: &C,
    vendor_id: i64,
    order_id: i64,
    new_status: OrderStatus,
) -> Result<order::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let order = lock_order(&txn, order_id).await?;
    if order.vendor_id != vendor_id {
        return Err(Error::PermissionDenied {
            message: "You don't have permission to change this order status.".to_string(),
        });
    }

    let from = order.order_status;
    check_transition(from, new_status, TransitionKind::Standard)?;
    let order = apply_status(order, new_status).update(&txn).await?;
    txn.commit().await?;

    info!(
        "Order {} status changed from '{}' to '{}'",
        order_id, from, new_status
    );
    Ok(order)
}

/// Result of a COD checkout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodConfirmation {
    pub order: order::Model,
    pub inventory: InventoryReport,
}

/// Finalises a pending order as cash on delivery.
///
/// Stock is adjusted, the order is marked `shipped` and unpaid, and `order_confirmed` is sent
/// once committed. The caller clears the session cart.
///
/// # Errors
/// Returns [`Error::EmptyOrder`] if the order has no line items and
/// [`Error::OrderNotPending`] if it was already finalised.
#[instrument(skip(db, notifier))]
pub async fn cod_checkout<C>(
    db: &C,
    notifier: &dyn Notifier,
    user_id: &str,
    order_id: i64,
) -> Result<CodConfirmation>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let order = lock_user_order(&txn, user_id, order_id).await?;
    require_pending(&order)?;
    check_transition(order.order_status, OrderStatus::Shipped, TransitionKind::Standard)?;

    let lines = line_items(&txn, order.id).await?;
    if lines.is_empty() {
        return Err(Error::EmptyOrder { order_id });
    }

    let amount_cents = if order.amount_cents > 0 {
        order.amount_cents
    } else {
        to_cents(pricing::subtotal(&lines), "amount")?
    };

    let inventory = inventory::adjust_for_order(&txn, order.id).await?;

    let mut active = apply_status(order, OrderStatus::Shipped);
    active.amount_cents = Set(amount_cents);
    active.paid_status = Set(false);
    active.payment_method = Set(Some(PaymentMethod::Cod));
    let order = active.update(&txn).await?;
    txn.commit().await?;

    info!("Order {} confirmed for cash on delivery", order.id);
    dispatch(
        notifier,
        StoreEvent::OrderConfirmed {
            order_id: order.id,
            user_id: order.user_id.clone(),
            vendor_id: order.vendor_id,
        },
    );
    Ok(CodConfirmation { order, inventory })
}

/// The customer accepts a COD delivery.
#[instrument(skip(db))]
pub async fn cod_accept<C>(db: &C, user_id: &str, order_id: i64) -> Result<order::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let order = lock_user_order(&txn, user_id, order_id).await?;
    let (from, to) = COD_ACCEPT_TRANSITION;
    if order.payment_method != Some(PaymentMethod::Cod) {
        return Err(Error::InvalidTransition {
            from: order.order_status,
            to,
        });
    }
    check_transition(order.order_status, to, TransitionKind::CodAccept)?;

    let mut active = apply_status(order, to);
    active.paid_status = Set(false);
    let order = active.update(&txn).await?;
    txn.commit().await?;

    info!("COD order {} accepted ({} -> {})", order.id, from, to);
    Ok(order)
}

/// What the payment gateway needs to collect payment for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayRequest {
    pub amount: Decimal,
    pub order_reference: String,
    pub return_url: String,
    pub cancel_url: String,
    pub notify_url: String,
}

/// Builds the gateway payload for one of the user's pending orders.
pub async fn gateway_request<C>(
    db: &C,
    public_url: &str,
    user_id: &str,
    order_id: i64,
) -> Result<GatewayRequest>
where
    C: ConnectionTrait,
{
    let order = lock_user_order(db, user_id, order_id).await?;
    require_pending(&order)?;

    let base = public_url.trim_end_matches('/');
    Ok(GatewayRequest {
        amount: from_cents(order.amount_cents),
        order_reference: format!("Order-Item-No-{}", order.id),
        return_url: format!("{base}/payment-completed/{}", order.id),
        cancel_url: format!("{base}/payment-failed"),
        notify_url: format!("{base}/orders/{}/gateway/confirm", order.id),
    })
}

/// Gateway callback: marks the order paid and `processing`.
///
/// Inventory is not touched. Confirming an already paid order returns it unchanged.
#[instrument(skip(db, notifier))]
pub async fn confirm_gateway_payment<C>(
    db: &C,
    notifier: &dyn Notifier,
    order_id: i64,
) -> Result<order::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let order = lock_order(&txn, order_id).await?;
    if order.paid_status {
        return Ok(order);
    }
    check_transition(
        order.order_status,
        OrderStatus::Processing,
        TransitionKind::Standard,
    )?;

    let mut active = apply_status(order, OrderStatus::Processing);
    active.paid_status = Set(true);
    active.payment_method = Set(Some(PaymentMethod::Gateway));
    let order = active.update(&txn).await?;
    txn.commit().await?;

    info!("Order {} paid through the gateway", order.id);
    dispatch(
        notifier,
        StoreEvent::OrderConfirmed {
            order_id: order.id,
            user_id: order.user_id.clone(),
            vendor_id: order.vendor_id,
        },
    );
    Ok(order)
}
