//! Return and exchange requests for delivered orders.
//!
//! Delivered orders are closed to status changes, so corrections are recorded here instead.
//! A line item can have at most one open (pending) request at a time.

use crate::{
    entities::{
        Order, OrderLineItem, OrderStatus, ReturnRequest, ReturnStatus, order, order_line_item,
        return_request,
    },
    errors::{Error, Result},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use tracing::info;

async fn line_with_order<C>(
    db: &C,
    line_item_id: i64,
) -> Result<(order_line_item::Model, order::Model)>
where
    C: ConnectionTrait,
{
    let line = OrderLineItem::find_by_id(line_item_id)
        .one(db)
        .await?
        .ok_or(Error::LineItemNotFound { line_item_id })?;
    let order = Order::find_by_id(line.order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound {
            order_id: line.order_id,
        })?;
    Ok((line, order))
}

/// Opens a return request for one line of a delivered order owned by `user_id`.
///
/// # Errors
/// Returns [`Error::ReturnNotAllowed`] when the order is not delivered or the line already has
/// an open request.
pub async fn create_return_request<C>(
    db: &C,
    user_id: &str,
    line_item_id: i64,
    reason: &str,
) -> Result<return_request::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(Error::validation("reason", "Please describe the problem"));
    }

    let txn = db.begin().await?;
    let (line, order) = line_with_order(&txn, line_item_id).await?;
    if order.user_id != user_id {
        return Err(Error::LineItemNotFound { line_item_id });
    }
    if order.order_status != OrderStatus::Delivered {
        return Err(Error::ReturnNotAllowed {
            message: format!(
                "order {} is '{}'; only delivered orders can be returned",
                order.id, order.order_status
            ),
        });
    }

    let open = ReturnRequest::find()
        .filter(return_request::Column::LineItemId.eq(line.id))
        .filter(return_request::Column::Status.eq(ReturnStatus::Pending))
        .lock_exclusive()
        .one(&txn)
        .await?;
    if open.is_some() {
        return Err(Error::ReturnNotAllowed {
            message: format!("a return request for '{}' is already open", line.item_title),
        });
    }

    let request = return_request::ActiveModel {
        user_id: Set(user_id.to_string()),
        line_item_id: Set(line.id),
        reason: Set(reason.to_string()),
        status: Set(ReturnStatus::Pending),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(
        "User {} opened return request {} for order {}",
        user_id, request.id, order.id
    );
    Ok(request)
}

/// Approves or rejects a pending return request on one of the vendor's orders.
pub async fn resolve_return_request<C>(
    db: &C,
    vendor_id: i64,
    request_id: i64,
    approve: bool,
) -> Result<return_request::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let request = ReturnRequest::find_by_id(request_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or(Error::ReturnRequestNotFound { request_id })?;

    let (_, order) = line_with_order(&txn, request.line_item_id).await?;
    if order.vendor_id != vendor_id {
        return Err(Error::PermissionDenied {
            message: format!("Return request {request_id} belongs to another vendor"),
        });
    }
    if request.status != ReturnStatus::Pending {
        return Err(Error::ReturnNotAllowed {
            message: format!("return request {request_id} was already resolved"),
        });
    }

    let mut active: return_request::ActiveModel = request.into();
    active.status = Set(if approve {
        ReturnStatus::Approved
    } else {
        ReturnStatus::Rejected
    });
    let request = active.update(&txn).await?;
    txn.commit().await?;

    info!("Return request {} {:?}", request_id, request.status);
    Ok(request)
}

/// Lists a user's return requests, newest first.
pub async fn list_return_requests<C>(db: &C, user_id: &str) -> Result<Vec<return_request::Model>>
where
    C: ConnectionTrait,
{
    ReturnRequest::find()
        .filter(return_request::Column::UserId.eq(user_id))
        .order_by_desc(return_request::Column::CreatedAt)
        .order_by_desc(return_request::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
