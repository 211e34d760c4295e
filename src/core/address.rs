//! Shipping addresses. Each user has at most one default address.

use crate::{
    entities::{Address, address},
    errors::{Error, Result},
};
use sea_orm::{
    ConnectionTrait, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*, sea_query::Expr,
};
use tracing::info;

/// Adds an address for `user_id`. The user's first address becomes the default.
pub async fn add_address<C>(
    db: &C,
    user_id: &str,
    address: &str,
    mobile: Option<String>,
) -> Result<address::Model>
where
    C: ConnectionTrait,
{
    let address = address.trim();
    if address.is_empty() {
        return Err(Error::validation("address", "Address cannot be empty"));
    }

    let has_any = Address::find()
        .filter(address::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .is_some();

    address::ActiveModel {
        user_id: Set(user_id.to_string()),
        mobile: Set(mobile.map(|m| m.trim().to_string()).filter(|m| !m.is_empty())),
        address: Set(address.to_string()),
        is_default: Set(!has_any),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Lists a user's addresses, default first.
pub async fn list_addresses<C>(db: &C, user_id: &str) -> Result<Vec<address::Model>>
where
    C: ConnectionTrait,
{
    Address::find()
        .filter(address::Column::UserId.eq(user_id))
        .order_by_desc(address::Column::IsDefault)
        .order_by_asc(address::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Makes `address_id` the user's only default address.
///
/// Clearing the old default and setting the new one happen in one transaction; if the address
/// does not belong to the user nothing changes.
pub async fn make_address_default<C>(
    db: &C,
    user_id: &str,
    address_id: i64,
) -> Result<address::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;

    Address::update_many()
        .col_expr(address::Column::IsDefault, Expr::value(false))
        .filter(address::Column::UserId.eq(user_id))
        .filter(address::Column::IsDefault.eq(true))
        .exec(&txn)
        .await?;

    let existing = Address::find_by_id(address_id)
        .filter(address::Column::UserId.eq(user_id))
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or(Error::AddressNotFound { address_id })?;

    let mut address: address::ActiveModel = existing.into();
    address.is_default = Set(true);
    let address = address.update(&txn).await?;
    txn.commit().await?;

    info!("User {} set default address {}", user_id, address_id);
    Ok(address)
}
