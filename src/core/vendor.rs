//! Vendor lookups and registration.

use crate::{
    entities::{Vendor, vendor},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, Set, prelude::*};
use tracing::info;

/// Registers a vendor. The title is trimmed and must not be empty.
pub async fn create_vendor<C>(db: &C, title: &str, user_id: Option<String>) -> Result<vendor::Model>
where
    C: ConnectionTrait,
{
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::validation("title", "Vendor title cannot be empty"));
    }

    let vendor = vendor::ActiveModel {
        title: Set(title.to_string()),
        user_id: Set(user_id),
        active: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Created vendor {} ({})", vendor.title, vendor.id);
    Ok(vendor)
}

/// Retrieves a vendor by id.
///
/// # Errors
/// Returns [`Error::VendorNotFound`] if no such vendor exists.
pub async fn get_vendor<C>(db: &C, vendor_id: i64) -> Result<vendor::Model>
where
    C: ConnectionTrait,
{
    Vendor::find_by_id(vendor_id)
        .one(db)
        .await?
        .ok_or(Error::VendorNotFound { vendor_id })
}

/// Finds a vendor by its exact title.
pub async fn get_vendor_by_title<C>(db: &C, title: &str) -> Result<Option<vendor::Model>>
where
    C: ConnectionTrait,
{
    Vendor::find()
        .filter(vendor::Column::Title.eq(title))
        .one(db)
        .await
        .map_err(Into::into)
}
