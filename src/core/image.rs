//! Typed image associations.
//!
//! Images belong to exactly one [`ImageOwner`]. Each owner has at most one primary image;
//! [`primary_image_url`] falls back to a per-kind placeholder when none is set.

use crate::{
    core::product::load_owned_product,
    entities::{Image, ImageOwnerKind, image},
    errors::{Error, Result},
};
use sea_orm::{
    ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The record an image is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ImageOwner {
    Category(i64),
    Vendor(i64),
    Product(i64),
    VendorBanner(i64),
}

impl ImageOwner {
    #[must_use]
    pub const fn kind(self) -> ImageOwnerKind {
        match self {
            Self::Category(_) => ImageOwnerKind::Category,
            Self::Vendor(_) => ImageOwnerKind::Vendor,
            Self::Product(_) => ImageOwnerKind::Product,
            Self::VendorBanner(_) => ImageOwnerKind::VendorBanner,
        }
    }

    #[must_use]
    pub const fn id(self) -> i64 {
        match self {
            Self::Category(id) | Self::Vendor(id) | Self::Product(id) | Self::VendorBanner(id) => {
                id
            }
        }
    }

    /// Image shown when the owner has no primary image.
    #[must_use]
    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::Category(_) => "/static/assets/imgs/shop/cat-1.png",
            Self::Vendor(_) => "/static/assets/imgs/vendor/vendor-placeholder.jpg",
            Self::Product(_) => "/static/assets/imgs/default.jpg",
            Self::VendorBanner(_) => "/static/assets/imgs/vendor/vendor-banner-placeholder.jpg",
        }
    }

    fn from_row(kind: ImageOwnerKind, id: i64) -> Self {
        match kind {
            ImageOwnerKind::Category => Self::Category(id),
            ImageOwnerKind::Vendor => Self::Vendor(id),
            ImageOwnerKind::Product => Self::Product(id),
            ImageOwnerKind::VendorBanner => Self::VendorBanner(id),
        }
    }
}

fn owned_by(owner: ImageOwner) -> sea_orm::Condition {
    sea_orm::Condition::all()
        .add(image::Column::OwnerKind.eq(owner.kind()))
        .add(image::Column::OwnerId.eq(owner.id()))
}

async fn clear_primary<C>(db: &C, owner: ImageOwner) -> Result<()>
where
    C: ConnectionTrait,
{
    Image::update_many()
        .col_expr(image::Column::IsPrimary, Expr::value(false))
        .filter(owned_by(owner))
        .exec(db)
        .await?;
    Ok(())
}

/// Attaches an image to `owner`. A primary image replaces the owner's previous primary.
pub async fn add_image<C>(
    db: &C,
    owner: ImageOwner,
    url: &str,
    alt_text: Option<String>,
    is_primary: bool,
) -> Result<image::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    let url = url.trim();
    if url.is_empty() {
        return Err(Error::validation("url", "Image URL cannot be empty"));
    }

    let txn = db.begin().await?;
    if is_primary {
        clear_primary(&txn, owner).await?;
    }
    let image = image::ActiveModel {
        owner_kind: Set(owner.kind()),
        owner_id: Set(owner.id()),
        url: Set(url.to_string()),
        alt_text: Set(alt_text),
        is_primary: Set(is_primary),
        uploaded_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    debug!("Attached image {} to {:?}", image.id, owner);
    Ok(image)
}

/// Makes `image_id` the primary image of its owner.
pub async fn set_primary_image<C>(db: &C, image_id: i64) -> Result<image::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let existing = Image::find_by_id(image_id)
        .one(&txn)
        .await?
        .ok_or(Error::ImageNotFound { image_id })?;

    clear_primary(&txn, ImageOwner::from_row(existing.owner_kind, existing.owner_id)).await?;
    let mut image: image::ActiveModel = existing.into();
    image.is_primary = Set(true);
    let image = image.update(&txn).await?;
    txn.commit().await?;
    Ok(image)
}

/// The owner an existing image is attached to.
pub async fn image_owner<C>(db: &C, image_id: i64) -> Result<ImageOwner>
where
    C: ConnectionTrait,
{
    let image = Image::find_by_id(image_id)
        .one(db)
        .await?
        .ok_or(Error::ImageNotFound { image_id })?;
    Ok(ImageOwner::from_row(image.owner_kind, image.owner_id))
}

/// Checks that `vendor_id` may manage the images of `owner`.
///
/// Vendors manage their own profile images and the images of their products. Category images
/// are not vendor-managed.
///
/// # Errors
/// Returns [`Error::PermissionDenied`] for anything else, or [`Error::ProductNotFound`] for an
/// unknown product.
pub async fn ensure_vendor_owns<C>(db: &C, vendor_id: i64, owner: ImageOwner) -> Result<()>
where
    C: ConnectionTrait,
{
    match owner {
        ImageOwner::Product(product_id) => {
            load_owned_product(db, vendor_id, product_id).await?;
            Ok(())
        }
        ImageOwner::Vendor(id) | ImageOwner::VendorBanner(id) if id == vendor_id => Ok(()),
        _ => Err(Error::PermissionDenied {
            message: format!("Vendor {vendor_id} cannot manage images of {owner:?}"),
        }),
    }
}

/// All images of `owner`, primary first.
pub async fn images_for<C>(db: &C, owner: ImageOwner) -> Result<Vec<image::Model>>
where
    C: ConnectionTrait,
{
    Image::find()
        .filter(owned_by(owner))
        .order_by_desc(image::Column::IsPrimary)
        .order_by_asc(image::Column::UploadedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// URL of the owner's primary image, or its placeholder.
pub async fn primary_image_url<C>(db: &C, owner: ImageOwner) -> Result<String>
where
    C: ConnectionTrait,
{
    let primary = Image::find()
        .filter(owned_by(owner))
        .filter(image::Column::IsPrimary.eq(true))
        .one(db)
        .await?;
    Ok(primary.map_or_else(|| owner.placeholder().to_string(), |image| image.url))
}
