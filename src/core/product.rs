//! Catalog business logic - product lookups and the product lifecycle.
//!
//! This module is the catalog the cart and the reconciler consult, and the vendor-facing admin
//! operations that create, edit, soft delete and restore products. Every write goes through the
//! publish rule ([`publish_decision`]): a product may only be `published` while its price and its
//! stock are both positive. Breaking the rule never fails the write; the product is downgraded
//! to `draft` and the caller receives [`PUBLISH_ADVISORY`].

use crate::{
    core::{money::validate_price, vendor::get_vendor},
    entities::{Product, ProductStatus, product},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Advisory returned when a publish request had to fall back to `draft`.
pub const PUBLISH_ADVISORY: &str = "Price and stock must be greater than 0 to publish";

/// Listing flags chosen by the publish rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishDecision {
    pub product_status: ProductStatus,
    /// The `status` ("listed") column
    pub listed: bool,
    pub in_stock: bool,
    pub advisory: Option<&'static str>,
}

/// Applies the publish rule to a price/stock pair.
///
/// With `publish == false` the product is kept as a draft regardless of price and stock.
#[must_use]
pub const fn publish_decision(amount_cents: i64, stock_count: i32, publish: bool) -> PublishDecision {
    if !publish {
        return PublishDecision {
            product_status: ProductStatus::Draft,
            listed: false,
            in_stock: stock_count > 0,
            advisory: None,
        };
    }
    if amount_cents > 0 && stock_count > 0 {
        PublishDecision {
            product_status: ProductStatus::Published,
            listed: true,
            in_stock: true,
            advisory: None,
        }
    } else {
        PublishDecision {
            product_status: ProductStatus::Draft,
            listed: false,
            in_stock: false,
            advisory: Some(PUBLISH_ADVISORY),
        }
    }
}

/// Vendor input for a new product.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductDraft {
    pub title: String,
    pub amount: Decimal,
    #[serde(default)]
    pub old_price: Decimal,
    pub stock_count: i32,
}

/// Partial edit of an existing product; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductChanges {
    pub title: Option<String>,
    pub amount: Option<Decimal>,
    pub old_price: Option<Decimal>,
    pub stock_count: Option<i32>,
}

/// A saved product plus the publish advisory, if the rule downgraded it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSaved {
    pub product: product::Model,
    pub advisory: Option<String>,
}

fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::validation("title", "Product title cannot be empty"));
    }
    Ok(title.to_string())
}

fn validate_stock(stock_count: i32) -> Result<i32> {
    if stock_count < 0 {
        return Err(Error::validation("stock_count", "Stock cannot be negative"));
    }
    Ok(stock_count)
}

/// A product shoppers can buy right now: published and listed.
///
/// # Errors
/// Returns [`Error::ProductNotFound`] for drafts, delisted and deleted products.
pub async fn get_listed_product<C>(db: &C, product_id: i64) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .filter(product::Column::ProductStatus.eq(ProductStatus::Published))
        .filter(product::Column::Status.eq(true))
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { product_id })
}

/// Catalog lookup used by the cart and the reconciler.
///
/// # Errors
/// Returns [`Error::ProductNotFound`] if the product does not exist or was deleted.
pub async fn get_product<C>(db: &C, product_id: i64) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    find_live_product(db, product_id)
        .await?
        .ok_or(Error::ProductNotFound { product_id })
}

/// Like [`get_product`] but reports a missing product as `None`.
pub async fn find_live_product<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .filter(product::Column::ProductStatus.ne(ProductStatus::Deleted))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a non-deleted product by its exact title.
///
/// Only used to resolve order lines that predate product references.
pub async fn find_live_product_by_title<C>(db: &C, title: &str) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find()
        .filter(product::Column::Title.eq(title))
        .filter(product::Column::ProductStatus.ne(ProductStatus::Deleted))
        .order_by_asc(product::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all published, listed products ordered by title.
pub async fn list_published_products<C>(db: &C) -> Result<Vec<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find()
        .filter(product::Column::ProductStatus.eq(ProductStatus::Published))
        .filter(product::Column::Status.eq(true))
        .order_by_asc(product::Column::Title)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Loads a product of `vendor_id`, deleted or not.
///
/// # Errors
/// Returns [`Error::PermissionDenied`] when the product belongs to another vendor.
pub async fn load_owned_product<C>(
    db: &C,
    vendor_id: i64,
    product_id: i64,
) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    let product = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { product_id })?;

    if product.vendor_id != vendor_id {
        return Err(Error::PermissionDenied {
            message: format!("Product {product_id} belongs to another vendor"),
        });
    }
    Ok(product)
}

/// Creates a product for `vendor_id`, applying the publish rule when `publish` is set.
///
/// # Errors
/// Returns an error if:
/// - The title is empty or whitespace-only
/// - A price is negative or has more than two fractional digits
/// - The stock is negative
/// - The vendor does not exist
pub async fn create_product<C>(
    db: &C,
    vendor_id: i64,
    draft: ProductDraft,
    publish: bool,
) -> Result<ProductSaved>
where
    C: ConnectionTrait,
{
    let title = validate_title(&draft.title)?;
    let amount_cents = validate_price(draft.amount, "amount")?;
    let old_price_cents = validate_price(draft.old_price, "old_price")?;
    let stock_count = validate_stock(draft.stock_count)?;
    get_vendor(db, vendor_id).await?;

    let decision = publish_decision(amount_cents, stock_count, publish);
    let now = chrono::Utc::now();

    let product = product::ActiveModel {
        vendor_id: Set(vendor_id),
        title: Set(title),
        amount_cents: Set(amount_cents),
        old_price_cents: Set(old_price_cents),
        stock_count: Set(stock_count),
        in_stock: Set(decision.in_stock),
        status: Set(decision.listed),
        product_status: Set(decision.product_status),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        "Vendor {} created product {} '{}' as {:?}",
        vendor_id, product.id, product.title, product.product_status
    );
    Ok(ProductSaved {
        product,
        advisory: decision.advisory.map(str::to_string),
    })
}

/// Updates a product owned by `vendor_id`.
///
/// A product that is currently published stays published when the edit keeps the publish rule
/// satisfied, and is downgraded to draft (with the advisory) when it does not. Products in any
/// other state keep that state unless `publish` is requested.
///
/// # Errors
/// Returns an error if validation fails, the product is missing or deleted, or another vendor
/// owns it.
pub async fn update_product<C>(
    db: &C,
    vendor_id: i64,
    product_id: i64,
    changes: ProductChanges,
    publish: bool,
) -> Result<ProductSaved>
where
    C: ConnectionTrait,
{
    let title = changes.title.as_deref().map(validate_title).transpose()?;
    let amount_cents = changes
        .amount
        .map(|a| validate_price(a, "amount"))
        .transpose()?;
    let old_price_cents = changes
        .old_price
        .map(|a| validate_price(a, "old_price"))
        .transpose()?;
    let stock_count = changes.stock_count.map(validate_stock).transpose()?;

    let existing = load_owned_product(db, vendor_id, product_id).await?;
    if existing.product_status == ProductStatus::Deleted {
        return Err(Error::ProductNotFound { product_id });
    }

    let amount_cents = amount_cents.unwrap_or(existing.amount_cents);
    let stock_count = stock_count.unwrap_or(existing.stock_count);
    let was_published = existing.product_status == ProductStatus::Published;

    let mut product: product::ActiveModel = existing.clone().into();
    if let Some(title) = title {
        product.title = Set(title);
    }
    if let Some(old_price_cents) = old_price_cents {
        product.old_price_cents = Set(old_price_cents);
    }
    product.amount_cents = Set(amount_cents);
    product.stock_count = Set(stock_count);

    let advisory = if publish || was_published {
        let decision = publish_decision(amount_cents, stock_count, true);
        product.product_status = Set(decision.product_status);
        product.status = Set(decision.listed);
        product.in_stock = Set(decision.in_stock);
        decision.advisory
    } else {
        product.status = Set(false);
        product.in_stock = Set(stock_count > 0);
        None
    };
    product.updated_at = Set(chrono::Utc::now());

    let product = product.update(db).await?;
    if let Some(message) = advisory {
        info!("Product {} saved as draft: {}", product.id, message);
    }
    Ok(ProductSaved {
        product,
        advisory: advisory.map(str::to_string),
    })
}

/// Soft deletes a product, unlisting it while preserving order history.
///
/// # Errors
/// Returns an error if the product is missing, already deleted, or owned by another vendor.
pub async fn delete_product<C>(db: &C, vendor_id: i64, product_id: i64) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    let existing = load_owned_product(db, vendor_id, product_id).await?;
    if existing.product_status == ProductStatus::Deleted {
        return Err(Error::ProductNotFound { product_id });
    }

    let mut product: product::ActiveModel = existing.into();
    product.product_status = Set(ProductStatus::Deleted);
    product.status = Set(false);
    product.in_stock = Set(false);
    product.updated_at = Set(chrono::Utc::now());

    let product = product.update(db).await?;
    info!("Vendor {} deleted product {}", vendor_id, product_id);
    Ok(product)
}

/// Restores a soft-deleted product into `draft`.
///
/// # Errors
/// Returns [`Error::ProductNotDeleted`] if the product is not in the `deleted` state.
pub async fn restore_product<C>(db: &C, vendor_id: i64, product_id: i64) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    let existing = load_owned_product(db, vendor_id, product_id).await?;
    if existing.product_status != ProductStatus::Deleted {
        return Err(Error::ProductNotDeleted { product_id });
    }

    let decision = publish_decision(existing.amount_cents, existing.stock_count, false);
    let mut product: product::ActiveModel = existing.into();
    product.product_status = Set(decision.product_status);
    product.status = Set(decision.listed);
    product.in_stock = Set(decision.in_stock);
    product.updated_at = Set(chrono::Utc::now());

    let product = product.update(db).await?;
    info!("Vendor {} restored product {} to draft", vendor_id, product_id);
    Ok(product)
}
