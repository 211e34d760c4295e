//! Product entity - The inventory-relevant view of a catalog item.
//!
//! `stock_count`, `in_stock`, `status` (listed) and `product_status` are kept consistent by
//! the publish rule in [`crate::core::product`] and by the inventory adjuster: a product is only
//! `published` while its price and stock are both positive. Prices are stored in cents.

use super::enums::ProductStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Vendor selling the product
    pub vendor_id: i64,
    /// Display title, also snapshotted into order lines
    pub title: String,
    /// Current price in cents
    pub amount_cents: i64,
    /// Previous price in cents, shown struck through
    pub old_price_cents: i64,
    /// Units available, never negative
    pub stock_count: i32,
    /// False whenever `stock_count` is zero
    pub in_stock: bool,
    /// Listed flag; true only for published products
    pub status: bool,
    /// Catalog lifecycle state
    pub product_status: ProductStatus,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each product belongs to one vendor
    #[sea_orm(
        belongs_to = "super::vendor::Entity",
        from = "Column::VendorId",
        to = "super::vendor::Column::Id"
    )]
    Vendor,
}

impl Related<super::vendor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
