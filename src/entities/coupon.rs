//! Coupon entity - A vendor-issued percentage discount.
//!
//! Codes are stored in their canonical uppercase form and are unique across vendors.
//! A coupon referenced by any order can only be deactivated, never deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Coupon database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    /// Unique identifier for the coupon
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Vendor that issued the coupon
    pub vendor_id: i64,
    /// Canonical uppercase code
    #[sea_orm(unique)]
    pub code: String,
    /// Discount percentage in `[0, 100]`
    pub discount_percent: f64,
    /// Inactive coupons are never found by the validator
    pub active: bool,
    /// Instant after which the coupon is rejected as expired
    pub expires_at: DateTimeUtc,
    /// Minimum order subtotal in cents
    pub min_order_cents: i64,
    /// Cap on the discount in cents
    pub max_discount_cents: i64,
    /// Reject re-applying the coupon to an order that already carries it
    pub apply_once_per_user: bool,
    /// When the coupon was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Coupon and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each coupon belongs to one vendor
    #[sea_orm(
        belongs_to = "super::vendor::Entity",
        from = "Column::VendorId",
        to = "super::vendor::Column::Id"
    )]
    Vendor,
    /// Orders currently carrying this coupon
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::vendor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
