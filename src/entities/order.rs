//! Order entity - The durable result of reconciling a cart.
//!
//! `pending_key` holds the owning user id while the order is `pending` and is cleared on the
//! first transition out of it. The unique constraint on that column guarantees at most one
//! pending order per user, which makes the get-or-create in checkout race-free.

use super::enums::{OrderStatus, PaymentMethod};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Customer who placed the order
    pub user_id: String,
    /// The single vendor fulfilling every line of the order
    pub vendor_id: i64,
    /// Order total in cents, recomputed on every reconciliation pass
    pub amount_cents: i64,
    /// Attached coupon, if any
    pub coupon_id: Option<i64>,
    /// Whether payment has been collected
    pub paid_status: bool,
    /// Current lifecycle state
    pub order_status: OrderStatus,
    /// Set once the order is finalised
    pub payment_method: Option<PaymentMethod>,
    /// User id while pending, NULL afterwards
    #[sea_orm(unique)]
    #[serde(skip)]
    pub pending_key: Option<String>,
    /// When the order was created
    pub created_at: DateTimeUtc,
    /// When the order was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order belongs to one vendor
    #[sea_orm(
        belongs_to = "super::vendor::Entity",
        from = "Column::VendorId",
        to = "super::vendor::Column::Id"
    )]
    Vendor,
    /// Optional attached coupon
    #[sea_orm(
        belongs_to = "super::coupon::Entity",
        from = "Column::CouponId",
        to = "super::coupon::Column::Id"
    )]
    Coupon,
    /// Snapshotted line items
    #[sea_orm(has_many = "super::order_line_item::Entity")]
    LineItems,
}

impl Related<super::vendor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

impl Related<super::coupon::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Coupon.def()
    }
}

impl Related<super::order_line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
