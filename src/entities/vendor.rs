//! Vendor entity - A seller owning products, coupons and the orders placed with it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Vendor database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vendors")]
pub struct Model {
    /// Unique identifier for the vendor
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name of the shop
    pub title: String,
    /// Account that manages the vendor, if any
    pub user_id: Option<String>,
    /// Whether the vendor is currently trading
    pub active: bool,
    /// When the vendor was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Vendor and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One vendor lists many products
    #[sea_orm(has_many = "super::product::Entity")]
    Products,
    /// One vendor issues many coupons
    #[sea_orm(has_many = "super::coupon::Entity")]
    Coupons,
    /// One vendor receives many orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl Related<super::coupon::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Coupons.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
