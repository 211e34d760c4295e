//! Order line item entity - A snapshot of one cart line taken at checkout.
//!
//! Title and image are copies, not references, so later catalog edits do not rewrite order
//! history. `product_id` is kept alongside for inventory resolution.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order line item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_line_items")]
pub struct Model {
    /// Unique identifier for the line item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Order this line belongs to
    pub order_id: i64,
    /// Product the line was created from
    pub product_id: Option<i64>,
    /// Product title at checkout time
    pub item_title: String,
    /// Product image URL at checkout time
    pub image_ref: String,
    /// Units ordered, at least 1
    pub quantity: i32,
    /// Unit price in cents
    pub unit_price_cents: i64,
    /// `quantity * unit_price_cents`
    pub line_total_cents: i64,
}

/// Defines relationships between OrderLineItem and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "Cascade"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
