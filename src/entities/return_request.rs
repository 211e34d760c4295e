//! Return request entity - The only way to correct an order after delivery.

use super::enums::ReturnStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Return request database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "return_requests")]
pub struct Model {
    /// Unique identifier for the request
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Customer asking for the return
    pub user_id: String,
    /// Delivered line item being returned
    pub line_item_id: i64,
    /// Free-text reason given by the customer
    pub reason: String,
    /// Review state
    pub status: ReturnStatus,
    /// When the request was filed
    pub created_at: DateTimeUtc,
}

/// Defines relationships between ReturnRequest and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each request refers to one order line
    #[sea_orm(
        belongs_to = "super::order_line_item::Entity",
        from = "Column::LineItemId",
        to = "super::order_line_item::Column::Id"
    )]
    LineItem,
}

impl Related<super::order_line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
