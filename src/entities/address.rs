//! Address entity - Delivery addresses of a user; at most one is the default.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Address database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "addresses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: String,
    pub mobile: Option<String>,
    pub address: String,
    /// Default delivery address flag
    pub is_default: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
