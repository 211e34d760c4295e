//! Image entity - An image URL attached to a category, vendor, vendor banner or product.
//!
//! The owner is addressed by a typed kind plus id; see [`crate::core::image::ImageOwner`].

use super::enums::ImageOwnerKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Image database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub owner_kind: ImageOwnerKind,
    pub owner_id: i64,
    pub url: String,
    pub alt_text: Option<String>,
    /// At most one primary image per owner
    pub is_primary: bool,
    pub uploaded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
