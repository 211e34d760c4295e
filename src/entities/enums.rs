//! Persisted enumerations shared by several entities.
//!
//! All of them are stored as short strings so the database stays readable and the
//! values match the JSON representation exposed by the API.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of an order. Ranks are strictly ordered; see [`OrderStatus::rank`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Cart materialised, not yet fulfilled
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Paid (gateway) or delivery accepted (COD)
    #[sea_orm(string_value = "processing")]
    Processing,
    /// Handed to the carrier
    #[sea_orm(string_value = "shipped")]
    Shipped,
    /// Terminal for the generic status path
    #[sea_orm(string_value = "delivered")]
    Delivered,
}

impl OrderStatus {
    /// Position in the monotonic order `pending(1) < processing(2) < shipped(3) < delivered(4)`.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Pending => 1,
            Self::Processing => 2,
            Self::Shipped => 3,
            Self::Delivered => 4,
        }
    }

    /// Lowercase name used in storage and messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an order was finalised.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery
    #[sea_orm(string_value = "cod")]
    Cod,
    /// Paid through the external payment gateway
    #[sea_orm(string_value = "gateway")]
    Gateway,
}

/// Catalog visibility state of a product.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[sea_orm(string_value = "in_review")]
    InReview,
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "published")]
    Published,
    #[sea_orm(string_value = "disabled")]
    Disabled,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "deleted")]
    Deleted,
}

/// Kind of record an image is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ImageOwnerKind {
    #[sea_orm(string_value = "category")]
    Category,
    #[sea_orm(string_value = "vendor")]
    Vendor,
    #[sea_orm(string_value = "product")]
    Product,
    #[sea_orm(string_value = "vendor_banner")]
    VendorBanner,
}

/// State of a return/exchange request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ReturnStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}
