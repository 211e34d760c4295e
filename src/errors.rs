//! Unified error type for the storefront core.
//!
//! Every public operation returns [`Result`]. Variants fall into four classes (see
//! [`ErrorKind`]): missing records, malformed input, business-rule violations and fatal
//! infrastructure failures. Only the last class is expected to surface as a server error.

use crate::entities::OrderStatus;
use rust_decimal::Decimal;
use thiserror::Error;

/// Coarse classification used by the API layer to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The referenced record does not exist (404).
    NotFound,
    /// Malformed or missing input (400).
    Validation,
    /// Input was well-formed but a business rule forbids the operation (400).
    BusinessRule,
    /// The caller does not own the record (403).
    PermissionDenied,
    /// Storage, configuration or I/O failure (500).
    Fatal,
}

/// All errors produced by the storefront core.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: i64 },

    #[error("Order not found: {order_id}")]
    OrderNotFound { order_id: i64 },

    #[error("Order line item not found: {line_item_id}")]
    LineItemNotFound { line_item_id: i64 },

    #[error("Coupon not found: {code}")]
    CouponNotFound { code: String },

    #[error("Vendor not found: {vendor_id}")]
    VendorNotFound { vendor_id: i64 },

    #[error("Address not found: {address_id}")]
    AddressNotFound { address_id: i64 },

    #[error("Image not found: {image_id}")]
    ImageNotFound { image_id: i64 },

    #[error("Return request not found: {request_id}")]
    ReturnRequestNotFound { request_id: i64 },

    #[error("Product {product_id} is not in the cart")]
    CartLineNotFound { product_id: i64 },

    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Invalid amount for {field}: {amount}")]
    InvalidAmount { field: String, amount: Decimal },

    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity { quantity: i64 },

    #[error("Cannot change order status from '{from}' to '{to}'")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order {order_id} is '{status}', expected 'pending'")]
    OrderNotPending { order_id: i64, status: OrderStatus },

    #[error("Order {order_id} has no items")]
    EmptyOrder { order_id: i64 },

    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Product {product_id} is out of stock")]
    OutOfStock { product_id: i64 },

    #[error(
        "Cannot delete coupon '{code}' because it has been used in orders. Please deactivate it instead."
    )]
    CouponInUse { code: String },

    #[error("Product {product_id} is not deleted")]
    ProductNotDeleted { product_id: i64 },

    #[error("Return not allowed: {message}")]
    ReturnNotAllowed { message: String },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },
}

impl Error {
    /// Builds a field-level validation failure.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Classifies the error for boundary handling.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ProductNotFound { .. }
            | Self::OrderNotFound { .. }
            | Self::LineItemNotFound { .. }
            | Self::CouponNotFound { .. }
            | Self::VendorNotFound { .. }
            | Self::AddressNotFound { .. }
            | Self::ImageNotFound { .. }
            | Self::ReturnRequestNotFound { .. }
            | Self::CartLineNotFound { .. } => ErrorKind::NotFound,
            Self::Validation { .. } | Self::InvalidAmount { .. } | Self::InvalidQuantity { .. } => {
                ErrorKind::Validation
            }
            Self::InvalidTransition { .. }
            | Self::OrderNotPending { .. }
            | Self::EmptyOrder { .. }
            | Self::EmptyCart
            | Self::OutOfStock { .. }
            | Self::CouponInUse { .. }
            | Self::ProductNotDeleted { .. }
            | Self::ReturnNotAllowed { .. } => ErrorKind::BusinessRule,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::Config { .. } | Self::Database(_) | Self::Io(_) => ErrorKind::Fatal,
        }
    }

    /// Stable machine-readable reason code.
    #[must_use]
    pub const fn reason_code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config_error",
            Self::Database(_) => "storage_unavailable",
            Self::Io(_) => "io_error",
            Self::ProductNotFound { .. } => "product_not_found",
            Self::OrderNotFound { .. } => "order_not_found",
            Self::LineItemNotFound { .. } => "line_item_not_found",
            Self::CouponNotFound { .. } => "coupon_not_found",
            Self::VendorNotFound { .. } => "vendor_not_found",
            Self::AddressNotFound { .. } => "address_not_found",
            Self::ImageNotFound { .. } => "image_not_found",
            Self::ReturnRequestNotFound { .. } => "return_request_not_found",
            Self::CartLineNotFound { .. } => "cart_line_not_found",
            Self::Validation { .. } => "validation_failed",
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::InvalidQuantity { .. } => "invalid_quantity",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::OrderNotPending { .. } => "order_not_pending",
            Self::EmptyOrder { .. } => "empty_order",
            Self::EmptyCart => "empty_cart",
            Self::OutOfStock { .. } => "out_of_stock",
            Self::CouponInUse { .. } => "coupon_in_use",
            Self::ProductNotDeleted { .. } => "product_not_deleted",
            Self::ReturnNotAllowed { .. } => "return_not_allowed",
            Self::PermissionDenied { .. } => "permission_denied",
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
