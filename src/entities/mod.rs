//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod address;
pub mod coupon;
pub mod enums;
pub mod image;
pub mod order;
pub mod order_line_item;
pub mod product;
pub mod return_request;
pub mod vendor;

pub use enums::{ImageOwnerKind, OrderStatus, PaymentMethod, ProductStatus, ReturnStatus};

// Re-export specific types to avoid conflicts
pub use address::{Column as AddressColumn, Entity as Address, Model as AddressModel};
pub use coupon::{Column as CouponColumn, Entity as Coupon, Model as CouponModel};
pub use image::{Column as ImageColumn, Entity as Image, Model as ImageModel};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel};
pub use order_line_item::{
    Column as OrderLineItemColumn, Entity as OrderLineItem, Model as OrderLineItemModel,
};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use return_request::{
    Column as ReturnRequestColumn, Entity as ReturnRequest, Model as ReturnRequestModel,
};
pub use vendor::{Column as VendorColumn, Entity as Vendor, Model as VendorModel};
