/// Customer shipping addresses and the single-default rule
pub mod address;

/// Session cart, quantity clamping and snapshots
pub mod cart;

/// Order reconciler: cart to priced order
pub mod checkout;

/// Coupon rule engine and vendor coupon administration
pub mod coupon;

/// Typed image associations with placeholder fallback
pub mod image;

/// Atomic stock decrement and auto-delisting
pub mod inventory;

/// Integer-cent and decimal conversions
pub mod money;

/// Store events dispatched after commit
pub mod notify;

/// Order lookups and pricing of stored orders
pub mod order;

/// Order status machine, COD and gateway fulfilment
pub mod order_status;

/// Pure price breakdown computation
pub mod pricing;

/// Catalog lookups and the product lifecycle
pub mod product;

/// Return and exchange requests
pub mod returns;

/// Session-keyed cart storage
pub mod session;

/// Vendor registration and lookup
pub mod vendor;
