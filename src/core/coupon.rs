//! Coupon validation and vendor coupon administration.
//!
//! [`check_coupon`] is the pure rule engine: given the order, the coupon found for a code and
//! the order's fresh subtotal, it returns the first applicable [`CouponRejection`] or accepts
//! the coupon. [`validate_and_attach`] wraps it with the lookup (row-locked) and the write of
//! `orders.coupon_id`. The validator never prices anything; callers re-run the pricing engine.

use crate::{
    core::{
        money::{from_cents, validate_price},
        notify::{Notifier, StoreEvent, dispatch},
    },
    entities::{Coupon, Order, coupon, order},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ConnectionTrait, PaginatorTrait, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

const MIN_CODE_LENGTH: usize = 3;

/// Why a coupon was not attached. Checked in declaration order; the first match wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum CouponRejection {
    /// No active coupon carries the code
    NotFound,
    Expired,
    /// The subtotal is below the coupon's minimum order amount
    BelowMinimum { minimum: Decimal },
    /// The order already carries this once-per-user coupon
    AlreadyApplied,
}

impl CouponRejection {
    #[must_use]
    pub const fn reason_code(&self) -> &'static str {
        match self {
            Self::NotFound => "coupon_not_found",
            Self::Expired => "coupon_expired",
            Self::BelowMinimum { .. } => "coupon_below_minimum",
            Self::AlreadyApplied => "coupon_already_applied",
        }
    }
}

impl fmt::Display for CouponRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("Invalid coupon code."),
            Self::Expired => f.write_str("Coupon has expired."),
            Self::BelowMinimum { minimum } => {
                write!(f, "Minimum order amount should be ${minimum:.2}")
            }
            Self::AlreadyApplied => f.write_str("You have already applied this coupon."),
        }
    }
}

/// Result of trying to attach a coupon.
#[derive(Debug, Clone, PartialEq)]
pub enum CouponOutcome {
    Applied {
        order: order::Model,
        coupon: coupon::Model,
    },
    Rejected(CouponRejection),
}

impl CouponOutcome {
    #[must_use]
    pub const fn rejection(&self) -> Option<&CouponRejection> {
        match self {
            Self::Applied { .. } => None,
            Self::Rejected(reason) => Some(reason),
        }
    }
}

/// Canonical form of a coupon code: trimmed and uppercased.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Applies the rejection rules to an already looked-up coupon.
///
/// `coupon` is the active coupon matching the requested code, if any.
pub fn check_coupon<'a>(
    order: &order::Model,
    coupon: Option<&'a coupon::Model>,
    subtotal: Decimal,
    now: DateTime<Utc>,
) -> std::result::Result<&'a coupon::Model, CouponRejection> {
    let Some(coupon) = coupon else {
        return Err(CouponRejection::NotFound);
    };
    if coupon.expires_at < now {
        return Err(CouponRejection::Expired);
    }
    let minimum = from_cents(coupon.min_order_cents);
    if subtotal < minimum {
        return Err(CouponRejection::BelowMinimum { minimum });
    }
    if order.coupon_id == Some(coupon.id) && coupon.apply_once_per_user {
        return Err(CouponRejection::AlreadyApplied);
    }
    Ok(coupon)
}

/// Finds the active coupon for `code`, locking its row for the rest of the transaction.
pub async fn find_active_coupon<C>(db: &C, code: &str) -> Result<Option<coupon::Model>>
where
    C: ConnectionTrait,
{
    Coupon::find()
        .filter(coupon::Column::Code.eq(normalize_code(code)))
        .filter(coupon::Column::Active.eq(true))
        .lock_exclusive()
        .one(db)
        .await
        .map_err(Into::into)
}

/// Validates `code` against `order` and, on success, attaches the coupon to the order.
///
/// Run this inside the caller's transaction; the caller re-prices the order afterwards.
pub async fn validate_and_attach<C>(
    db: &C,
    order: order::Model,
    code: &str,
    subtotal: Decimal,
) -> Result<CouponOutcome>
where
    C: ConnectionTrait,
{
    let found = find_active_coupon(db, code).await?;
    let coupon = match check_coupon(&order, found.as_ref(), subtotal, Utc::now()) {
        Ok(coupon) => coupon.clone(),
        Err(reason) => {
            info!(
                "Rejected coupon '{}' for order {}: {}",
                code.trim(),
                order.id,
                reason.reason_code()
            );
            return Ok(CouponOutcome::Rejected(reason));
        }
    };

    let mut active: order::ActiveModel = order.into();
    active.coupon_id = Set(Some(coupon.id));
    active.updated_at = Set(Utc::now());
    let order = active.update(db).await?;

    info!("Applied coupon {} to order {}", coupon.code, order.id);
    Ok(CouponOutcome::Applied { order, coupon })
}

/// Unconditionally removes the coupon from `order`.
pub async fn detach_coupon<C>(db: &C, order: order::Model) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    let mut active: order::ActiveModel = order.into();
    active.coupon_id = Set(None);
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Vendor input for creating or editing a coupon.
#[derive(Debug, Clone, Deserialize)]
pub struct CouponDraft {
    pub code: String,
    pub discount_percent: f64,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub min_order: Decimal,
    #[serde(default)]
    pub max_discount: Decimal,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default = "default_true")]
    pub apply_once_per_user: bool,
}

const fn default_true() -> bool {
    true
}

struct ValidCoupon {
    code: String,
    discount_percent: f64,
    expires_at: DateTime<Utc>,
    min_order_cents: i64,
    max_discount_cents: i64,
    active: bool,
    apply_once_per_user: bool,
}

fn validate_draft(draft: &CouponDraft, now: DateTime<Utc>) -> Result<ValidCoupon> {
    let code = normalize_code(&draft.code);
    if code.is_empty() {
        return Err(Error::validation("code", "Coupon code cannot be empty."));
    }
    if code.chars().count() < MIN_CODE_LENGTH {
        return Err(Error::validation(
            "code",
            format!("Coupon code must be at least {MIN_CODE_LENGTH} characters long."),
        ));
    }
    if !draft.discount_percent.is_finite() {
        return Err(Error::validation(
            "discount_percent",
            "Discount percentage must be a number.",
        ));
    }
    if draft.discount_percent < 0.0 {
        return Err(Error::validation(
            "discount_percent",
            "Discount percentage cannot be negative.",
        ));
    }
    if draft.discount_percent > 100.0 {
        return Err(Error::validation(
            "discount_percent",
            "Discount percentage cannot exceed 100%.",
        ));
    }
    if draft.expires_at <= now {
        return Err(Error::validation(
            "expires_at",
            "Expiry date must be in the future.",
        ));
    }
    let min_order_cents = validate_price(draft.min_order, "min_order")?;
    let max_discount_cents = validate_price(draft.max_discount, "max_discount")?;
    if min_order_cents > 0 && max_discount_cents > min_order_cents {
        return Err(Error::validation(
            "max_discount",
            "Maximum discount amount cannot be greater than the minimum order amount.",
        ));
    }

    Ok(ValidCoupon {
        code,
        discount_percent: draft.discount_percent,
        expires_at: draft.expires_at,
        min_order_cents,
        max_discount_cents,
        active: draft.active,
        apply_once_per_user: draft.apply_once_per_user,
    })
}

async fn ensure_code_free<C>(db: &C, code: &str, except: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut query = Coupon::find().filter(coupon::Column::Code.eq(code));
    if let Some(id) = except {
        query = query.filter(coupon::Column::Id.ne(id));
    }
    if query.lock_exclusive().one(db).await?.is_some() {
        return Err(Error::validation("code", "This coupon code already exists."));
    }
    Ok(())
}

async fn load_owned_coupon<C>(db: &C, vendor_id: i64, coupon_id: i64) -> Result<coupon::Model>
where
    C: ConnectionTrait,
{
    let coupon = Coupon::find_by_id(coupon_id)
        .lock_exclusive()
        .one(db)
        .await?
        .ok_or_else(|| Error::CouponNotFound {
            code: coupon_id.to_string(),
        })?;
    if coupon.vendor_id != vendor_id {
        return Err(Error::PermissionDenied {
            message: format!("Coupon {} belongs to another vendor", coupon.code),
        });
    }
    Ok(coupon)
}

/// Creates a coupon for `vendor_id` and announces it once committed.
///
/// # Errors
/// Returns a validation error for a short or duplicate code, a percentage outside `[0, 100]`,
/// negative amounts or an expiry in the past.
pub async fn create_coupon<C>(
    db: &C,
    notifier: &dyn Notifier,
    vendor_id: i64,
    draft: &CouponDraft,
) -> Result<coupon::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    let valid = validate_draft(draft, Utc::now())?;

    let txn = db.begin().await?;
    crate::core::vendor::get_vendor(&txn, vendor_id).await?;
    ensure_code_free(&txn, &valid.code, None).await?;
    let coupon = coupon::ActiveModel {
        vendor_id: Set(vendor_id),
        code: Set(valid.code),
        discount_percent: Set(valid.discount_percent),
        active: Set(valid.active),
        expires_at: Set(valid.expires_at),
        min_order_cents: Set(valid.min_order_cents),
        max_discount_cents: Set(valid.max_discount_cents),
        apply_once_per_user: Set(valid.apply_once_per_user),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!("Vendor {} created coupon {}", vendor_id, coupon.code);
    dispatch(
        notifier,
        StoreEvent::CouponCreated {
            coupon_id: coupon.id,
            code: coupon.code.clone(),
            vendor_id,
        },
    );
    Ok(coupon)
}

/// Replaces every editable field of a coupon.
pub async fn update_coupon<C>(
    db: &C,
    vendor_id: i64,
    coupon_id: i64,
    draft: &CouponDraft,
) -> Result<coupon::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    let valid = validate_draft(draft, Utc::now())?;

    let txn = db.begin().await?;
    let existing = load_owned_coupon(&txn, vendor_id, coupon_id).await?;
    ensure_code_free(&txn, &valid.code, Some(coupon_id)).await?;

    let mut coupon: coupon::ActiveModel = existing.into();
    coupon.code = Set(valid.code);
    coupon.discount_percent = Set(valid.discount_percent);
    coupon.active = Set(valid.active);
    coupon.expires_at = Set(valid.expires_at);
    coupon.min_order_cents = Set(valid.min_order_cents);
    coupon.max_discount_cents = Set(valid.max_discount_cents);
    coupon.apply_once_per_user = Set(valid.apply_once_per_user);
    let coupon = coupon.update(&txn).await?;
    txn.commit().await?;

    info!("Vendor {} updated coupon {}", vendor_id, coupon.code);
    Ok(coupon)
}

/// Flips the `active` flag of a coupon.
pub async fn toggle_coupon_active<C>(db: &C, vendor_id: i64, coupon_id: i64) -> Result<coupon::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let existing = load_owned_coupon(&txn, vendor_id, coupon_id).await?;
    let active = !existing.active;
    let mut coupon: coupon::ActiveModel = existing.into();
    coupon.active = Set(active);
    let coupon = coupon.update(&txn).await?;
    txn.commit().await?;

    info!(
        "Coupon {} has been {}",
        coupon.code,
        if active { "activated" } else { "deactivated" }
    );
    Ok(coupon)
}

/// Hard deletes a coupon that no order references.
///
/// # Errors
/// Returns [`Error::CouponInUse`] when any order references the coupon; deactivate it instead.
pub async fn delete_coupon<C>(
    db: &C,
    notifier: &dyn Notifier,
    vendor_id: i64,
    coupon_id: i64,
) -> Result<()>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    let coupon = load_owned_coupon(&txn, vendor_id, coupon_id).await?;

    let references = Order::find()
        .filter(order::Column::CouponId.eq(coupon.id))
        .count(&txn)
        .await?;
    if references > 0 {
        warn!(
            "Refusing to delete coupon {} referenced by {} orders",
            coupon.code, references
        );
        return Err(Error::CouponInUse { code: coupon.code });
    }

    Coupon::delete_by_id(coupon.id).exec(&txn).await?;
    txn.commit().await?;

    info!("Vendor {} deleted coupon {}", vendor_id, coupon.code);
    dispatch(
        notifier,
        StoreEvent::CouponDeleted {
            code: coupon.code,
            vendor_id,
        },
    );
    Ok(())
}

/// Which coupons [`list_coupons`] returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponFilter {
    #[default]
    All,
    /// Active and not yet expired
    Active,
    Inactive,
    Expired,
}

/// Lists a vendor's coupons, newest first.
pub async fn list_coupons<C>(
    db: &C,
    vendor_id: i64,
    filter: CouponFilter,
    now: DateTime<Utc>,
) -> Result<Vec<coupon::Model>>
where
    C: ConnectionTrait,
{
    let query = Coupon::find().filter(coupon::Column::VendorId.eq(vendor_id));
    let query = match filter {
        CouponFilter::All => query,
        CouponFilter::Active => query
            .filter(coupon::Column::Active.eq(true))
            .filter(coupon::Column::ExpiresAt.gte(now)),
        CouponFilter::Inactive => query.filter(coupon::Column::Active.eq(false)),
        CouponFilter::Expired => query.filter(coupon::Column::ExpiresAt.lt(now)),
    };
    query
        .order_by_desc(coupon::Column::CreatedAt)
        .order_by_desc(coupon::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
