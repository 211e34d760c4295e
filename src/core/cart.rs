//! Cart store - the ephemeral, session-held shopping cart.
//!
//! A [`Cart`] is a plain value owned by one session; persistence is the job of a
//! [`SessionStore`](crate::core::session::SessionStore). Lines keep insertion order and cache the
//! unit price seen when the product was added. Subtotals are always recomputed from
//! `quantity * unit_price` when a snapshot is taken.

use crate::{
    core::{
        image::{ImageOwner, primary_image_url},
        money::{from_cents, round_money, validate_price},
        pricing::LineAmount,
        product::{find_live_product, get_listed_product},
    },
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: i64,
    pub quantity: u32,
    /// Price cached at add time
    pub unit_price: Decimal,
    pub display_title: String,
    pub display_image: String,
}

impl LineAmount for CartLine {
    fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

/// Unvalidated input for [`Cart::add`], as received from the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartLineDraft {
    pub product_id: Option<i64>,
    pub quantity: Option<i64>,
    pub unit_price: Option<Decimal>,
    pub title: Option<String>,
    pub image: Option<String>,
}

impl CartLineDraft {
    /// Checks every required field, reporting the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.product_id.is_none() {
            return Err(Error::validation("product_id", "is required"));
        }
        match self.quantity {
            None => return Err(Error::validation("quantity", "is required")),
            Some(q) if q < 1 => return Err(Error::InvalidQuantity { quantity: q }),
            Some(_) => {}
        }
        let Some(price) = self.unit_price else {
            return Err(Error::validation("unit_price", "is required"));
        };
        validate_price(price, "unit_price")?;
        if self.title.as_deref().is_none_or(|t| t.trim().is_empty()) {
            return Err(Error::validation("title", "is required"));
        }
        Ok(())
    }

    fn into_line(self) -> Option<CartLine> {
        let quantity = u32::try_from(self.quantity?).ok().filter(|q| *q >= 1)?;
        let unit_price = self.unit_price.filter(|p| !p.is_sign_negative() || p.is_zero())?;
        Some(CartLine {
            product_id: self.product_id?,
            quantity,
            unit_price,
            display_title: self.title?,
            display_image: self.image.unwrap_or_default(),
        })
    }
}

/// A line as presented in a snapshot, with its recomputed subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotLine {
    #[serde(flatten)]
    pub line: CartLine,
    pub subtotal: Decimal,
}

/// Point-in-time view of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSnapshot {
    pub lines: Vec<SnapshotLine>,
    pub total: Decimal,
    pub item_count: usize,
}

/// The session cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Inserts a line, or overwrites the quantity of an existing one (last write wins).
    ///
    /// Returns `false` without touching the cart when a required field is missing; callers
    /// are expected to run [`CartLineDraft::validate`] first.
    pub fn add(&mut self, draft: CartLineDraft) -> bool {
        let Some(line) = draft.into_line() else {
            debug!("Ignoring incomplete cart line");
            return false;
        };

        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == line.product_id)
        {
            existing.quantity = line.quantity;
        } else {
            self.lines.push(line);
        }
        true
    }

    /// Removes the line for `product_id`. Returns whether a line was removed.
    pub fn remove(&mut self, product_id: i64) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        before != self.lines.len()
    }

    #[must_use]
    pub fn line(&self, product_id: i64) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Exact sum of the line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        crate::core::pricing::subtotal(&self.lines)
    }

    /// Lines in insertion order with freshly computed subtotals.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        let lines: Vec<SnapshotLine> = self
            .lines
            .iter()
            .map(|line| SnapshotLine {
                subtotal: round_money(line.line_total()),
                line: line.clone(),
            })
            .collect();
        CartSnapshot {
            item_count: lines.len(),
            total: round_money(self.subtotal()),
            lines,
        }
    }

    fn set_quantity(&mut self, product_id: i64, quantity: u32) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = quantity;
        }
    }
}

/// Outcome of a quantity update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuantityUpdate {
    pub product_id: i64,
    /// Quantity actually stored
    pub quantity: u32,
    /// Units the catalog currently holds
    pub stock: i32,
    /// Present when the requested quantity was clamped
    pub advisory: Option<String>,
}

/// Clamps `requested` into `[1, stock]`.
///
/// Returns the stored quantity and, when clamping happened, the advisory for the shopper.
/// A product with no stock rejects the update outright.
pub fn clamp_quantity(product_id: i64, requested: i64, stock: i32) -> Result<(u32, Option<String>)> {
    if stock <= 0 {
        return Err(Error::OutOfStock { product_id });
    }
    let stock_units = u32::try_from(stock).unwrap_or(u32::MAX);
    if requested < 1 {
        return Ok((1, Some("minimum is 1".to_string())));
    }
    match u32::try_from(requested) {
        Ok(q) if q <= stock_units => Ok((q, None)),
        _ => Ok((stock_units, Some(format!("only {stock} in stock")))),
    }
}

/// Updates the quantity of a cart line, clamped to what the catalog can supply.
///
/// If the product has left the catalog its line is dropped from the cart before
/// [`Error::ProductNotFound`] is returned, so callers must persist the cart either way.
pub async fn update_quantity<C>(
    db: &C,
    cart: &mut Cart,
    product_id: i64,
    requested: i64,
) -> Result<QuantityUpdate>
where
    C: ConnectionTrait,
{
    let Some(product) = find_live_product(db, product_id).await? else {
        if cart.remove(product_id) {
            warn!(
                "Product {} is no longer available; removed it from the cart",
                product_id
            );
        }
        return Err(Error::ProductNotFound { product_id });
    };

    if cart.line(product_id).is_none() {
        return Err(Error::CartLineNotFound { product_id });
    }

    let (quantity, advisory) = clamp_quantity(product_id, requested, product.stock_count)?;
    cart.set_quantity(product_id, quantity);
    if let Some(message) = &advisory {
        info!(
            "Clamped cart quantity for product {} from {} to {}: {}",
            product_id, requested, quantity, message
        );
    }

    Ok(QuantityUpdate {
        product_id,
        quantity,
        stock: product.stock_count,
        advisory,
    })
}

/// Puts a catalog product into the cart, or overwrites the quantity of its line.
///
/// The cached price, title and image come from the catalog, never from the client. The
/// quantity is clamped to the available stock and the advisory reported like
/// [`update_quantity`].
///
/// # Errors
/// Returns [`Error::InvalidQuantity`] for a quantity below 1, [`Error::ProductNotFound`] for a
/// product that is not published and listed, and [`Error::OutOfStock`] when nothing is left.
pub async fn add_from_catalog<C>(
    db: &C,
    cart: &mut Cart,
    product_id: i64,
    requested: i64,
) -> Result<QuantityUpdate>
where
    C: ConnectionTrait,
{
    if requested < 1 {
        return Err(Error::InvalidQuantity {
            quantity: requested,
        });
    }
    let product = get_listed_product(db, product_id).await?;
    let (quantity, advisory) = clamp_quantity(product_id, requested, product.stock_count)?;
    let image = primary_image_url(db, ImageOwner::Product(product.id)).await?;

    let draft = CartLineDraft {
        product_id: Some(product.id),
        quantity: Some(i64::from(quantity)),
        unit_price: Some(from_cents(product.amount_cents)),
        title: Some(product.title),
        image: Some(image),
    };
    draft.validate()?;
    cart.add(draft);

    if let Some(message) = &advisory {
        info!(
            "Clamped added quantity for product {} from {} to {}: {}",
            product_id, requested, quantity, message
        );
    }
    Ok(QuantityUpdate {
        product_id,
        quantity,
        stock: product.stock_count,
        advisory,
    })
}
