//! Cart endpoints. Each mutation answers with the whole cart so the page can re-render.

use super::{AppState, error::ApiResult, identity::CurrentUser};
use crate::core::cart::{self, Cart, CartSnapshot};
use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `{success, cart_snapshot, total, advisory_message?}`
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub success: bool,
    pub cart_snapshot: CartSnapshot,
    pub total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory_message: Option<String>,
}

impl CartResponse {
    fn of(cart: &Cart, advisory_message: Option<String>) -> Json<Self> {
        let cart_snapshot = cart.snapshot();
        Json(Self {
            success: true,
            total: cart_snapshot.total,
            cart_snapshot,
            advisory_message,
        })
    }
}

/// Only the product and quantity are read; price and title come from the catalog.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub quantity: i64,
}

pub async fn show_cart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Json<CartResponse> {
    CartResponse::of(&state.sessions.load(&user), None)
}

pub async fn add_to_cart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<AddItemRequest>,
) -> ApiResult<Json<CartResponse>> {
    let mut cart = state.sessions.load(&user);
    let update =
        cart::add_from_catalog(&state.db, &mut cart, request.product_id, request.quantity).await?;
    state.sessions.save(&user, cart.clone());
    Ok(CartResponse::of(&cart, update.advisory))
}

pub async fn update_cart_quantity(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<i64>,
    Json(request): Json<QuantityRequest>,
) -> ApiResult<Json<CartResponse>> {
    let mut cart = state.sessions.load(&user);
    let result = cart::update_quantity(&state.db, &mut cart, product_id, request.quantity).await;
    // A vanished product is dropped from the cart even though the update fails
    state.sessions.save(&user, cart.clone());
    let update = result?;
    Ok(CartResponse::of(&cart, update.advisory))
}

pub async fn remove_from_cart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<i64>,
) -> Json<CartResponse> {
    let mut cart = state.sessions.load(&user);
    cart.remove(product_id);
    state.sessions.save(&user, cart.clone());
    CartResponse::of(&cart, None)
}
