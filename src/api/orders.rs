//! Shopper-facing order endpoints: checkout, coupons and payment.

use super::{AppState, error::ApiResult, identity::CurrentUser};
use crate::{
    core::{
        checkout::{self, CheckoutState},
        inventory::InventoryReport,
        order::{self, OrderDetail},
        order_status::{self, GatewayRequest},
        pricing::PriceBreakdown,
    },
    entities::{coupon, order as order_entity, order_line_item},
};
use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: order_entity::Model,
}

impl OrderResponse {
    fn ok(order: order_entity::Model) -> Json<Self> {
        Json(Self {
            success: true,
            order,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub coupon_code: Option<String>,
}

/// `{order, line_items, subtotal, discount, total}` plus coupon feedback.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    pub order: order_entity::Model,
    pub line_items: Vec<order_line_item::Model>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub state: CheckoutState,
    pub coupon: Option<coupon::Model>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub notices: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CouponRequest {
    pub code: String,
}

/// `{success, reason?, order}` with the repriced breakdown.
#[derive(Debug, Serialize)]
pub struct CouponResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub order: order_entity::Model,
    pub pricing: PriceBreakdown,
}

#[derive(Debug, Serialize)]
pub struct CodResponse {
    pub success: bool,
    pub order: order_entity::Model,
    pub inventory: InventoryReport,
}

#[derive(Debug, Serialize)]
pub struct GatewayResponse {
    pub success: bool,
    pub gateway: GatewayRequest,
}

pub async fn list_orders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<order_entity::Model>>> {
    Ok(Json(order::list_orders_for_user(&state.db, &user).await?))
}

pub async fn order_detail(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<i64>,
) -> ApiResult<Json<OrderDetail>> {
    Ok(Json(order::get_order_detail(&state.db, &user, order_id).await?))
}

pub async fn open_pending_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<OrderResponse>> {
    let cart = state.sessions.load(&user);
    let order = checkout::open_pending_order(&state.db, &user, &cart).await?;
    Ok(OrderResponse::ok(order))
}

pub async fn checkout_enter(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<i64>,
    request: Option<Json<CheckoutRequest>>,
) -> ApiResult<Json<CheckoutResponse>> {
    let Json(request) = request.unwrap_or_default();
    let cart = state.sessions.load(&user);
    let summary = checkout::checkout_enter(
        &state.db,
        &user,
        order_id,
        &cart,
        request.coupon_code.as_deref(),
    )
    .await?;

    Ok(Json(CheckoutResponse {
        success: summary.coupon_rejection.is_none(),
        subtotal: summary.pricing.subtotal,
        discount: summary.pricing.discount,
        total: summary.pricing.total,
        reason: summary.coupon_rejection.as_ref().map(|r| r.reason_code()),
        message: summary.coupon_rejection.as_ref().map(ToString::to_string),
        notices: summary.notices.iter().map(ToString::to_string).collect(),
        order: summary.order,
        line_items: summary.line_items,
        state: summary.state,
        coupon: summary.coupon,
    }))
}

pub async fn apply_coupon(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<i64>,
    Json(request): Json<CouponRequest>,
) -> ApiResult<Json<CouponResponse>> {
    let application = checkout::apply_coupon(&state.db, &user, order_id, &request.code).await?;
    Ok(Json(CouponResponse {
        success: application.success,
        reason: application.reason.as_ref().map(|r| r.reason_code()),
        message: application.reason.as_ref().map(ToString::to_string),
        order: application.order,
        pricing: application.pricing,
    }))
}

pub async fn cod_checkout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<i64>,
) -> ApiResult<Json<CodResponse>> {
    let confirmation =
        order_status::cod_checkout(&state.db, state.notifier.as_ref(), &user, order_id).await?;
    state.sessions.clear(&user);
    Ok(Json(CodResponse {
        success: true,
        order: confirmation.order,
        inventory: confirmation.inventory,
    }))
}

pub async fn cod_accept(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<i64>,
) -> ApiResult<Json<OrderResponse>> {
    let order = order_status::cod_accept(&state.db, &user, order_id).await?;
    Ok(OrderResponse::ok(order))
}

pub async fn gateway_request(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<i64>,
) -> ApiResult<Json<GatewayResponse>> {
    let gateway =
        order_status::gateway_request(&state.db, &state.public_url, &user, order_id).await?;
    Ok(Json(GatewayResponse {
        success: true,
        gateway,
    }))
}

/// Called by the payment gateway, not by the shopper.
pub async fn confirm_gateway_payment(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
) -> ApiResult<Json<OrderResponse>> {
    let order =
        order_status::confirm_gateway_payment(&state.db, state.notifier.as_ref(), order_id).await?;
    Ok(OrderResponse::ok(order))
}
