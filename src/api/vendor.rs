//! Vendor dashboard endpoints: order status and coupons.

use super::{AppState, error::ApiResult, identity::CurrentVendor};
use crate::{
    core::{
        coupon::{self, CouponDraft, CouponFilter},
        order, order_status,
    },
    entities::{OrderStatus, coupon as coupon_entity, order as order_entity},
    errors::Error,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct CouponQuery {
    #[serde(default)]
    pub filter: CouponFilter,
}

/// `{success, reason?, message?, order}`; a refused transition still carries the order.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub order: order_entity::Model,
}

#[derive(Debug, Serialize)]
pub struct CouponResponse {
    pub success: bool,
    pub coupon: coupon_entity::Model,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub success: bool,
}

pub async fn change_order_status(
    State(state): State<AppState>,
    CurrentVendor(vendor_id): CurrentVendor,
    Path(order_id): Path<i64>,
    Json(request): Json<StatusRequest>,
) -> ApiResult<(StatusCode, Json<StatusResponse>)> {
    match order_status::change_order_status(&state.db, vendor_id, order_id, request.status).await
    {
        Ok(order) => Ok((
            StatusCode::OK,
            Json(StatusResponse {
                success: true,
                reason: None,
                message: None,
                order,
            }),
        )),
        Err(err @ Error::InvalidTransition { .. }) => {
            let order = order::get_order(&state.db, order_id).await?;
            Ok((
                StatusCode::BAD_REQUEST,
                Json(StatusResponse {
                    success: false,
                    reason: Some(err.reason_code()),
                    message: Some(err.to_string()),
                    order,
                }),
            ))
        }
        Err(err) => Err(err),
    }
}

pub async fn list_coupons(
    State(state): State<AppState>,
    CurrentVendor(vendor_id): CurrentVendor,
    Query(query): Query<CouponQuery>,
) -> ApiResult<Json<Vec<coupon_entity::Model>>> {
    let coupons =
        coupon::list_coupons(&state.db, vendor_id, query.filter, chrono::Utc::now()).await?;
    Ok(Json(coupons))
}

pub async fn create_coupon(
    State(state): State<AppState>,
    CurrentVendor(vendor_id): CurrentVendor,
    Json(draft): Json<CouponDraft>,
) -> ApiResult<(StatusCode, Json<CouponResponse>)> {
    let coupon =
        coupon::create_coupon(&state.db, state.notifier.as_ref(), vendor_id, &draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(CouponResponse {
            success: true,
            coupon,
        }),
    ))
}

pub async fn update_coupon(
    State(state): State<AppState>,
    CurrentVendor(vendor_id): CurrentVendor,
    Path(coupon_id): Path<i64>,
    Json(draft): Json<CouponDraft>,
) -> ApiResult<Json<CouponResponse>> {
    let coupon = coupon::update_coupon(&state.db, vendor_id, coupon_id, &draft).await?;
    Ok(Json(CouponResponse {
        success: true,
        coupon,
    }))
}

pub async fn toggle_coupon(
    State(state): State<AppState>,
    CurrentVendor(vendor_id): CurrentVendor,
    Path(coupon_id): Path<i64>,
) -> ApiResult<Json<CouponResponse>> {
    let coupon = coupon::toggle_coupon_active(&state.db, vendor_id, coupon_id).await?;
    Ok(Json(CouponResponse {
        success: true,
        coupon,
    }))
}

pub async fn delete_coupon(
    State(state): State<AppState>,
    CurrentVendor(vendor_id): CurrentVendor,
    Path(coupon_id): Path<i64>,
) -> ApiResult<Json<Deleted>> {
    coupon::delete_coupon(&state.db, state.notifier.as_ref(), vendor_id, coupon_id).await?;
    Ok(Json(Deleted { success: true }))
}
