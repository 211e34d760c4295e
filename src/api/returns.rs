//! Return requests: opened by shoppers, resolved by the vendor of the order.

use super::{
    AppState,
    error::ApiResult,
    identity::{CurrentUser, CurrentVendor},
};
use crate::{core::returns, entities::return_request};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ReturnRequestBody {
    pub line_item_id: i64,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub approve: bool,
}

#[derive(Debug, Serialize)]
pub struct ReturnResponse {
    pub success: bool,
    pub return_request: return_request::Model,
}

pub async fn list_returns(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<return_request::Model>>> {
    Ok(Json(returns::list_return_requests(&state.db, &user).await?))
}

pub async fn open_return(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<ReturnRequestBody>,
) -> ApiResult<(StatusCode, Json<ReturnResponse>)> {
    let return_request =
        returns::create_return_request(&state.db, &user, body.line_item_id, &body.reason).await?;
    Ok((
        StatusCode::CREATED,
        Json(ReturnResponse {
            success: true,
            return_request,
        }),
    ))
}

pub async fn resolve_return(
    State(state): State<AppState>,
    CurrentVendor(vendor_id): CurrentVendor,
    Path(request_id): Path<i64>,
    Json(body): Json<ResolveRequest>,
) -> ApiResult<Json<ReturnResponse>> {
    let return_request =
        returns::resolve_return_request(&state.db, vendor_id, request_id, body.approve).await?;
    Ok(Json(ReturnResponse {
        success: true,
        return_request,
    }))
}
