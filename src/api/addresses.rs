//! Shipping address endpoints.

use super::{AppState, error::ApiResult, identity::CurrentUser};
use crate::{core::address, entities::address as address_entity};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct AddressRequest {
    pub address: String,
    #[serde(default)]
    pub mobile: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddressResponse {
    pub success: bool,
    pub address: address_entity::Model,
}

pub async fn list_addresses(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<address_entity::Model>>> {
    Ok(Json(address::list_addresses(&state.db, &user).await?))
}

pub async fn add_address(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<AddressRequest>,
) -> ApiResult<(StatusCode, Json<AddressResponse>)> {
    let address = address::add_address(&state.db, &user, &request.address, request.mobile).await?;
    Ok((
        StatusCode::CREATED,
        Json(AddressResponse {
            success: true,
            address,
        }),
    ))
}

pub async fn make_default(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(address_id): Path<i64>,
) -> ApiResult<Json<AddressResponse>> {
    let address = address::make_address_default(&state.db, &user, address_id).await?;
    Ok(Json(AddressResponse {
        success: true,
        address,
    }))
}
