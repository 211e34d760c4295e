//! Catalog endpoints: the public listing plus vendor product and image management.

use super::{AppState, error::ApiResult, identity::CurrentVendor};
use crate::{
    core::{
        image::{self, ImageOwner},
        product::{self, ProductChanges, ProductDraft, ProductSaved},
    },
    entities::{image as image_entity, product as product_entity},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    #[serde(flatten)]
    pub draft: ProductDraft,
    #[serde(default)]
    pub publish: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    #[serde(flatten)]
    pub changes: ProductChanges,
    #[serde(default)]
    pub publish: bool,
}

/// `{success, product, advisory_message?}`
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub success: bool,
    pub product: product_entity::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory_message: Option<String>,
}

impl ProductResponse {
    fn of(product: product_entity::Model) -> Json<Self> {
        Json(Self {
            success: true,
            product,
            advisory_message: None,
        })
    }
}

impl From<ProductSaved> for ProductResponse {
    fn from(saved: ProductSaved) -> Self {
        Self {
            success: true,
            product: saved.product,
            advisory_message: saved.advisory,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    pub owner: ImageOwner,
    pub url: String,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub success: bool,
    pub image: image_entity::Model,
}

pub async fn list_products(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<product_entity::Model>>> {
    Ok(Json(product::list_published_products(&state.db).await?))
}

pub async fn product_images(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> ApiResult<Json<Vec<image_entity::Model>>> {
    let images = image::images_for(&state.db, ImageOwner::Product(product_id)).await?;
    Ok(Json(images))
}

pub async fn create_product(
    State(state): State<AppState>,
    CurrentVendor(vendor_id): CurrentVendor,
    Json(request): Json<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<ProductResponse>)> {
    let saved =
        product::create_product(&state.db, vendor_id, request.draft, request.publish).await?;
    Ok((StatusCode::CREATED, Json(saved.into())))
}

pub async fn update_product(
    State(state): State<AppState>,
    CurrentVendor(vendor_id): CurrentVendor,
    Path(product_id): Path<i64>,
    Json(request): Json<UpdateProductRequest>,
) -> ApiResult<Json<ProductResponse>> {
    let saved = product::update_product(
        &state.db,
        vendor_id,
        product_id,
        request.changes,
        request.publish,
    )
    .await?;
    Ok(Json(saved.into()))
}

pub async fn delete_product(
    State(state): State<AppState>,
    CurrentVendor(vendor_id): CurrentVendor,
    Path(product_id): Path<i64>,
) -> ApiResult<Json<ProductResponse>> {
    let product = product::delete_product(&state.db, vendor_id, product_id).await?;
    Ok(ProductResponse::of(product))
}

pub async fn restore_product(
    State(state): State<AppState>,
    CurrentVendor(vendor_id): CurrentVendor,
    Path(product_id): Path<i64>,
) -> ApiResult<Json<ProductResponse>> {
    let product = product::restore_product(&state.db, vendor_id, product_id).await?;
    Ok(ProductResponse::of(product))
}

pub async fn add_image(
    State(state): State<AppState>,
    CurrentVendor(vendor_id): CurrentVendor,
    Json(request): Json<ImageRequest>,
) -> ApiResult<(StatusCode, Json<ImageResponse>)> {
    image::ensure_vendor_owns(&state.db, vendor_id, request.owner).await?;
    let image = image::add_image(
        &state.db,
        request.owner,
        &request.url,
        request.alt_text,
        request.is_primary,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(ImageResponse {
            success: true,
            image,
        }),
    ))
}

pub async fn make_primary_image(
    State(state): State<AppState>,
    CurrentVendor(vendor_id): CurrentVendor,
    Path(image_id): Path<i64>,
) -> ApiResult<Json<ImageResponse>> {
    let owner = image::image_owner(&state.db, image_id).await?;
    image::ensure_vendor_owns(&state.db, vendor_id, owner).await?;
    let image = image::set_primary_image(&state.db, image_id).await?;
    Ok(Json(ImageResponse {
        success: true,
        image,
    }))
}
