//! 产品 REST 处理器

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::Json,
};

use super::model::{Product, ProductForm};
use crate::app::AppState;
use crate::core::error::CoreError;

/// 获取所有产品
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, CoreError> {
    let products = state.product_service.list().await?;
    Ok(Json(products))
}

/// 根据 ID 获取产品
pub async fn get_product(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Product>, CoreError> {
    let Path(id) = id?;
    state
        .product_service
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| CoreError::NotFound(format!("Product {} not found", id)))
}

/// 创建产品
pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<ProductForm>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), CoreError> {
    let Json(form) = payload?;
    let product = state.product_service.create(form).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// 更新产品（整体覆盖）
pub async fn update_product(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ProductForm>, JsonRejection>,
) -> Result<Json<Product>, CoreError> {
    let Path(id) = id?;
    let Json(form) = payload?;
    let product = state.product_service.update(id, form).await?;
    Ok(Json(product))
}

/// 删除产品；ID 不存在时同样返回 204
pub async fn delete_product(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, CoreError> {
    let Path(id) = id?;
    state.product_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 健康检查
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, CoreError> {
    let product_count = state.product_service.count().await?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "product_count": product_count,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}
