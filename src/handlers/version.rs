//! 版本查询处理器

use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use crate::{error::AppError, middleware::AppState};

/// 当前数据模式版本
pub async fn get_version(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let version = state.auth_service.version().await?;
    Ok(Json(version))
}
