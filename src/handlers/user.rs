//! 用户查询的 HTTP 处理器

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{error::AppError, middleware::AppState, models::user::UserResponse};

/// 获取用户详情
pub async fn find_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| AppError::Validation(format!("Invalid user id: {}", id)))?;

    let identity = state.auth_service.find_user(id).await?;

    Ok(Json(UserResponse::from(identity)))
}
