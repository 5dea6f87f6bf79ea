//! 认证相关的 HTTP 处理器

use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use crate::{
    error::AppError,
    extract::ValidatedJson,
    middleware::AppState,
    models::{
        auth::{LoginRequest, LoginResponse},
        user::{SignupRequest, UserResponse},
    },
};

/// 注册
pub async fn signup(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let identity = state
        .auth_service
        .signup(&req.username, &req.password, &req.role)
        .await?;

    Ok(Json(UserResponse::from(identity)))
}

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let token = state.auth_service.login(&req.username, &req.password).await?;

    Ok(Json(LoginResponse { token }))
}
