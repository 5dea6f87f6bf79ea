//! Bearer token 认证中间件

use crate::{auth::jwt::TokenService, error::AppError, models::role::Role};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

const BEARER_PREFIX: &str = "Bearer ";

/// 认证上下文（附加到请求扩展）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: Role,
}

// 实现 FromRequestParts 以便在 handler 中直接提取 AuthContext
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// 从 Authorization 头提取令牌，前缀必须严格为 "Bearer "
pub fn extract_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .filter(|token| !token.is_empty())
        .ok_or(AppError::Unauthorized)
}

/// 认证中间件 - 默认拒绝
///
/// 缺失或格式错误的 Authorization 头直接返回 401；
/// 令牌无效或过期返回 403；只有通过校验的请求才会继续向下游传递。
pub async fn authenticate(
    State(token_service): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = match extract_token(req.headers()) {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!(uri = %req.uri(), "Missing or malformed bearer token");
            return Err(e);
        }
    };

    let claims = token_service.validate(token).map_err(|e| {
        tracing::warn!(uri = %req.uri(), reason = %e, "Rejected bearer token");
        AppError::from(e)
    })?;

    req.extensions_mut().insert(AuthContext {
        user_id: claims.sub,
        role: claims.role,
    });

    Ok(next.run(req).await)
}
