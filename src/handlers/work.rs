//! 工作提交处理器

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    extract::ValidatedJson,
    middleware::AppState,
    models::work::{WorkRequest, WorkResponse},
};

/// 接收工作项，只登记不执行
pub async fn submit_work(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    ValidatedJson(req): ValidatedJson<WorkRequest>,
) -> Result<impl IntoResponse, AppError> {
    let work = state.work_service.process(&auth_context, req);

    Ok((StatusCode::ACCEPTED, Json(WorkResponse::from(work))))
}
