//! 作业受理服务

use crate::{
    auth::middleware::AuthContext,
    models::work::{Work, WorkRequest, WorkStatus},
};

/// 受理作业；目前仅记录并返回待处理状态
#[derive(Debug, Default, Clone)]
pub struct WorkService;

impl WorkService {
    pub fn new() -> Self {
        Self
    }

    pub fn process(&self, submitter: &AuthContext, req: WorkRequest) -> Work {
        tracing::info!(
            work_id = %req.id,
            submitted_by = %submitter.user_id,
            description = %req.description,
            "Received work"
        );

        Work {
            id: req.id,
            description: req.description,
            status: WorkStatus::Pending,
        }
    }
}
