//! Work intake models

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

/// Work item lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum WorkStatus {
    Pending,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown work status: {0}")]
pub struct UnknownWorkStatus(pub String);

impl WorkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkStatus::Pending => "pending",
            WorkStatus::Done => "done",
        }
    }
}

impl FromStr for WorkStatus {
    type Err = UnknownWorkStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(WorkStatus::Pending),
            "done" => Ok(WorkStatus::Done),
            other => Err(UnknownWorkStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for WorkStatus {
    type Error = UnknownWorkStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WorkStatus> for String {
    fn from(status: WorkStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<UnknownWorkStatus> for crate::error::AppError {
    fn from(e: UnknownWorkStatus) -> Self {
        crate::error::AppError::Validation(e.to_string())
    }
}

/// Accepted unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Work {
    pub id: Uuid,
    pub description: String,
    pub status: WorkStatus,
}

/// Work submission request
#[derive(Debug, Deserialize, Validate)]
pub struct WorkRequest {
    pub id: Uuid,
    #[validate(length(max = 4096, message = "description is too long"))]
    pub description: String,
}

/// Work acknowledgement
#[derive(Debug, Serialize)]
pub struct WorkResponse {
    pub id: Uuid,
    pub status: WorkStatus,
}

impl From<Work> for WorkResponse {
    fn from(work: Work) -> Self {
        Self {
            id: work.id,
            status: work.status,
        }
    }
}
