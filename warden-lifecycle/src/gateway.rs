use async_trait::async_trait;
use thiserror::Error;

use crate::snapshot::{MessageSnapshot, ThreadState};

/// Failure taxonomy for Discord calls made by the scanner.
///
/// None of these are retried inside a pass; the next scheduled pass is the
/// retry.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("missing permission: {0}")]
    PermissionDenied(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("transient discord failure: {0}")]
    Transient(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    PermissionDenied,
    NotFound,
    Transient,
}

impl FailureKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::PermissionDenied => "missing permission",
            Self::NotFound => "not found",
            Self::Transient => "transient error",
        }
    }
}

impl GatewayError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::PermissionDenied(_) => FailureKind::PermissionDenied,
            Self::NotFound(_) => FailureKind::NotFound,
            Self::Transient(_) => FailureKind::Transient,
        }
    }
}

/// The Discord operations the lifecycle pass needs.
#[async_trait]
pub trait ThreadGateway: Send + Sync {
    /// Archived threads under a text or forum channel, most recently
    /// archived first.
    async fn archived_threads(&self, container_id: u64) -> Result<Vec<ThreadState>, GatewayError>;

    async fn thread(&self, thread_id: u64) -> Result<ThreadState, GatewayError>;

    /// Up to `limit` messages, most recent first.
    async fn recent_messages(
        &self,
        thread_id: u64,
        limit: u8,
    ) -> Result<Vec<MessageSnapshot>, GatewayError>;

    async fn reopen_thread(&self, thread_id: u64) -> Result<(), GatewayError>;

    async fn delete_thread(&self, thread_id: u64) -> Result<(), GatewayError>;
}
