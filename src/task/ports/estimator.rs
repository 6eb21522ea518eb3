//! Port estimating how many files a task modifies.

use crate::task::domain::TaskRecord;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for file estimation.
pub type FileEstimateResult<T> = Result<T, FileEstimateError>;

/// Estimates the number of files a task's work touches.
#[async_trait]
pub trait FileEstimator: Send + Sync {
    /// Returns the estimated number of modified files for `record`.
    async fn estimate(&self, record: &TaskRecord) -> FileEstimateResult<usize>;
}

/// Errors returned by file estimators.
#[derive(Debug, Clone, Error)]
pub enum FileEstimateError {
    /// The estimator could not inspect the working tree.
    #[error("file estimate failed: {0}")]
    Failed(Arc<dyn std::error::Error + Send + Sync>),
}

impl FileEstimateError {
    /// Wraps an estimator failure.
    pub fn failed(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Failed(Arc::new(err))
    }
}
