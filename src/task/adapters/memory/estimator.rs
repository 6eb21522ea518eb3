//! Constant file estimator.

use async_trait::async_trait;

use crate::task::{
    domain::TaskRecord,
    ports::{FileEstimateResult, FileEstimator},
};

/// Estimator that reports the same file count for every task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedFileEstimate(pub usize);

#[async_trait]
impl FileEstimator for FixedFileEstimate {
    async fn estimate(&self, _record: &TaskRecord) -> FileEstimateResult<usize> {
        Ok(self.0)
    }
}
