//! Port for the repayment ledger.

use async_trait::async_trait;

use crate::domain::{GroupId, Repayment, RepaymentFilter};

use super::RepositoryError;

/// Append-only storage for repayments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepaymentRepository: Send + Sync {
    /// Append a repayment.
    async fn insert(&self, repayment: &Repayment) -> Result<(), RepositoryError>;

    /// List repayments, newest first.
    async fn list(
        &self,
        group_id: &GroupId,
        filter: RepaymentFilter,
    ) -> Result<Vec<Repayment>, RepositoryError>;
}
