//! Port for the savings ledger.

use async_trait::async_trait;

use crate::domain::{GroupId, Saving, SavingFilter, SavingId, SavingStatus};

use super::RepositoryError;

/// Append-only storage for deposits; only the status is ever updated.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SavingsRepository: Send + Sync {
    /// Append a deposit.
    async fn insert(&self, saving: &Saving) -> Result<(), RepositoryError>;

    /// Fetch a deposit of the group.
    async fn find(
        &self,
        group_id: &GroupId,
        id: &SavingId,
    ) -> Result<Option<Saving>, RepositoryError>;

    /// List deposits matching `filter`, newest first.
    async fn list(
        &self,
        group_id: &GroupId,
        filter: SavingFilter,
    ) -> Result<Vec<Saving>, RepositoryError>;

    /// Overwrite the status of a deposit.
    async fn update_status(
        &self,
        group_id: &GroupId,
        id: &SavingId,
        status: SavingStatus,
    ) -> Result<Saving, RepositoryError>;
}
