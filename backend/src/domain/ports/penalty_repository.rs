//! Port for penalties.

use async_trait::async_trait;

use crate::domain::{GroupId, Penalty, PenaltyFilter, PenaltyId, PenaltyTransition};

use super::RepositoryError;

/// Storage for penalties. Settlements are compare-and-swap updates from
/// `unpaid`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PenaltyRepository: Send + Sync {
    /// Insert an unpaid penalty.
    async fn insert(&self, penalty: &Penalty) -> Result<(), RepositoryError>;

    /// Fetch a penalty of the group.
    async fn find(
        &self,
        group_id: &GroupId,
        id: &PenaltyId,
    ) -> Result<Option<Penalty>, RepositoryError>;

    /// List penalties, newest first.
    async fn list(
        &self,
        group_id: &GroupId,
        filter: PenaltyFilter,
    ) -> Result<Vec<Penalty>, RepositoryError>;

    /// Settle an unpaid penalty.
    async fn transition(
        &self,
        group_id: &GroupId,
        id: &PenaltyId,
        transition: &PenaltyTransition,
    ) -> Result<Penalty, RepositoryError>;
}
