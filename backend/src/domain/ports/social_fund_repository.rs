//! Port for the social fund sub-ledger.

use async_trait::async_trait;

use crate::domain::{GroupId, MemberId, SocialFundTransaction, SocialFundTransition, SocialFundTxId};

use super::RepositoryError;

/// Storage for social fund transactions.
///
/// Withdrawal reviews are compare-and-swap updates on the status column.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SocialFundRepository: Send + Sync {
    /// Append a transaction.
    async fn insert(&self, tx: &SocialFundTransaction) -> Result<(), RepositoryError>;

    /// Fetch a transaction of the group.
    async fn find(
        &self,
        group_id: &GroupId,
        id: &SocialFundTxId,
    ) -> Result<Option<SocialFundTransaction>, RepositoryError>;

    /// List transactions, newest first, optionally for one member.
    async fn list(
        &self,
        group_id: &GroupId,
        member_id: Option<MemberId>,
    ) -> Result<Vec<SocialFundTransaction>, RepositoryError>;

    /// Review a pending withdrawal.
    async fn transition(
        &self,
        group_id: &GroupId,
        id: &SocialFundTxId,
        transition: &SocialFundTransition,
    ) -> Result<SocialFundTransaction, RepositoryError>;
}
