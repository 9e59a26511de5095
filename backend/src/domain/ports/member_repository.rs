//! Port for the member register.

use async_trait::async_trait;

use crate::domain::{GroupId, Member, MemberId};

use super::RepositoryError;

/// Storage for members. Every call is scoped to one group.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Insert a new member.
    async fn insert(&self, member: &Member) -> Result<(), RepositoryError>;

    /// Fetch a member of the group.
    async fn find(
        &self,
        group_id: &GroupId,
        member_id: &MemberId,
    ) -> Result<Option<Member>, RepositoryError>;

    /// List the group's members ordered by name.
    async fn list(&self, group_id: &GroupId) -> Result<Vec<Member>, RepositoryError>;

    /// Persist changed contact fields and status. The group never changes.
    async fn update(&self, member: &Member) -> Result<(), RepositoryError>;

    /// Delete a member.
    async fn delete(&self, group_id: &GroupId, member_id: &MemberId)
    -> Result<(), RepositoryError>;
}
