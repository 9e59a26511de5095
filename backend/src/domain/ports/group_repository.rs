//! Ports for the group registry: groups, memberships and platform roles.

use async_trait::async_trait;

use crate::domain::{
    Group, GroupId, GroupProfile, GroupReview, GroupRole, GroupStatus, Membership, PlatformRole,
    UserId, UserProfile,
};

use super::RepositoryError;

/// Storage for groups.
///
/// `review` is a compare-and-swap on the status column: it only succeeds
/// while the group still holds `expected`, and otherwise reports
/// [`RepositoryError::StatusMismatch`] with the status actually found.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Insert a new group together with its founding membership.
    async fn create(&self, group: &Group, founder: &Membership) -> Result<(), RepositoryError>;

    /// Fetch a group by id.
    async fn find(&self, id: &GroupId) -> Result<Option<Group>, RepositoryError>;

    /// List groups, optionally restricted to one status.
    async fn list(&self, status: Option<GroupStatus>) -> Result<Vec<Group>, RepositoryError>;

    /// List the groups in which `user_id` holds a membership.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Group>, RepositoryError>;

    /// Replace name, description and location.
    async fn update_profile(
        &self,
        id: &GroupId,
        profile: &GroupProfile,
    ) -> Result<Group, RepositoryError>;

    /// Apply a review when the group still holds `expected`.
    async fn review(
        &self,
        id: &GroupId,
        expected: GroupStatus,
        review: &GroupReview,
    ) -> Result<Group, RepositoryError>;
}

/// Storage for memberships, unique per `(group, user)`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Fetch one membership.
    async fn find(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
    ) -> Result<Option<Membership>, RepositoryError>;

    /// List a group's memberships.
    async fn list(&self, group_id: &GroupId) -> Result<Vec<Membership>, RepositoryError>;

    /// Insert a membership; a second row for the same user is a
    /// [`RepositoryError::Duplicate`].
    async fn insert(&self, membership: &Membership) -> Result<(), RepositoryError>;

    /// Change the role of an existing membership.
    async fn update_role(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
        role: GroupRole,
    ) -> Result<Membership, RepositoryError>;

    /// Delete a membership.
    async fn delete(&self, group_id: &GroupId, user_id: &UserId) -> Result<(), RepositoryError>;
}

/// Storage for platform roles. Users without a profile row are plain users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Platform role of `user_id`.
    async fn platform_role(&self, user_id: &UserId) -> Result<PlatformRole, RepositoryError>;

    /// Upsert the platform role of `user_id`.
    async fn set_platform_role(
        &self,
        user_id: &UserId,
        role: PlatformRole,
    ) -> Result<(), RepositoryError>;

    /// Every stored profile, ordered by user id.
    async fn list(&self) -> Result<Vec<UserProfile>, RepositoryError>;
}
