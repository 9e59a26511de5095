//! Driving port resolving who the caller is and what they may do.

use async_trait::async_trait;

use crate::domain::{Actor, Error, GroupAccess, GroupId, PlatformRole, UserId, UserProfile};

/// Access control entry point for inbound adapters.
///
/// Handlers resolve an [`Actor`] from the session user, then a
/// [`GroupAccess`] for the group in the path, and pass that value to every
/// group-scoped service call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccessControl: Send + Sync {
    /// Resolve the platform role of an authenticated user.
    async fn actor(&self, user_id: &UserId) -> Result<Actor, Error>;

    /// Resolve `actor`'s access to a group.
    ///
    /// # Errors
    /// `NotFound` when the group does not exist or when the actor has no
    /// membership and is not a super admin.
    async fn group_access(&self, actor: &Actor, group_id: &GroupId) -> Result<GroupAccess, Error>;

    /// Change a user's platform role. Requires `manage_platform_roles`.
    async fn set_platform_role(
        &self,
        actor: &Actor,
        user_id: &UserId,
        role: PlatformRole,
    ) -> Result<(), Error>;

    /// Users with a stored platform role. Requires `manage_platform_roles`.
    async fn list_profiles(&self, actor: &Actor) -> Result<Vec<UserProfile>, Error>;
}
