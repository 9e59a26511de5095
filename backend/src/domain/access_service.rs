//! Access control service: actors, group access and platform roles.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    AccessControl, GroupRepository, MembershipRepository, ProfileRepository,
};
use crate::domain::{
    Actor, Capability, Error, GroupAccess, GroupId, PlatformRole, UserId, UserProfile,
};

/// Resolves actors and their per-group capabilities.
#[derive(Clone)]
pub struct AccessService {
    groups: Arc<dyn GroupRepository>,
    memberships: Arc<dyn MembershipRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl AccessService {
    /// Create the service over the registry repositories.
    pub fn new(
        groups: Arc<dyn GroupRepository>,
        memberships: Arc<dyn MembershipRepository>,
        profiles: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            groups,
            memberships,
            profiles,
        }
    }
}

#[async_trait]
impl AccessControl for AccessService {
    async fn actor(&self, user_id: &UserId) -> Result<Actor, Error> {
        let role = self.profiles.platform_role(user_id).await?;
        Ok(Actor::new(*user_id, role))
    }

    async fn group_access(&self, actor: &Actor, group_id: &GroupId) -> Result<GroupAccess, Error> {
        // Missing groups and groups the caller cannot see are reported
        // identically so tenant existence does not leak.
        let hidden = || Error::not_found(format!("group {group_id} not found"));
        let group = self.groups.find(group_id).await?.ok_or_else(hidden)?;
        let role = self
            .memberships
            .find(group_id, actor.user_id())
            .await?
            .map(|membership| membership.role);
        GroupAccess::resolve(actor.clone(), &group, role).ok_or_else(hidden)
    }

    async fn set_platform_role(
        &self,
        actor: &Actor,
        user_id: &UserId,
        role: PlatformRole,
    ) -> Result<(), Error> {
        actor.require(Capability::ManagePlatformRoles)?;
        self.profiles.set_platform_role(user_id, role).await?;
        info!(%user_id, platform_role = %role, changed_by = %actor.user_id(), "platform role updated");
        Ok(())
    }

    async fn list_profiles(&self, actor: &Actor) -> Result<Vec<UserProfile>, Error> {
        actor.require(Capability::ManagePlatformRoles)?;
        Ok(self.profiles.list().await?)
    }
}

#[cfg(test)]
#[path = "access_service_tests.rs"]
mod tests;
