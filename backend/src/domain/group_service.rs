//! Group registry service: group lifecycle and memberships.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::group::non_blank;
use crate::domain::ports::{GroupRegistry, GroupRepository, MembershipRepository, RepositoryError};
use crate::domain::service_support::transition_error;
use crate::domain::{
    Actor, Capability, Error, Group, GroupAccess, GroupId, GroupProfile, GroupReview,
    GroupReviewAction, GroupRole, GroupStatus, Membership, UserId,
};

/// Implements [`GroupRegistry`].
#[derive(Clone)]
pub struct GroupService {
    groups: Arc<dyn GroupRepository>,
    memberships: Arc<dyn MembershipRepository>,
    clock: Arc<dyn Clock>,
}

impl GroupService {
    /// Create the service.
    pub fn new(
        groups: Arc<dyn GroupRepository>,
        memberships: Arc<dyn MembershipRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            groups,
            memberships,
            clock,
        }
    }

    /// Refuse changes that would leave the group without an admin.
    async fn ensure_admin_remains(
        &self,
        access: &GroupAccess,
        user_id: &UserId,
        next_role: Option<GroupRole>,
    ) -> Result<Membership, Error> {
        let memberships = self.memberships.list(access.group_id()).await?;
        let current = memberships
            .iter()
            .find(|membership| membership.user_id == *user_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("membership for user {user_id} not found")))?;
        let losing_admin =
            current.role == GroupRole::Admin && next_role != Some(GroupRole::Admin);
        let admins = memberships
            .iter()
            .filter(|membership| membership.role == GroupRole::Admin)
            .count();
        if losing_admin && admins <= 1 {
            return Err(
                Error::invalid_request("a group must keep at least one admin").with_details(
                    json!({ "code": "last_admin", "userId": user_id.to_string() }),
                ),
            );
        }
        Ok(current)
    }
}

fn membership_error(error: RepositoryError, user_id: &UserId) -> Error {
    match error {
        RepositoryError::Missing { .. } => {
            Error::not_found(format!("membership for user {user_id} not found"))
        }
        RepositoryError::Duplicate { .. } => {
            Error::conflict(format!("user {user_id} is already a member of this group"))
        }
        other => other.into(),
    }
}

#[async_trait]
impl GroupRegistry for GroupService {
    async fn create_group(&self, actor: &Actor, profile: GroupProfile) -> Result<Group, Error> {
        let now = self.clock.utc();
        let group = profile.into_pending_group(*actor.user_id(), now);
        let founder = Membership {
            group_id: group.id,
            user_id: *actor.user_id(),
            role: GroupRole::Admin,
            created_at: now,
        };
        self.groups.create(&group, &founder).await?;
        info!(group_id = %group.id, created_by = %actor.user_id(), "group requested");
        Ok(group)
    }

    async fn list_groups(
        &self,
        actor: &Actor,
        status: Option<GroupStatus>,
    ) -> Result<Vec<Group>, Error> {
        if actor.platform_capabilities().contains(Capability::ReviewGroups) {
            return Ok(self.groups.list(status).await?);
        }
        let mine = self.groups.list_for_user(actor.user_id()).await?;
        Ok(mine
            .into_iter()
            .filter(|group| status.is_none_or(|wanted| group.status == wanted))
            .collect())
    }

    async fn get_group(&self, access: &GroupAccess) -> Result<Group, Error> {
        self.groups
            .find(access.group_id())
            .await?
            .ok_or_else(|| Error::not_found(format!("group {} not found", access.group_id())))
    }

    async fn update_group(
        &self,
        access: &GroupAccess,
        profile: GroupProfile,
    ) -> Result<Group, Error> {
        access.require(Capability::ManageGroup)?;
        let group = self
            .groups
            .update_profile(access.group_id(), &profile)
            .await?;
        info!(group_id = %group.id, "group profile updated");
        Ok(group)
    }

    async fn review_group(
        &self,
        actor: &Actor,
        group_id: &GroupId,
        action: GroupReviewAction,
        notes: Option<String>,
    ) -> Result<Group, Error> {
        actor.require(Capability::ReviewGroups)?;
        let review = GroupReview {
            status: action.to_status(),
            reviewed_by: *actor.user_id(),
            reviewed_at: self.clock.utc(),
            admin_notes: non_blank(notes),
        };
        let group = self
            .groups
            .review(group_id, action.from_status(), &review)
            .await
            .map_err(|error| transition_error(error, "group", action.to_status().as_str()))?;
        info!(%group_id, %action, status = %group.status, "group reviewed");
        Ok(group)
    }

    async fn list_memberships(&self, access: &GroupAccess) -> Result<Vec<Membership>, Error> {
        Ok(self.memberships.list(access.group_id()).await?)
    }

    async fn add_membership(
        &self,
        access: &GroupAccess,
        user_id: UserId,
        role: GroupRole,
    ) -> Result<Membership, Error> {
        access.require(Capability::ManageMemberships)?;
        let membership = Membership {
            group_id: *access.group_id(),
            user_id,
            role,
            created_at: self.clock.utc(),
        };
        self.memberships
            .insert(&membership)
            .await
            .map_err(|error| membership_error(error, &user_id))?;
        info!(group_id = %access.group_id(), %user_id, %role, "membership granted");
        Ok(membership)
    }

    async fn update_membership_role(
        &self,
        access: &GroupAccess,
        user_id: UserId,
        role: GroupRole,
    ) -> Result<Membership, Error> {
        access.require(Capability::ManageMemberships)?;
        let current = self.ensure_admin_remains(access, &user_id, Some(role)).await?;
        if current.role == role {
            return Ok(current);
        }
        let updated = self
            .memberships
            .update_role(access.group_id(), &user_id, role)
            .await
            .map_err(|error| membership_error(error, &user_id))?;
        info!(group_id = %access.group_id(), %user_id, %role, "membership role changed");
        Ok(updated)
    }

    async fn remove_membership(&self, access: &GroupAccess, user_id: UserId) -> Result<(), Error> {
        access.require(Capability::ManageMemberships)?;
        self.ensure_admin_remains(access, &user_id, None).await?;
        self.memberships
            .delete(access.group_id(), &user_id)
            .await
            .map_err(|error| membership_error(error, &user_id))?;
        info!(group_id = %access.group_id(), %user_id, "membership revoked");
        Ok(())
    }
}

#[cfg(test)]
#[path = "group_service_tests.rs"]
mod tests;
