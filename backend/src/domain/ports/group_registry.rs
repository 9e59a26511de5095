//! Driving ports for groups, memberships and the member register.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{
    Actor, Error, Group, GroupAccess, GroupId, GroupProfile, GroupReviewAction, GroupRole,
    GroupStatus, Member, MemberDetails, MemberId, MemberUpdate, Membership, UserId,
};

/// Group lifecycle and membership management.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRegistry: Send + Sync {
    /// Request a new group. It starts `pending` and the caller becomes its
    /// admin.
    async fn create_group(&self, actor: &Actor, profile: GroupProfile) -> Result<Group, Error>;

    /// Groups visible to the caller. Super admins see every group and may
    /// filter by status; other users see their own groups.
    async fn list_groups(
        &self,
        actor: &Actor,
        status: Option<GroupStatus>,
    ) -> Result<Vec<Group>, Error>;

    /// Fetch the group the access was resolved for.
    async fn get_group(&self, access: &GroupAccess) -> Result<Group, Error>;

    /// Edit name, description and location. Requires `manage_group`.
    async fn update_group(&self, access: &GroupAccess, profile: GroupProfile)
    -> Result<Group, Error>;

    /// Super-admin review. Requires `review_groups`.
    async fn review_group(
        &self,
        actor: &Actor,
        group_id: &GroupId,
        action: GroupReviewAction,
        notes: Option<String>,
    ) -> Result<Group, Error>;

    /// List memberships of the group.
    async fn list_memberships(&self, access: &GroupAccess) -> Result<Vec<Membership>, Error>;

    /// Grant a user a role. Requires `manage_memberships`.
    async fn add_membership(
        &self,
        access: &GroupAccess,
        user_id: UserId,
        role: GroupRole,
    ) -> Result<Membership, Error>;

    /// Change a user's role. The last admin cannot be demoted.
    async fn update_membership_role(
        &self,
        access: &GroupAccess,
        user_id: UserId,
        role: GroupRole,
    ) -> Result<Membership, Error>;

    /// Revoke a membership. The last admin cannot be removed.
    async fn remove_membership(&self, access: &GroupAccess, user_id: UserId) -> Result<(), Error>;
}

/// Member register of a group.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// Register a member. `join_date` defaults to today.
    async fn create_member(
        &self,
        access: &GroupAccess,
        details: MemberDetails,
        join_date: Option<NaiveDate>,
    ) -> Result<Member, Error>;

    /// Fetch a member.
    async fn get_member(&self, access: &GroupAccess, member_id: MemberId) -> Result<Member, Error>;

    /// List members of the group.
    async fn list_members(&self, access: &GroupAccess) -> Result<Vec<Member>, Error>;

    /// Replace contact fields and status.
    async fn update_member(
        &self,
        access: &GroupAccess,
        member_id: MemberId,
        update: MemberUpdate,
    ) -> Result<Member, Error>;

    /// Delete a member without ledger history.
    async fn remove_member(&self, access: &GroupAccess, member_id: MemberId) -> Result<(), Error>;
}
