//! Group-scoped roles and the capabilities they grant.
//!
//! Capability derivation is a single pure function over tagged role types.
//! Services never compare role strings; they ask a [`GroupAccess`] whether a
//! [`Capability`] is present and fail closed when it is not.

use std::fmt;

use serde::Serialize;
use serde_json::json;

use super::string_enum::define_string_enum;
use super::{Error, Group, GroupId, GroupStatus, UserId};

define_string_enum! {
    /// Role held by a platform user within one group.
    pub enum GroupRole ("role") {
        /// Ordinary participant.
        Member => "member",
        /// Keeps the books; same authority as an admin.
        Treasurer => "treasurer",
        /// Group administrator.
        Admin => "admin",
    }
}

define_string_enum! {
    /// Platform-wide role, orthogonal to group membership.
    pub enum PlatformRole ("platform role") {
        /// Regular platform user.
        User => "user",
        /// Operator who reviews groups and manages platform roles.
        SuperAdmin => "super_admin",
    }
}

define_string_enum! {
    /// Atomic permission checked before an operation runs.
    pub enum Capability ("capability") {
        /// Read group data, ledgers and summaries.
        ViewGroup => "view_group",
        /// Submit a loan request.
        RequestLoan => "request_loan",
        /// Self-service savings deposit, subject to group policy.
        DepositSavings => "deposit_savings",
        /// Contribute to the social fund.
        ContributeSocialFund => "contribute_social_fund",
        /// Ask for a social fund withdrawal.
        RequestWithdrawal => "request_withdrawal",
        /// Umbrella capability held by treasurers and admins.
        ManageGroup => "manage_group",
        /// Approve or reject pending loans.
        ApproveLoans => "approve_loans",
        /// Disburse approved loans.
        DisburseLoans => "disburse_loans",
        /// Close repaying loans as completed or defaulted.
        ManageLoans => "manage_loans",
        /// Record repayments against loans.
        RecordRepayments => "record_repayments",
        /// Record and confirm savings deposits.
        RecordSavings => "record_savings",
        /// Approve or reject social fund withdrawals.
        ApproveWithdrawals => "approve_withdrawals",
        /// Create, settle and waive penalties.
        ManagePenalties => "manage_penalties",
        /// Edit group settings.
        ManageSettings => "manage_settings",
        /// Maintain the member register.
        ManageMembers => "manage_members",
        /// Grant, change and revoke memberships.
        ManageMemberships => "manage_memberships",
        /// Approve, reject, suspend or reactivate groups.
        ReviewGroups => "review_groups",
        /// Change platform roles of users.
        ManagePlatformRoles => "manage_platform_roles",
    }
}

impl Capability {
    const fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

/// Enumerable set of capabilities.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct CapabilitySet(u32);

impl CapabilitySet {
    /// The empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Build a set from a slice of capabilities.
    #[must_use]
    pub fn of(capabilities: &[Capability]) -> Self {
        capabilities
            .iter()
            .fold(Self::empty(), |set, capability| set.with(*capability))
    }

    /// Return a copy with `capability` added.
    #[must_use]
    pub const fn with(self, capability: Capability) -> Self {
        Self(self.0 | capability.bit())
    }

    /// Union of two sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether `capability` is present.
    #[must_use]
    pub const fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    /// Whether the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate over the contained capabilities in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL
            .iter()
            .copied()
            .filter(move |capability| self.contains(*capability))
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Serialize for CapabilitySet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

const MEMBER_CAPABILITIES: &[Capability] = &[
    Capability::ViewGroup,
    Capability::RequestLoan,
    Capability::DepositSavings,
    Capability::ContributeSocialFund,
    Capability::RequestWithdrawal,
];

const MANAGER_CAPABILITIES: &[Capability] = &[
    Capability::ManageGroup,
    Capability::ApproveLoans,
    Capability::DisburseLoans,
    Capability::ManageLoans,
    Capability::RecordRepayments,
    Capability::RecordSavings,
    Capability::ApproveWithdrawals,
    Capability::ManagePenalties,
    Capability::ManageSettings,
    Capability::ManageMembers,
    Capability::ManageMemberships,
];

const SUPER_ADMIN_CAPABILITIES: &[Capability] = &[
    Capability::ViewGroup,
    Capability::ReviewGroups,
    Capability::ManagePlatformRoles,
];

/// Derive the capability set for a caller.
///
/// `role` is the caller's membership role in the group under consideration,
/// or `None` when there is no membership (or no group, for platform-level
/// operations).
///
/// # Examples
/// ```
/// use village_bank::domain::{capabilities, Capability, GroupRole, PlatformRole};
///
/// let member = capabilities(Some(GroupRole::Member), PlatformRole::User);
/// assert!(member.contains(Capability::RequestLoan));
/// assert!(!member.contains(Capability::ApproveLoans));
///
/// let treasurer = capabilities(Some(GroupRole::Treasurer), PlatformRole::User);
/// assert!(treasurer.contains(Capability::ApproveLoans));
/// ```
#[must_use]
pub fn capabilities(role: Option<GroupRole>, platform_role: PlatformRole) -> CapabilitySet {
    let group = match role {
        None => CapabilitySet::empty(),
        Some(GroupRole::Member) => CapabilitySet::of(MEMBER_CAPABILITIES),
        Some(GroupRole::Treasurer | GroupRole::Admin) => {
            CapabilitySet::of(MEMBER_CAPABILITIES).union(CapabilitySet::of(MANAGER_CAPABILITIES))
        }
    };
    let platform = match platform_role {
        PlatformRole::User => CapabilitySet::empty(),
        PlatformRole::SuperAdmin => CapabilitySet::of(SUPER_ADMIN_CAPABILITIES),
    };
    group.union(platform)
}

fn missing_capability(capability: Capability) -> Error {
    Error::forbidden(format!("{capability} capability required")).with_details(json!({
        "capability": capability.as_str(),
        "code": "missing_capability",
    }))
}

/// A user holding a stored platform role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// The user.
    pub user_id: UserId,
    /// Their platform role.
    pub platform_role: PlatformRole,
}

/// Authenticated caller resolved from the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    user_id: UserId,
    platform_role: PlatformRole,
}

impl Actor {
    /// Construct an actor.
    #[must_use]
    pub const fn new(user_id: UserId, platform_role: PlatformRole) -> Self {
        Self {
            user_id,
            platform_role,
        }
    }

    /// Platform user id.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Platform role.
    #[must_use]
    pub const fn platform_role(&self) -> PlatformRole {
        self.platform_role
    }

    /// Capabilities that do not depend on any group.
    #[must_use]
    pub fn platform_capabilities(&self) -> CapabilitySet {
        capabilities(None, self.platform_role)
    }

    /// Fail with `Forbidden` unless the platform role grants `capability`.
    ///
    /// # Errors
    /// Returns [`Error::forbidden`] when the capability is absent.
    pub fn require(&self, capability: Capability) -> Result<(), Error> {
        if self.platform_capabilities().contains(capability) {
            Ok(())
        } else {
            Err(missing_capability(capability))
        }
    }
}

/// An actor's resolved authority within one group.
///
/// Every group-scoped service call receives this value; it is the only
/// source of authorisation facts for the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupAccess {
    actor: Actor,
    group_id: GroupId,
    group_status: GroupStatus,
    role: Option<GroupRole>,
    capabilities: CapabilitySet,
}

impl GroupAccess {
    /// Resolve access for `actor` in `group` given their membership role.
    ///
    /// Returns `None` when the actor can see nothing in the group, which
    /// callers surface as `NotFound` so tenant existence does not leak.
    #[must_use]
    pub fn resolve(actor: Actor, group: &Group, role: Option<GroupRole>) -> Option<Self> {
        let capabilities = capabilities(role, actor.platform_role());
        if !capabilities.contains(Capability::ViewGroup) {
            return None;
        }
        Some(Self {
            actor,
            group_id: group.id,
            group_status: group.status,
            role,
            capabilities,
        })
    }

    /// Access used by operator tooling (the reconciliation job). Grants the
    /// manager capability set on `group` without a membership.
    #[must_use]
    pub fn operator(actor: Actor, group: &Group) -> Self {
        Self {
            actor,
            group_id: group.id,
            group_status: group.status,
            role: None,
            capabilities: CapabilitySet::of(MEMBER_CAPABILITIES)
                .union(CapabilitySet::of(MANAGER_CAPABILITIES)),
        }
    }

    /// Calling actor.
    #[must_use]
    pub const fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Calling user id.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        self.actor.user_id()
    }

    /// Group the access applies to.
    #[must_use]
    pub const fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    /// Group status at resolution time.
    #[must_use]
    pub const fn group_status(&self) -> GroupStatus {
        self.group_status
    }

    /// Membership role, if any.
    #[must_use]
    pub const fn role(&self) -> Option<GroupRole> {
        self.role
    }

    /// Effective capabilities.
    #[must_use]
    pub const fn capabilities(&self) -> CapabilitySet {
        self.capabilities
    }

    /// Whether `capability` is granted.
    #[must_use]
    pub const fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(capability)
    }

    /// Fail with `Forbidden` unless `capability` is granted.
    ///
    /// # Errors
    /// Returns [`Error::forbidden`] when the capability is absent.
    pub fn require(&self, capability: Capability) -> Result<(), Error> {
        if self.has(capability) {
            Ok(())
        } else {
            Err(missing_capability(capability))
        }
    }

    /// Fail unless the group is active; ledgers are frozen otherwise.
    ///
    /// # Errors
    /// Returns [`Error::invalid_transition`] for pending, suspended or
    /// rejected groups.
    pub fn require_active(&self) -> Result<(), Error> {
        if self.group_status == GroupStatus::Active {
            return Ok(());
        }
        Err(
            Error::invalid_transition(format!("group is {}", self.group_status)).with_details(
                json!({
                    "entity": "group",
                    "status": self.group_status.as_str(),
                    "code": "group_not_active",
                }),
            ),
        )
    }

    /// Combined guard for ledger mutations: active group plus capability.
    ///
    /// # Errors
    /// Propagates [`Self::require`] and [`Self::require_active`] failures.
    pub fn require_mutation(&self, capability: Capability) -> Result<(), Error> {
        self.require(capability)?;
        self.require_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use chrono::Utc;
    use rstest::{fixture, rstest};

    #[fixture]
    fn active_group() -> Group {
        Group {
            id: GroupId::random(),
            name: "Umoja".to_owned(),
            description: None,
            location: None,
            status: GroupStatus::Active,
            created_by: UserId::random(),
            reviewed_by: None,
            reviewed_at: None,
            admin_notes: None,
            created_at: Utc::now(),
        }
    }

    fn actor(platform_role: PlatformRole) -> Actor {
        Actor::new(UserId::random(), platform_role)
    }

    #[rstest]
    #[case(GroupRole::Member, false)]
    #[case(GroupRole::Treasurer, true)]
    #[case(GroupRole::Admin, true)]
    fn manage_group_follows_role(#[case] role: GroupRole, #[case] expected: bool) {
        let set = capabilities(Some(role), PlatformRole::User);
        assert_eq!(set.contains(Capability::ManageGroup), expected);
        assert_eq!(set.contains(Capability::ApproveWithdrawals), expected);
        assert!(set.contains(Capability::ViewGroup));
    }

    #[rstest]
    fn no_membership_grants_nothing() {
        assert!(capabilities(None, PlatformRole::User).is_empty());
    }

    #[rstest]
    fn super_admin_is_independent_of_membership() {
        let set = capabilities(None, PlatformRole::SuperAdmin);
        assert!(set.contains(Capability::ReviewGroups));
        assert!(set.contains(Capability::ManagePlatformRoles));
        assert!(set.contains(Capability::ViewGroup));
        assert!(!set.contains(Capability::ApproveLoans));
    }

    #[rstest]
    fn resolve_hides_groups_from_outsiders(active_group: Group) {
        assert!(GroupAccess::resolve(actor(PlatformRole::User), &active_group, None).is_none());
    }

    #[rstest]
    fn require_fails_closed(active_group: Group) {
        let access =
            GroupAccess::resolve(actor(PlatformRole::User), &active_group, Some(GroupRole::Member))
                .expect("member can view");
        let err = access
            .require(Capability::ApproveLoans)
            .expect_err("members cannot approve");
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert!(access.require(Capability::RequestLoan).is_ok());
    }

    #[rstest]
    fn require_active_rejects_pending_groups(mut active_group: Group) {
        active_group.status = GroupStatus::Pending;
        let access =
            GroupAccess::resolve(actor(PlatformRole::User), &active_group, Some(GroupRole::Admin))
                .expect("admin can view");
        let err = access
            .require_mutation(Capability::RecordSavings)
            .expect_err("pending groups are frozen");
        assert_eq!(err.code(), ErrorCode::InvalidTransition);
    }

    #[rstest]
    fn capability_set_serialises_as_list() {
        let set = CapabilitySet::of(&[Capability::ViewGroup, Capability::ManageSettings]);
        let json = serde_json::to_value(set).expect("serialise");
        assert_eq!(json, serde_json::json!(["view_group", "manage_settings"]));
    }
}
