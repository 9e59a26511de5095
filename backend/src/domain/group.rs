//! Groups (tenants) and memberships.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::string_enum::define_string_enum;
use super::{Error, GroupId, GroupRole, UserId};

const MAX_NAME_LEN: usize = 120;

define_string_enum! {
    /// Approval status of a group.
    pub enum GroupStatus ("group status") {
        /// Awaiting super-admin review.
        Pending => "pending",
        /// Approved and operating.
        Active => "active",
        /// Temporarily frozen by a super admin.
        Suspended => "suspended",
        /// Review declined; terminal.
        Rejected => "rejected",
    }
}

define_string_enum! {
    /// Super-admin review decision.
    pub enum GroupReviewAction ("review action") {
        /// `pending → active`.
        Approve => "approve",
        /// `pending → rejected`.
        Reject => "reject",
        /// `active → suspended`.
        Suspend => "suspend",
        /// `suspended → active`.
        Reactivate => "reactivate",
    }
}

impl GroupReviewAction {
    /// Status the group must currently hold.
    #[must_use]
    pub const fn from_status(self) -> GroupStatus {
        match self {
            Self::Approve | Self::Reject => GroupStatus::Pending,
            Self::Suspend => GroupStatus::Active,
            Self::Reactivate => GroupStatus::Suspended,
        }
    }

    /// Status the group moves to.
    #[must_use]
    pub const fn to_status(self) -> GroupStatus {
        match self {
            Self::Approve | Self::Reactivate => GroupStatus::Active,
            Self::Reject => GroupStatus::Rejected,
            Self::Suspend => GroupStatus::Suspended,
        }
    }
}

/// A village bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Identifier.
    pub id: GroupId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Where the group meets.
    pub location: Option<String>,
    /// Approval status.
    pub status: GroupStatus,
    /// User who requested the group.
    pub created_by: UserId,
    /// Super admin who last reviewed the group.
    pub reviewed_by: Option<UserId>,
    /// When the last review happened.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Notes left by the reviewer.
    pub admin_notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Validated name, description and location of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupProfile {
    name: String,
    description: Option<String>,
    location: Option<String>,
}

impl GroupProfile {
    /// Validate group profile fields.
    ///
    /// # Errors
    /// Returns `InvalidRequest` when the name is blank or too long.
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        location: Option<String>,
    ) -> Result<Self, Error> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(Error::invalid_request("group name must not be empty"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(Error::invalid_request(format!(
                "group name must be at most {MAX_NAME_LEN} characters"
            )));
        }
        Ok(Self {
            name,
            description: non_blank(description),
            location: non_blank(location),
        })
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description, if given.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Location, if given.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Build a new pending group requested by `created_by`.
    #[must_use]
    pub fn into_pending_group(self, created_by: UserId, created_at: DateTime<Utc>) -> Group {
        Group {
            id: GroupId::random(),
            name: self.name,
            description: self.description,
            location: self.location,
            status: GroupStatus::Pending,
            created_by,
            reviewed_by: None,
            reviewed_at: None,
            admin_notes: None,
            created_at,
        }
    }
}

/// Outcome of a review, applied with a status compare-and-swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupReview {
    /// New status.
    pub status: GroupStatus,
    /// Reviewing super admin.
    pub reviewed_by: UserId,
    /// Review time.
    pub reviewed_at: DateTime<Utc>,
    /// Reviewer notes.
    pub admin_notes: Option<String>,
}

/// Grants a platform user a role in a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    /// Group the membership belongs to.
    pub group_id: GroupId,
    /// Platform user.
    pub user_id: UserId,
    /// Role within the group.
    pub role: GroupRole,
    /// When the membership was granted.
    pub created_at: DateTime<Utc>,
}

/// Trim optional text, mapping blank values to `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn profile_trims_and_drops_blank_fields() {
        let profile = GroupProfile::new("  Umoja  ", Some("  ".to_owned()), Some(" Kisumu ".to_owned()))
            .expect("valid profile");
        assert_eq!(profile.name(), "Umoja");
        assert_eq!(profile.description(), None);
        assert_eq!(profile.location(), Some("Kisumu"));
    }

    #[rstest]
    fn profile_rejects_blank_name() {
        let err = GroupProfile::new("   ", None, None).expect_err("blank name");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[case(GroupReviewAction::Approve, GroupStatus::Pending, GroupStatus::Active)]
    #[case(GroupReviewAction::Reject, GroupStatus::Pending, GroupStatus::Rejected)]
    #[case(GroupReviewAction::Suspend, GroupStatus::Active, GroupStatus::Suspended)]
    #[case(GroupReviewAction::Reactivate, GroupStatus::Suspended, GroupStatus::Active)]
    fn review_actions_map_statuses(
        #[case] action: GroupReviewAction,
        #[case] from: GroupStatus,
        #[case] to: GroupStatus,
    ) {
        assert_eq!(action.from_status(), from);
        assert_eq!(action.to_status(), to);
    }

    #[rstest]
    fn new_groups_start_pending() {
        let profile = GroupProfile::new("Umoja", None, None).expect("valid profile");
        let group = profile.into_pending_group(UserId::random(), Utc::now());
        assert_eq!(group.status, GroupStatus::Pending);
        assert!(group.reviewed_by.is_none());
    }
}
