//! Members: the financial subjects of a group.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::group::non_blank;
use super::string_enum::define_string_enum;
use super::{Error, GroupId, MemberId};

define_string_enum! {
    /// Standing of a member within the group.
    pub enum MemberStatus ("member status") {
        /// Participating normally.
        Active => "active",
        /// No longer participating.
        Inactive => "inactive",
        /// Barred from new activity.
        Suspended => "suspended",
    }
}

/// Beneficiary record owned by a group.
///
/// `group_id` is fixed at creation; updates never touch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Identifier.
    pub id: MemberId,
    /// Owning group.
    pub group_id: GroupId,
    /// Full name.
    pub full_name: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// National identity number.
    pub national_id: Option<String>,
    /// Postal or physical address.
    pub address: Option<String>,
    /// Standing in the group.
    pub status: MemberStatus,
    /// Date the member joined.
    pub join_date: NaiveDate,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Member {
    /// Whether the member may take part in new ledger activity.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }
}

/// Validated contact details for a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDetails {
    full_name: String,
    phone: Option<String>,
    email: Option<String>,
    national_id: Option<String>,
    address: Option<String>,
}

impl MemberDetails {
    /// Validate member details.
    ///
    /// # Errors
    /// Returns `InvalidRequest` for a blank name or an email without `@`.
    pub fn new(
        full_name: impl Into<String>,
        phone: Option<String>,
        email: Option<String>,
        national_id: Option<String>,
        address: Option<String>,
    ) -> Result<Self, Error> {
        let full_name = full_name.into().trim().to_owned();
        if full_name.is_empty() {
            return Err(Error::invalid_request("full name must not be empty"));
        }
        let email = non_blank(email);
        if email.as_deref().is_some_and(|value| !value.contains('@')) {
            return Err(Error::invalid_request("email must contain '@'"));
        }
        Ok(Self {
            full_name,
            phone: non_blank(phone),
            email,
            national_id: non_blank(national_id),
            address: non_blank(address),
        })
    }

    /// Create a new member record in `group_id`.
    #[must_use]
    pub fn into_member(
        self,
        group_id: GroupId,
        status: MemberStatus,
        join_date: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Member {
        Member {
            id: MemberId::random(),
            group_id,
            full_name: self.full_name,
            phone: self.phone,
            email: self.email,
            national_id: self.national_id,
            address: self.address,
            status,
            join_date,
            created_at,
        }
    }

    /// Full name.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Phone number.
    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// Email address.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// National identity number.
    #[must_use]
    pub fn national_id(&self) -> Option<&str> {
        self.national_id.as_deref()
    }

    /// Address.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }
}

/// Replacement of a member's mutable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberUpdate {
    /// New contact details.
    pub details: MemberDetails,
    /// New standing.
    pub status: MemberStatus,
}

impl MemberUpdate {
    /// Apply the update, leaving identity, group and join date untouched.
    pub fn apply_to(&self, member: &mut Member) {
        member.full_name.clone_from(&self.details.full_name);
        member.phone.clone_from(&self.details.phone);
        member.email.clone_from(&self.details.email);
        member.national_id.clone_from(&self.details.national_id);
        member.address.clone_from(&self.details.address);
        member.status = self.status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn details(name: &str) -> MemberDetails {
        MemberDetails::new(name, Some("0700 000 000".to_owned()), None, None, None)
            .expect("valid details")
    }

    #[rstest]
    fn rejects_malformed_email() {
        let result = MemberDetails::new("Achieng", None, Some("nope".to_owned()), None, None);
        assert!(result.is_err());
    }

    #[rstest]
    fn update_preserves_group_and_identity() {
        let group_id = GroupId::random();
        let join_date = NaiveDate::from_ymd_opt(2024, 1, 15).expect("date");
        let mut member =
            details("Achieng").into_member(group_id, MemberStatus::Active, join_date, Utc::now());
        let original_id = member.id;

        MemberUpdate {
            details: details("Achieng Otieno"),
            status: MemberStatus::Inactive,
        }
        .apply_to(&mut member);

        assert_eq!(member.id, original_id);
        assert_eq!(member.group_id, group_id);
        assert_eq!(member.join_date, join_date);
        assert_eq!(member.full_name, "Achieng Otieno");
        assert!(!member.is_active());
    }
}
