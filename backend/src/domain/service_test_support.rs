//! Fixtures shared by the service unit tests.

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{
    LedgerStore, MockGroupRepository, MockLoanRepository, MockMemberRepository,
    MockMembershipRepository, MockPenaltyRepository, MockProfileRepository,
    MockRepaymentRepository, MockSavingsRepository, MockSettingsRepository,
    MockSocialFundRepository,
};
use crate::domain::{
    Actor, Group, GroupAccess, GroupId, GroupProfile, GroupRole, GroupStatus, Member,
    MemberDetails, MemberStatus, PlatformRole, UserId,
};
use crate::test_support::MutableClock;

/// One mock per repository port; unset expectations panic when called.
#[derive(Default)]
pub(crate) struct MockStore {
    pub(crate) groups: MockGroupRepository,
    pub(crate) memberships: MockMembershipRepository,
    pub(crate) profiles: MockProfileRepository,
    pub(crate) members: MockMemberRepository,
    pub(crate) savings: MockSavingsRepository,
    pub(crate) loans: MockLoanRepository,
    pub(crate) repayments: MockRepaymentRepository,
    pub(crate) social_fund: MockSocialFundRepository,
    pub(crate) penalties: MockPenaltyRepository,
    pub(crate) settings: MockSettingsRepository,
}

impl MockStore {
    /// Settings repository that reports no stored rows.
    pub(crate) fn with_default_settings(mut self) -> Self {
        self.settings.expect_list().returning(|_| Ok(Vec::new()));
        self
    }

    pub(crate) fn into_store(self) -> LedgerStore {
        LedgerStore {
            groups: Arc::new(self.groups),
            memberships: Arc::new(self.memberships),
            profiles: Arc::new(self.profiles),
            members: Arc::new(self.members),
            savings: Arc::new(self.savings),
            loans: Arc::new(self.loans),
            repayments: Arc::new(self.repayments),
            social_fund: Arc::new(self.social_fund),
            penalties: Arc::new(self.penalties),
            settings: Arc::new(self.settings),
        }
    }
}

pub(crate) fn fixture_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid fixture date")
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    let now = Utc
        .with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp");
    Arc::new(MutableClock::new(now))
}

pub(crate) fn group(status: GroupStatus) -> Group {
    let mut group = GroupProfile::new("Umoja Savings", None, Some("Kisumu".to_owned()))
        .expect("valid profile")
        .into_pending_group(UserId::random(), Utc::now());
    group.status = status;
    group
}

/// Access for a fresh user holding `role` in an active group.
pub(crate) fn access(role: GroupRole) -> GroupAccess {
    access_in(&group(GroupStatus::Active), role)
}

pub(crate) fn access_in(group: &Group, role: GroupRole) -> GroupAccess {
    GroupAccess::resolve(Actor::new(UserId::random(), PlatformRole::User), group, Some(role))
        .expect("members can view their group")
}

pub(crate) fn member(group_id: GroupId, status: MemberStatus) -> Member {
    MemberDetails::new("Akinyi Odhiambo", None, None, None, None)
        .expect("valid details")
        .into_member(group_id, status, fixture_today(), Utc::now())
}
