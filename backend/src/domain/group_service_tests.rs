//! Tests for the group registry service.

use std::sync::Arc;

use chrono::Utc;
use rstest::rstest;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::PlatformRole;
use crate::domain::ports::{MockGroupRepository, MockMembershipRepository};
use crate::domain::service_test_support::{access, fixture_clock, group};

fn make_service(groups: MockGroupRepository, memberships: MockMembershipRepository) -> GroupService {
    GroupService::new(Arc::new(groups), Arc::new(memberships), fixture_clock())
}

fn membership(access: &GroupAccess, user_id: UserId, role: GroupRole) -> Membership {
    Membership {
        group_id: *access.group_id(),
        user_id,
        role,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn create_group_starts_pending_with_admin_founder() {
    let mut groups = MockGroupRepository::new();
    groups
        .expect_create()
        .withf(|group, founder| {
            group.status == GroupStatus::Pending
                && founder.role == GroupRole::Admin
                && founder.group_id == group.id
                && founder.user_id == group.created_by
        })
        .times(1)
        .return_once(|_, _| Ok(()));
    let service = make_service(groups, MockMembershipRepository::new());

    let actor = Actor::new(UserId::random(), PlatformRole::User);
    let profile = GroupProfile::new("Umoja", None, None).expect("profile");
    let created = service.create_group(&actor, profile).await.expect("created");
    assert_eq!(created.created_by, *actor.user_id());
}

#[tokio::test]
async fn plain_users_list_only_their_groups() {
    let mine = group(GroupStatus::Active);
    let pending = group(GroupStatus::Pending);
    let mut groups = MockGroupRepository::new();
    groups
        .expect_list_for_user()
        .times(1)
        .return_once(move |_| Ok(vec![mine, pending]));
    groups.expect_list().never();
    let service = make_service(groups, MockMembershipRepository::new());

    let actor = Actor::new(UserId::random(), PlatformRole::User);
    let listed = service
        .list_groups(&actor, Some(GroupStatus::Active))
        .await
        .expect("listed");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, GroupStatus::Active);
}

#[rstest]
#[case(GroupReviewAction::Approve, GroupStatus::Pending, GroupStatus::Active)]
#[case(GroupReviewAction::Suspend, GroupStatus::Active, GroupStatus::Suspended)]
#[tokio::test]
async fn review_uses_status_compare_and_swap(
    #[case] action: GroupReviewAction,
    #[case] from: GroupStatus,
    #[case] to: GroupStatus,
) {
    let reviewed = {
        let mut group = group(to);
        group.admin_notes = Some("checked".to_owned());
        group
    };
    let group_id = reviewed.id;
    let mut groups = MockGroupRepository::new();
    groups
        .expect_review()
        .withf(move |_, expected, review| *expected == from && review.status == to)
        .times(1)
        .return_once(move |_, _, _| Ok(reviewed));
    let service = make_service(groups, MockMembershipRepository::new());

    let reviewer = Actor::new(UserId::random(), PlatformRole::SuperAdmin);
    let result = service
        .review_group(&reviewer, &group_id, action, Some(" checked ".to_owned()))
        .await
        .expect("review applied");
    assert_eq!(result.status, to);
}

#[tokio::test]
async fn reviewing_a_rejected_group_is_an_invalid_transition() {
    let mut groups = MockGroupRepository::new();
    groups.expect_review().times(1).return_once(|_, _, _| {
        Err(RepositoryError::status_mismatch("group", "pending", "rejected"))
    });
    let service = make_service(groups, MockMembershipRepository::new());

    let reviewer = Actor::new(UserId::random(), PlatformRole::SuperAdmin);
    let error = service
        .review_group(&reviewer, &GroupId::random(), GroupReviewAction::Approve, None)
        .await
        .expect_err("rejected is terminal");
    assert_eq!(error.code(), ErrorCode::InvalidTransition);
    let details = error.details().expect("details");
    assert_eq!(details["from"], "rejected");
    assert_eq!(details["to"], "active");
}

#[tokio::test]
async fn members_cannot_review_groups() {
    let service = make_service(MockGroupRepository::new(), MockMembershipRepository::new());
    let actor = Actor::new(UserId::random(), PlatformRole::User);
    let error = service
        .review_group(&actor, &GroupId::random(), GroupReviewAction::Approve, None)
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn duplicate_membership_is_a_conflict() {
    let mut memberships = MockMembershipRepository::new();
    memberships
        .expect_insert()
        .times(1)
        .return_once(|_| Err(RepositoryError::duplicate("group_memberships_pkey")));
    let service = make_service(MockGroupRepository::new(), memberships);

    let error = service
        .add_membership(&access(GroupRole::Admin), UserId::random(), GroupRole::Member)
        .await
        .expect_err("duplicate");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn last_admin_cannot_be_demoted() {
    let admin_access = access(GroupRole::Admin);
    let admin_id = *admin_access.user_id();
    let rows = vec![
        membership(&admin_access, admin_id, GroupRole::Admin),
        membership(&admin_access, UserId::random(), GroupRole::Member),
    ];
    let mut memberships = MockMembershipRepository::new();
    memberships
        .expect_list()
        .times(1)
        .return_once(move |_| Ok(rows));
    memberships.expect_update_role().never();
    let service = make_service(MockGroupRepository::new(), memberships);

    let error = service
        .update_membership_role(&admin_access, admin_id, GroupRole::Treasurer)
        .await
        .expect_err("last admin");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn second_admin_can_leave() {
    let admin_access = access(GroupRole::Admin);
    let other_admin = UserId::random();
    let rows = vec![
        membership(&admin_access, *admin_access.user_id(), GroupRole::Admin),
        membership(&admin_access, other_admin, GroupRole::Admin),
    ];
    let mut memberships = MockMembershipRepository::new();
    memberships
        .expect_list()
        .times(1)
        .return_once(move |_| Ok(rows));
    memberships
        .expect_delete()
        .withf(move |_, user_id| *user_id == other_admin)
        .times(1)
        .return_once(|_, _| Ok(()));
    let service = make_service(MockGroupRepository::new(), memberships);

    service
        .remove_membership(&admin_access, other_admin)
        .await
        .expect("removal allowed");
}

#[tokio::test]
async fn members_cannot_manage_memberships() {
    let service = make_service(MockGroupRepository::new(), MockMembershipRepository::new());
    let error = service
        .add_membership(&access(GroupRole::Member), UserId::random(), GroupRole::Member)
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}
