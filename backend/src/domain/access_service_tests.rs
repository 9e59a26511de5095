//! Tests for the access control service.

use std::sync::Arc;

use chrono::Utc;
use rstest::rstest;

use super::*;
use crate::domain::ports::{MockGroupRepository, MockMembershipRepository, MockProfileRepository};
use crate::domain::{ErrorCode, GroupRole, GroupStatus, Membership};
use crate::domain::service_test_support::group;

fn make_service(
    groups: MockGroupRepository,
    memberships: MockMembershipRepository,
    profiles: MockProfileRepository,
) -> AccessService {
    AccessService::new(Arc::new(groups), Arc::new(memberships), Arc::new(profiles))
}

#[tokio::test]
async fn actor_defaults_to_platform_user() {
    let mut profiles = MockProfileRepository::new();
    profiles
        .expect_platform_role()
        .times(1)
        .return_once(|_| Ok(PlatformRole::User));
    let service = make_service(MockGroupRepository::new(), MockMembershipRepository::new(), profiles);

    let user_id = UserId::random();
    let actor = service.actor(&user_id).await.expect("actor resolves");
    assert_eq!(actor.user_id(), &user_id);
    assert_eq!(actor.platform_role(), PlatformRole::User);
}

#[rstest]
#[case(GroupRole::Member, false)]
#[case(GroupRole::Treasurer, true)]
#[case(GroupRole::Admin, true)]
#[tokio::test]
async fn members_receive_role_capabilities(#[case] role: GroupRole, #[case] can_approve: bool) {
    let target = group(GroupStatus::Active);
    let group_id = target.id;
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find()
        .times(1)
        .return_once(move |_| Ok(Some(target)));
    let mut memberships = MockMembershipRepository::new();
    memberships.expect_find().times(1).return_once(move |gid, uid| {
        Ok(Some(Membership {
            group_id: *gid,
            user_id: *uid,
            role,
            created_at: Utc::now(),
        }))
    });
    let service = make_service(groups, memberships, MockProfileRepository::new());

    let actor = Actor::new(UserId::random(), PlatformRole::User);
    let access = service
        .group_access(&actor, &group_id)
        .await
        .expect("member sees group");
    assert_eq!(access.role(), Some(role));
    assert_eq!(access.has(Capability::ApproveLoans), can_approve);
}

#[tokio::test]
async fn outsiders_get_not_found() {
    let target = group(GroupStatus::Active);
    let group_id = target.id;
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find()
        .times(1)
        .return_once(move |_| Ok(Some(target)));
    let mut memberships = MockMembershipRepository::new();
    memberships.expect_find().times(1).return_once(|_, _| Ok(None));
    let service = make_service(groups, memberships, MockProfileRepository::new());

    let actor = Actor::new(UserId::random(), PlatformRole::User);
    let error = service
        .group_access(&actor, &group_id)
        .await
        .expect_err("outsider is hidden");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn super_admins_view_groups_without_membership() {
    let target = group(GroupStatus::Pending);
    let group_id = target.id;
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find()
        .times(1)
        .return_once(move |_| Ok(Some(target)));
    let mut memberships = MockMembershipRepository::new();
    memberships.expect_find().times(1).return_once(|_, _| Ok(None));
    let service = make_service(groups, memberships, MockProfileRepository::new());

    let actor = Actor::new(UserId::random(), PlatformRole::SuperAdmin);
    let access = service
        .group_access(&actor, &group_id)
        .await
        .expect("super admin sees group");
    assert!(access.has(Capability::ViewGroup));
    assert!(!access.has(Capability::ApproveLoans));
}

#[tokio::test]
async fn platform_role_changes_need_capability() {
    let service = make_service(
        MockGroupRepository::new(),
        MockMembershipRepository::new(),
        MockProfileRepository::new(),
    );
    let actor = Actor::new(UserId::random(), PlatformRole::User);
    let error = service
        .set_platform_role(&actor, &UserId::random(), PlatformRole::SuperAdmin)
        .await
        .expect_err("plain users cannot promote");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[case(PlatformRole::User, false)]
#[case(PlatformRole::SuperAdmin, true)]
#[tokio::test]
async fn profile_listing_is_for_platform_admins(#[case] role: PlatformRole, #[case] allowed: bool) {
    let admin = UserProfile {
        user_id: UserId::random(),
        platform_role: PlatformRole::SuperAdmin,
    };
    let mut profiles = MockProfileRepository::new();
    profiles
        .expect_list()
        .times(usize::from(allowed))
        .return_once(move || Ok(vec![admin]));
    let service = make_service(MockGroupRepository::new(), MockMembershipRepository::new(), profiles);

    let result = service
        .list_profiles(&Actor::new(UserId::random(), role))
        .await;
    if allowed {
        assert_eq!(result.expect("listed"), vec![admin]);
    } else {
        assert_eq!(result.expect_err("forbidden").code(), ErrorCode::Forbidden);
    }
}
