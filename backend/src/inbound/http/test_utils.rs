//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test as actix_test, web, App};

use crate::domain::ports::{GroupRepository, MemberRepository, MockAccessControl};
use crate::domain::service_test_support::{fixture_clock, group, member};
use crate::domain::{
    GroupAccess, GroupId, GroupRole, GroupStatus, Member, MemberStatus, Membership, UserId,
};
use crate::inbound::http::configure_extractors;
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::MemoryStore;
pub use crate::test_support::{login, session_cookie, test_session_middleware, LOGIN_PATH};

/// Production services over an empty in-memory store, frozen at the
/// fixture clock. Override individual ports with struct update syntax.
pub fn memory_state() -> HttpState {
    memory_state_over(&MemoryStore::new())
}

/// Like [`memory_state`] but over a store the test keeps a handle to.
pub fn memory_state_over(store: &MemoryStore) -> HttpState {
    HttpState::from_store(store.ledger_store(), fixture_clock())
}

/// Access control that grants `access` for any group lookup.
pub fn granting(access: &GroupAccess) -> Arc<MockAccessControl> {
    let mut mock = MockAccessControl::new();
    let actor = access.actor().clone();
    mock.expect_actor().returning(move |_| Ok(actor.clone()));
    let granted = access.clone();
    mock.expect_group_access()
        .returning(move |_, _| Ok(granted.clone()));
    Arc::new(mock)
}

/// Initialise a test app with sessions, extractor error mapping, the login
/// route and whatever `configure` registers, mounted at the root.
pub async fn init_app<F>(
    state: HttpState,
    configure: F,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>
where
    F: FnOnce(&mut web::ServiceConfig) + 'static,
{
    actix_test::init_service(
        App::new()
            .wrap(test_session_middleware())
            .app_data(web::Data::new(state))
            .configure(configure_extractors)
            .route(LOGIN_PATH, web::get().to(login))
            .configure(configure),
    )
    .await
}

/// Store an active group in which a fresh user holds `role`.
pub async fn seed_group(store: &MemoryStore, role: GroupRole) -> (GroupId, UserId) {
    let active = group(GroupStatus::Active);
    let user_id = UserId::random();
    let membership = Membership {
        group_id: active.id,
        user_id,
        role,
        created_at: active.created_at,
    };
    GroupRepository::create(store, &active, &membership)
        .await
        .expect("group stored");
    (active.id, user_id)
}

/// Store an active member in `group_id`.
pub async fn seed_member(store: &MemoryStore, group_id: GroupId) -> Member {
    let seeded = member(group_id, MemberStatus::Active);
    MemberRepository::insert(store, &seeded)
        .await
        .expect("member stored");
    seeded
}
