//! Resolve the caller and their group authority for a request.
//!
//! Every group-scoped handler starts here: the session user becomes an
//! [`Actor`], and the `{groupId}` path segment becomes a [`GroupAccess`].
//! Groups the caller cannot see surface as `404`, not `403`.

use crate::domain::{Actor, Error, GroupAccess, GroupId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_id, FieldName};

pub(crate) const GROUP_ID: FieldName = FieldName::new("groupId");

/// Resolve the authenticated caller.
pub(crate) async fn actor(state: &HttpState, session: &SessionContext) -> Result<Actor, Error> {
    let user_id = session.require_user()?;
    state.access.actor(&user_id).await
}

/// Resolve the caller's access to the group named by a raw path segment.
pub(crate) async fn group_access(
    state: &HttpState,
    session: &SessionContext,
    raw_group_id: &str,
) -> Result<GroupAccess, Error> {
    let actor = actor(state, session).await?;
    let group_id: GroupId = parse_id(raw_group_id, GROUP_ID)?;
    state.access.group_access(&actor, &group_id).await
}
