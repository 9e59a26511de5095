//! Group membership handlers.
//!
//! ```text
//! GET    /api/v1/groups/{groupId}/memberships
//! POST   /api/v1/groups/{groupId}/memberships
//! PUT    /api/v1/groups/{groupId}/memberships/{userId}
//! DELETE /api/v1/groups/{groupId}/memberships/{userId}
//! ```

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{GroupRole, Membership, UserId};
use crate::inbound::http::access::group_access;
use crate::inbound::http::schemas::{ErrorSchema, MembershipSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_id, parse_value, require, FieldName};
use crate::inbound::http::ApiResult;

const USER_ID: FieldName = FieldName::new("userId");
const ROLE: FieldName = FieldName::new("role");

/// Grant a platform user a role in the group.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRequest {
    #[schema(format = Uuid)]
    pub user_id: Option<String>,
    /// `member`, `treasurer` or `admin`.
    #[schema(example = "treasurer")]
    pub role: Option<String>,
}

/// Change the role of an existing membership.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleRequest {
    #[schema(example = "admin")]
    pub role: Option<String>,
}

fn parse_role(raw: Option<String>) -> Result<GroupRole, crate::domain::Error> {
    parse_value(&require(raw, ROLE)?, ROLE)
}

/// List the group's memberships.
#[utoipa::path(
    get,
    path = "/api/v1/groups/{groupId}/memberships",
    params(("groupId" = String, Path, description = "Group id")),
    responses(
        (status = 200, description = "Memberships", body = [MembershipSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["memberships"],
    operation_id = "listMemberships"
)]
#[get("/groups/{groupId}/memberships")]
pub async fn list_memberships(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<Membership>>> {
    let access = group_access(&state, &session, &path).await?;
    Ok(web::Json(state.groups.list_memberships(&access).await?))
}

/// Add a membership.
#[utoipa::path(
    post,
    path = "/api/v1/groups/{groupId}/memberships",
    params(("groupId" = String, Path, description = "Group id")),
    request_body = MembershipRequest,
    responses(
        (status = 201, description = "Membership added", body = MembershipSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 409, description = "Already a member", body = ErrorSchema)
    ),
    tags = ["memberships"],
    operation_id = "addMembership"
)]
#[post("/groups/{groupId}/memberships")]
pub async fn add_membership(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<MembershipRequest>,
) -> ApiResult<HttpResponse> {
    let access = group_access(&state, &session, &path).await?;
    let MembershipRequest { user_id, role } = payload.into_inner();
    let user_id: UserId = parse_id(&require(user_id, USER_ID)?, USER_ID)?;
    let role = parse_role(role)?;
    let membership = state.groups.add_membership(&access, user_id, role).await?;
    Ok(HttpResponse::Created().json(membership))
}

/// Change a member's role. The last admin cannot be demoted.
#[utoipa::path(
    put,
    path = "/api/v1/groups/{groupId}/memberships/{userId}",
    params(
        ("groupId" = String, Path, description = "Group id"),
        ("userId" = String, Path, description = "User id")
    ),
    request_body = RoleRequest,
    responses(
        (status = 200, description = "Updated membership", body = MembershipSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Last admin", body = ErrorSchema)
    ),
    tags = ["memberships"],
    operation_id = "updateMembershipRole"
)]
#[put("/groups/{groupId}/memberships/{userId}")]
pub async fn update_membership_role(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
    payload: web::Json<RoleRequest>,
) -> ApiResult<web::Json<Membership>> {
    let (group_id, user_id) = path.into_inner();
    let access = group_access(&state, &session, &group_id).await?;
    let user_id: UserId = parse_id(&user_id, USER_ID)?;
    let role = parse_role(payload.into_inner().role)?;
    let membership = state
        .groups
        .update_membership_role(&access, user_id, role)
        .await?;
    Ok(web::Json(membership))
}

/// Revoke a membership. The last admin cannot be removed.
#[utoipa::path(
    delete,
    path = "/api/v1/groups/{groupId}/memberships/{userId}",
    params(
        ("groupId" = String, Path, description = "Group id"),
        ("userId" = String, Path, description = "User id")
    ),
    responses(
        (status = 204, description = "Membership removed"),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Last admin", body = ErrorSchema)
    ),
    tags = ["memberships"],
    operation_id = "removeMembership"
)]
#[delete("/groups/{groupId}/memberships/{userId}")]
pub async fn remove_membership(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (group_id, user_id) = path.into_inner();
    let access = group_access(&state, &session, &group_id).await?;
    let user_id: UserId = parse_id(&user_id, USER_ID)?;
    state.groups.remove_membership(&access, user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
