//! Group, profile and platform administration handlers.
//!
//! ```text
//! GET  /api/v1/me
//! GET  /api/v1/groups?status=
//! POST /api/v1/groups
//! GET  /api/v1/groups/{groupId}
//! PUT  /api/v1/groups/{groupId}
//! POST /api/v1/admin/groups/{groupId}/review
//! GET  /api/v1/admin/users
//! PUT  /api/v1/admin/users/{userId}/platform-role
//! ```

use actix_web::{get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Error, Group, GroupId, GroupProfile, GroupReviewAction, GroupStatus, PlatformRole, UserId,
    UserProfile,
};
use crate::inbound::http::access::{actor, group_access, GROUP_ID};
use crate::inbound::http::schemas::{ErrorSchema, GroupSchema, UserProfileSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    parse_id, parse_optional_value, parse_value, require, FieldName,
};
use crate::inbound::http::ApiResult;

const NAME: FieldName = FieldName::new("name");
const ACTION: FieldName = FieldName::new("action");
const STATUS: FieldName = FieldName::new("status");
const USER_ID: FieldName = FieldName::new("userId");
const PLATFORM_ROLE: FieldName = FieldName::new("platformRole");

/// The signed-in caller.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    #[schema(format = Uuid)]
    pub user_id: String,
    #[schema(example = "user")]
    pub platform_role: String,
}

/// Group name, description and location.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupRequest {
    #[schema(example = "Umoja Women Group")]
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(example = "Kisumu")]
    pub location: Option<String>,
}

/// Super-admin review of a group.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    /// One of `approve`, `reject`, `suspend` or `reactivate`.
    #[schema(example = "approve")]
    pub action: Option<String>,
    pub notes: Option<String>,
}

/// New platform role for a user.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlatformRoleRequest {
    /// `user` or `super_admin`.
    #[schema(example = "super_admin")]
    pub platform_role: Option<String>,
}

/// Query string for listing groups.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct GroupListQuery {
    /// Filter by status; only honoured for super admins.
    pub status: Option<String>,
}

fn parse_profile(payload: GroupRequest) -> Result<GroupProfile, Error> {
    let name = require(payload.name, NAME)?;
    GroupProfile::new(name, payload.description, payload.location)
}

/// Fetch the caller's id and platform role.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Caller profile", body = MeResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getMe"
)]
#[get("/me")]
pub async fn me(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<MeResponse>> {
    let actor = actor(&state, &session).await?;
    Ok(web::Json(MeResponse {
        user_id: actor.user_id().to_string(),
        platform_role: actor.platform_role().to_string(),
    }))
}

/// List the groups visible to the caller.
#[utoipa::path(
    get,
    path = "/api/v1/groups",
    params(GroupListQuery),
    responses(
        (status = 200, description = "Groups", body = [GroupSchema]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["groups"],
    operation_id = "listGroups"
)]
#[get("/groups")]
pub async fn list_groups(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<GroupListQuery>,
) -> ApiResult<web::Json<Vec<Group>>> {
    let actor = actor(&state, &session).await?;
    let status: Option<GroupStatus> = parse_optional_value(query.status.as_deref(), STATUS)?;
    Ok(web::Json(state.groups.list_groups(&actor, status).await?))
}

/// Request a new group. It starts `pending` with the caller as admin.
#[utoipa::path(
    post,
    path = "/api/v1/groups",
    request_body = GroupRequest,
    responses(
        (status = 201, description = "Group requested", body = GroupSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["groups"],
    operation_id = "createGroup"
)]
#[post("/groups")]
pub async fn create_group(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<GroupRequest>,
) -> ApiResult<HttpResponse> {
    let actor = actor(&state, &session).await?;
    let profile = parse_profile(payload.into_inner())?;
    let group = state.groups.create_group(&actor, profile).await?;
    Ok(HttpResponse::Created().json(group))
}

/// Fetch a group.
#[utoipa::path(
    get,
    path = "/api/v1/groups/{groupId}",
    params(("groupId" = String, Path, description = "Group id")),
    responses(
        (status = 200, description = "Group", body = GroupSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["groups"],
    operation_id = "getGroup"
)]
#[get("/groups/{groupId}")]
pub async fn get_group(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Group>> {
    let access = group_access(&state, &session, &path).await?;
    Ok(web::Json(state.groups.get_group(&access).await?))
}

/// Edit a group's profile.
#[utoipa::path(
    put,
    path = "/api/v1/groups/{groupId}",
    params(("groupId" = String, Path, description = "Group id")),
    request_body = GroupRequest,
    responses(
        (status = 200, description = "Updated group", body = GroupSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["groups"],
    operation_id = "updateGroup"
)]
#[put("/groups/{groupId}")]
pub async fn update_group(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<GroupRequest>,
) -> ApiResult<web::Json<Group>> {
    let access = group_access(&state, &session, &path).await?;
    let profile = parse_profile(payload.into_inner())?;
    Ok(web::Json(state.groups.update_group(&access, profile).await?))
}

/// Approve, reject, suspend or reactivate a group.
#[utoipa::path(
    post,
    path = "/api/v1/admin/groups/{groupId}/review",
    params(("groupId" = String, Path, description = "Group id")),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Reviewed group", body = GroupSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Invalid transition", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "reviewGroup"
)]
#[post("/admin/groups/{groupId}/review")]
pub async fn review_group(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ReviewRequest>,
) -> ApiResult<web::Json<Group>> {
    let actor = actor(&state, &session).await?;
    let group_id: GroupId = parse_id(&path, GROUP_ID)?;
    let ReviewRequest { action, notes } = payload.into_inner();
    let action: GroupReviewAction = parse_value(&require(action, ACTION)?, ACTION)?;
    let group = state
        .groups
        .review_group(&actor, &group_id, action, notes)
        .await?;
    Ok(web::Json(group))
}

/// List users holding a stored platform role.
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    responses(
        (status = 200, description = "Profiles ordered by user id", body = [UserProfileSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listUsers"
)]
#[get("/admin/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<UserProfile>>> {
    let actor = actor(&state, &session).await?;
    Ok(web::Json(state.access.list_profiles(&actor).await?))
}

/// Change a user's platform role.
#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{userId}/platform-role",
    params(("userId" = String, Path, description = "User id")),
    request_body = PlatformRoleRequest,
    responses(
        (status = 204, description = "Role updated"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "setPlatformRole"
)]
#[put("/admin/users/{userId}/platform-role")]
pub async fn set_platform_role(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<PlatformRoleRequest>,
) -> ApiResult<HttpResponse> {
    let actor = actor(&state, &session).await?;
    let user_id: UserId = parse_id(&path, USER_ID)?;
    let raw = require(payload.into_inner().platform_role, PLATFORM_ROLE)?;
    let role: PlatformRole = parse_value(&raw, PLATFORM_ROLE)?;
    state
        .access
        .set_platform_role(&actor, &user_id, role)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "groups_tests.rs"]
mod tests;
