//! Group settings handlers.
//!
//! ```text
//! GET /api/v1/groups/{groupId}/settings
//! PUT /api/v1/groups/{groupId}/settings/{key}
//! ```

use actix_web::{get, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{EffectiveSetting, SettingKey};
use crate::inbound::http::access::group_access;
use crate::inbound::http::schemas::{EffectiveSettingSchema, ErrorSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_value, require, FieldName};
use crate::inbound::http::ApiResult;

const KEY: FieldName = FieldName::new("key");
const VALUE: FieldName = FieldName::new("value");

/// New value for one setting, always sent as a string.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingRequest {
    #[schema(example = "12.5")]
    pub value: Option<String>,
}

/// Every setting with the value in force.
#[utoipa::path(
    get,
    path = "/api/v1/groups/{groupId}/settings",
    params(("groupId" = String, Path, description = "Group id")),
    responses(
        (status = 200, description = "Effective settings", body = [EffectiveSettingSchema]),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["settings"],
    operation_id = "getSettings"
)]
#[get("/groups/{groupId}/settings")]
pub async fn get_settings(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<EffectiveSetting>>> {
    let access = group_access(&state, &session, &path).await?;
    Ok(web::Json(state.settings.get_settings(&access).await?))
}

/// Validate and store one setting.
#[utoipa::path(
    put,
    path = "/api/v1/groups/{groupId}/settings/{key}",
    params(
        ("groupId" = String, Path, description = "Group id"),
        ("key" = String, Path, description = "Setting key, such as `interest_rate`")
    ),
    request_body = SettingRequest,
    responses(
        (status = 200, description = "Stored setting", body = EffectiveSettingSchema),
        (status = 400, description = "Invalid key or value", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["settings"],
    operation_id = "updateSetting"
)]
#[put("/groups/{groupId}/settings/{key}")]
pub async fn update_setting(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
    payload: web::Json<SettingRequest>,
) -> ApiResult<web::Json<EffectiveSetting>> {
    let (group_id, key) = path.into_inner();
    let access = group_access(&state, &session, &group_id).await?;
    let key: SettingKey = parse_value(&key, KEY)?;
    let value = require(payload.into_inner().value, VALUE)?;
    Ok(web::Json(
        state.settings.update_setting(&access, key, value).await?,
    ))
}
