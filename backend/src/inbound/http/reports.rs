//! Group-level ledger reports.
//!
//! ```text
//! GET /api/v1/groups/{groupId}/dashboard
//! GET /api/v1/groups/{groupId}/reports/monthly
//! GET /api/v1/groups/{groupId}/reconciliation
//! ```

use actix_web::{get, web, HttpResponse};

use crate::domain::{GroupDashboard, MonthlyTotals};
use crate::inbound::http::access::group_access;
use crate::inbound::http::schemas::{
    ErrorSchema, GroupDashboardSchema, MonthlyTotalsSchema, ReconciliationReportSchema,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Group totals recomputed from the ledgers.
#[utoipa::path(
    get,
    path = "/api/v1/groups/{groupId}/dashboard",
    params(("groupId" = String, Path, description = "Group id")),
    responses(
        (status = 200, description = "Dashboard", body = GroupDashboardSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "getDashboard"
)]
#[get("/groups/{groupId}/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<GroupDashboard>> {
    let access = group_access(&state, &session, &path).await?;
    Ok(web::Json(state.reports.dashboard(&access).await?))
}

/// Ledger activity per `YYYY-MM` bucket, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/groups/{groupId}/reports/monthly",
    params(("groupId" = String, Path, description = "Group id")),
    responses(
        (status = 200, description = "Monthly totals", body = [MonthlyTotalsSchema]),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "getMonthlyTotals"
)]
#[get("/groups/{groupId}/reports/monthly")]
pub async fn monthly_totals(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<MonthlyTotals>>> {
    let access = group_access(&state, &session, &path).await?;
    Ok(web::Json(state.reports.monthly_totals(&access).await?))
}

/// Consistency findings: overdrawn fund, loans above eligibility and
/// repaying loans already covered by repayments.
#[utoipa::path(
    get,
    path = "/api/v1/groups/{groupId}/reconciliation",
    params(("groupId" = String, Path, description = "Group id")),
    responses(
        (
            status = 200,
            description = "Reconciliation report",
            headers(("Cache-Control" = String, description = "Always no-store")),
            body = ReconciliationReportSchema
        ),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "getReconciliation"
)]
#[get("/groups/{groupId}/reconciliation")]
pub async fn reconciliation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let access = group_access(&state, &session, &path).await?;
    let report = state.reports.reconciliation(&access).await?;
    Ok(HttpResponse::Ok()
        .insert_header(("Cache-Control", "no-store"))
        .json(report))
}
