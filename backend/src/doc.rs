//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api/v1` handler, the health probes, the
//! request DTOs and the schema wrappers from
//! [`crate::inbound::http::schemas`], which describe domain types without
//! making the domain depend on utoipa.
//!
//! The document backs Swagger UI in debug builds and is exported by
//! `cargo run --bin openapi-dump`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::groups::{GroupRequest, MeResponse, PlatformRoleRequest, ReviewRequest};
use crate::inbound::http::loans::{DisburseRequest, LoanRequest};
use crate::inbound::http::members::MemberRequest;
use crate::inbound::http::memberships::{MembershipRequest, RoleRequest};
use crate::inbound::http::penalties::PenaltyRequest;
use crate::inbound::http::repayments::RepaymentRequest;
use crate::inbound::http::savings::{SavingRequest, SavingStatusRequest};
use crate::inbound::http::schemas::{
    EffectiveSettingSchema, ErrorCodeSchema, ErrorSchema, GroupDashboardSchema, GroupSchema,
    LoanApplicationSchema, LoanEligibilitySchema, LoanSchema, LoanViewSchema, MemberSchema,
    MemberSummarySchema, MembershipSchema, MonthlyTotalsSchema, PenaltySchema,
    ReconciliationReportSchema,
    RepaymentSchema, SavingSchema, SocialFundOverviewSchema, SocialFundTransactionSchema,
    UserProfileSchema,
};
use crate::inbound::http::settings::SettingRequest;
use crate::inbound::http::social_fund::SocialFundRequest;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Signed session cookie carrying the authenticated user id.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Village bank API",
        description = "Group savings, loans, social fund and penalty ledgers for village banks.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::groups::me,
        crate::inbound::http::groups::list_groups,
        crate::inbound::http::groups::create_group,
        crate::inbound::http::groups::get_group,
        crate::inbound::http::groups::update_group,
        crate::inbound::http::groups::review_group,
        crate::inbound::http::groups::list_users,
        crate::inbound::http::groups::set_platform_role,
        crate::inbound::http::memberships::list_memberships,
        crate::inbound::http::memberships::add_membership,
        crate::inbound::http::memberships::update_membership_role,
        crate::inbound::http::memberships::remove_membership,
        crate::inbound::http::members::list_members,
        crate::inbound::http::members::create_member,
        crate::inbound::http::members::get_member,
        crate::inbound::http::members::update_member,
        crate::inbound::http::members::remove_member,
        crate::inbound::http::members::member_summary,
        crate::inbound::http::members::eligibility,
        crate::inbound::http::savings::list_savings,
        crate::inbound::http::savings::record_deposit,
        crate::inbound::http::savings::update_saving_status,
        crate::inbound::http::loans::list_loans,
        crate::inbound::http::loans::create_loan,
        crate::inbound::http::loans::get_loan,
        crate::inbound::http::loans::approve_loan,
        crate::inbound::http::loans::reject_loan,
        crate::inbound::http::loans::disburse_loan,
        crate::inbound::http::loans::complete_loan,
        crate::inbound::http::loans::default_loan,
        crate::inbound::http::repayments::list_repayments,
        crate::inbound::http::repayments::record_repayment,
        crate::inbound::http::social_fund::social_fund,
        crate::inbound::http::social_fund::contribute,
        crate::inbound::http::social_fund::request_withdrawal,
        crate::inbound::http::social_fund::approve_withdrawal,
        crate::inbound::http::social_fund::reject_withdrawal,
        crate::inbound::http::penalties::list_penalties,
        crate::inbound::http::penalties::create_penalty,
        crate::inbound::http::penalties::pay_penalty,
        crate::inbound::http::penalties::waive_penalty,
        crate::inbound::http::settings::get_settings,
        crate::inbound::http::settings::update_setting,
        crate::inbound::http::reports::dashboard,
        crate::inbound::http::reports::monthly_totals,
        crate::inbound::http::reports::reconciliation,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        GroupSchema,
        MembershipSchema,
        MemberSchema,
        SavingSchema,
        LoanSchema,
        LoanViewSchema,
        LoanEligibilitySchema,
        LoanApplicationSchema,
        RepaymentSchema,
        SocialFundTransactionSchema,
        SocialFundOverviewSchema,
        PenaltySchema,
        EffectiveSettingSchema,
        MemberSummarySchema,
        GroupDashboardSchema,
        MonthlyTotalsSchema,
        ReconciliationReportSchema,
        UserProfileSchema,
        MeResponse,
        GroupRequest,
        ReviewRequest,
        PlatformRoleRequest,
        MembershipRequest,
        RoleRequest,
        MemberRequest,
        SavingRequest,
        SavingStatusRequest,
        LoanRequest,
        DisburseRequest,
        RepaymentRequest,
        SocialFundRequest,
        PenaltyRequest,
        SettingRequest,
    )),
    tags(
        (name = "users", description = "The authenticated caller"),
        (name = "groups", description = "Village bank groups"),
        (name = "admin", description = "Platform administration"),
        (name = "memberships", description = "Group roles of platform users"),
        (name = "members", description = "Member directory of a group"),
        (name = "savings", description = "Savings deposits"),
        (name = "loans", description = "Loan lifecycle"),
        (name = "repayments", description = "Loan repayments"),
        (name = "social-fund", description = "Social fund contributions and withdrawals"),
        (name = "penalties", description = "Penalty ledger"),
        (name = "settings", description = "Group policy settings"),
        (name = "reports", description = "Dashboards and reconciliation"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
