//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The wrappers mirror the JSON shape of their domain types: camelCase
//! fields, identifiers as UUID strings and money as decimal strings.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// No valid session.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but lacking the capability.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The resource does not exist or is outside the caller's groups.
    #[schema(rename = "not_found")]
    NotFound,
    /// The entity is not in a status that allows the change.
    #[schema(rename = "invalid_transition")]
    InvalidTransition,
    /// A uniqueness rule was violated.
    #[schema(rename = "conflict")]
    Conflict,
    /// The store is temporarily unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[serde(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_transition")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "loan status is approved, expected pending")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details, such as `{"entity","from","to"}`.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::Group`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Group)]
#[serde(rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct GroupSchema {
    #[schema(format = Uuid)]
    id: String,
    #[schema(example = "Umoja Women Group")]
    name: String,
    description: Option<String>,
    location: Option<String>,
    #[schema(example = "active")]
    status: String,
    #[schema(format = Uuid)]
    created_by: String,
    reviewed_by: Option<String>,
    #[schema(format = DateTime)]
    reviewed_at: Option<String>,
    admin_notes: Option<String>,
    #[schema(format = DateTime)]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::Membership`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Membership)]
#[serde(rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct MembershipSchema {
    #[schema(format = Uuid)]
    group_id: String,
    #[schema(format = Uuid)]
    user_id: String,
    #[schema(example = "treasurer")]
    role: String,
    #[schema(format = DateTime)]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::Member`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Member)]
#[serde(rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct MemberSchema {
    #[schema(format = Uuid)]
    id: String,
    #[schema(format = Uuid)]
    group_id: String,
    #[schema(example = "Achieng Otieno")]
    full_name: String,
    phone: Option<String>,
    email: Option<String>,
    national_id: Option<String>,
    address: Option<String>,
    #[schema(example = "active")]
    status: String,
    #[schema(format = Date)]
    join_date: String,
    #[schema(format = DateTime)]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::Saving`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Saving)]
#[serde(rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct SavingSchema {
    #[schema(format = Uuid)]
    id: String,
    #[schema(format = Uuid)]
    group_id: String,
    #[schema(format = Uuid)]
    member_id: String,
    #[schema(example = "500.00")]
    amount: String,
    #[schema(format = Date)]
    deposit_date: String,
    #[schema(example = "2025-03")]
    month_year: String,
    #[schema(example = "completed")]
    status: String,
    notes: Option<String>,
    #[schema(format = Uuid)]
    recorded_by: String,
    #[schema(format = DateTime)]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::Loan`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Loan)]
#[serde(rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct LoanSchema {
    #[schema(format = Uuid)]
    id: String,
    #[schema(format = Uuid)]
    group_id: String,
    #[schema(format = Uuid)]
    member_id: String,
    #[schema(example = "10000.00")]
    principal_amount: String,
    #[schema(example = "10")]
    interest_rate: String,
    #[schema(example = 3)]
    duration_months: u32,
    #[schema(example = "11000.00")]
    total_amount: String,
    #[schema(example = "pending")]
    status: String,
    purpose: Option<String>,
    approved_by: Option<String>,
    #[schema(format = DateTime)]
    approved_at: Option<String>,
    #[schema(format = Date)]
    disbursement_date: Option<String>,
    #[schema(format = Date)]
    due_date: String,
    #[schema(format = DateTime)]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::LoanView`]: the loan fields plus its
/// repayment position.
#[derive(ToSchema)]
#[schema(as = crate::domain::LoanView)]
#[serde(rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct LoanViewSchema {
    #[serde(flatten)]
    loan: LoanSchema,
    #[schema(example = "3666.67")]
    total_repaid: String,
    #[schema(example = "7333.33")]
    remaining_balance: String,
    #[schema(example = "3666.67")]
    monthly_installment: String,
}

/// OpenAPI schema for [`crate::domain::LoanEligibility`].
#[derive(ToSchema)]
#[schema(as = crate::domain::LoanEligibility)]
#[serde(rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct LoanEligibilitySchema {
    #[schema(format = Uuid)]
    member_id: String,
    #[schema(example = "5000.00")]
    total_savings: String,
    #[schema(example = "3")]
    max_loan_multiplier: String,
    #[schema(example = "15000.00")]
    max_eligible_principal: String,
    requested_principal: Option<String>,
    eligible: bool,
}

/// OpenAPI schema for [`crate::domain::ports::LoanApplication`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::LoanApplication)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct LoanApplicationSchema {
    loan: LoanSchema,
    eligibility: LoanEligibilitySchema,
}

/// OpenAPI schema for [`crate::domain::Repayment`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Repayment)]
#[serde(rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct RepaymentSchema {
    #[schema(format = Uuid)]
    id: String,
    #[schema(format = Uuid)]
    group_id: String,
    #[schema(format = Uuid)]
    loan_id: String,
    #[schema(format = Uuid)]
    member_id: String,
    #[schema(example = "3666.67")]
    amount: String,
    #[schema(format = Date)]
    payment_date: String,
    #[schema(example = "2025-04")]
    month_year: String,
    is_late: bool,
    notes: Option<String>,
    #[schema(format = Uuid)]
    recorded_by: String,
    #[schema(format = DateTime)]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::SocialFundTransaction`].
#[derive(ToSchema)]
#[schema(as = crate::domain::SocialFundTransaction)]
#[serde(rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct SocialFundTransactionSchema {
    #[schema(format = Uuid)]
    id: String,
    #[schema(format = Uuid)]
    group_id: String,
    #[schema(format = Uuid)]
    member_id: String,
    #[schema(example = "400.00")]
    amount: String,
    #[schema(example = "withdrawal")]
    transaction_type: String,
    #[schema(example = "pending")]
    status: String,
    #[schema(format = Date)]
    transaction_date: String,
    #[schema(example = "2025-03")]
    month_year: String,
    purpose: Option<String>,
    approved_by: Option<String>,
    #[schema(format = DateTime)]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::ports::SocialFundOverview`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::SocialFundOverview)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct SocialFundOverviewSchema {
    #[schema(example = "600.00")]
    balance: String,
    transactions: Vec<SocialFundTransactionSchema>,
}

/// OpenAPI schema for [`crate::domain::Penalty`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Penalty)]
#[serde(rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct PenaltySchema {
    #[schema(format = Uuid)]
    id: String,
    #[schema(format = Uuid)]
    group_id: String,
    #[schema(format = Uuid)]
    member_id: String,
    loan_id: Option<String>,
    #[schema(example = "500.00")]
    amount: String,
    #[schema(example = "late_deposit")]
    penalty_type: String,
    #[schema(format = Date)]
    penalty_date: String,
    reason: Option<String>,
    #[schema(example = "unpaid")]
    status: String,
    #[schema(format = Date)]
    paid_date: Option<String>,
    #[schema(format = DateTime)]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::EffectiveSetting`].
#[derive(ToSchema)]
#[schema(as = crate::domain::EffectiveSetting)]
#[serde(rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct EffectiveSettingSchema {
    #[schema(example = "interest_rate")]
    key: String,
    #[schema(example = "10")]
    value: String,
    is_default: bool,
    updated_by: Option<String>,
    #[schema(format = DateTime)]
    updated_at: Option<String>,
}

/// OpenAPI schema for [`crate::domain::MemberSummary`].
#[derive(ToSchema)]
#[schema(as = crate::domain::MemberSummary)]
#[serde(rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct MemberSummarySchema {
    #[schema(format = Uuid)]
    member_id: String,
    total_savings: String,
    outstanding_loan_balance: String,
    social_fund_balance: String,
    unpaid_penalties: String,
    total_repaid: String,
}

/// OpenAPI schema for [`crate::domain::GroupDashboard`].
#[derive(ToSchema)]
#[schema(as = crate::domain::GroupDashboard)]
#[serde(rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct GroupDashboardSchema {
    #[schema(format = Uuid)]
    group_id: String,
    total_members: u64,
    total_savings: String,
    outstanding_loan_balance: String,
    social_fund_balance: String,
    unpaid_penalties: String,
    total_repaid: String,
    pending_loans: u64,
    active_loans_count: u64,
}

/// OpenAPI schema for [`crate::domain::UserProfile`].
#[derive(ToSchema)]
#[schema(as = crate::domain::UserProfile)]
#[serde(rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct UserProfileSchema {
    #[schema(format = Uuid)]
    user_id: String,
    #[schema(example = "super_admin")]
    platform_role: String,
}

/// OpenAPI schema for [`crate::domain::MonthlyTotals`].
#[derive(ToSchema)]
#[schema(as = crate::domain::MonthlyTotals)]
#[serde(rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct MonthlyTotalsSchema {
    #[schema(example = "2025-03")]
    month_year: String,
    savings: String,
    loans_disbursed: String,
    repayments: String,
    social_fund_contributions: String,
}

/// OpenAPI schema for [`crate::domain::ReconciliationReport`].
///
/// Each finding carries a `kind` tag (`negative_social_fund_balance`,
/// `loan_exceeds_eligibility` or `loan_fully_repaid`) plus its figures.
#[derive(ToSchema)]
#[schema(as = crate::domain::ReconciliationReport)]
#[serde(rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct ReconciliationReportSchema {
    #[schema(format = Uuid)]
    group_id: String,
    #[schema(format = DateTime)]
    generated_at: String,
    dashboard: GroupDashboardSchema,
    findings: Vec<serde_json::Value>,
}
