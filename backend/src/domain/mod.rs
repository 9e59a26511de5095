//! Domain primitives, aggregates and services.
//!
//! Purpose: define the strongly typed entities of a village bank (groups,
//! members and their ledgers), the loan lifecycle state machine, the pure
//! ledger folds, and the services that apply capability checks before
//! mutating state through repository ports.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifiers.
//! - Entities: Group, Member, Saving, Loan, Repayment,
//!   SocialFundTransaction, Penalty, Setting.
//! - Access control: Capability, CapabilitySet, GroupAccess.
//! - Services: one per driving port in [`ports`].

pub mod access;
pub mod error;
pub mod group;
pub mod ids;
pub mod ledger;
pub mod loan;
pub mod member;
pub mod money;
pub mod penalty;
pub mod ports;
pub mod repayment;
pub mod savings;
pub mod settings;
pub mod social_fund;
pub(crate) mod string_enum;
pub mod trace_id;

mod access_service;
mod group_service;
mod ledger_service;
mod loan_service;
mod member_service;
mod penalty_service;
mod repayment_service;
mod savings_service;
mod service_support;
#[cfg(test)]
pub(crate) mod service_test_support;
mod settings_service;
mod social_fund_service;

pub use self::access::{
    capabilities, Actor, Capability, CapabilitySet, GroupAccess, GroupRole, PlatformRole,
    UserProfile,
};
pub use self::access_service::AccessService;
pub use self::error::{Error, ErrorCode};
pub use self::group::{
    Group, GroupProfile, GroupReview, GroupReviewAction, GroupStatus, Membership,
};
pub use self::group_service::GroupService;
pub use self::ids::{
    GroupId, IdParseError, LoanId, MemberId, PenaltyId, RepaymentId, SavingId, SocialFundTxId,
    UserId,
};
pub use self::ledger::{
    max_eligible_principal, outstanding_loan_balance, social_fund_balance, total_repaid,
    total_savings, unpaid_penalties, GroupDashboard, LedgerSnapshot, LoanEligibility,
    MemberSummary, MonthlyTotals, ReconciliationFinding, ReconciliationReport,
};
pub use self::ledger_service::LedgerService;
pub use self::loan::{
    invalid_loan_transition, Loan, LoanFilter, LoanStatus, LoanTerms, LoanTransition, LoanView,
};
pub use self::loan_service::LoanService;
pub use self::member::{Member, MemberDetails, MemberStatus, MemberUpdate};
pub use self::member_service::MemberService;
pub use self::money::{
    loan_total, percent_of, round_money, Amount, DurationMonths, InterestRate,
    MoneyValidationError, MonthYear, MAX_AMOUNT, MONEY_SCALE,
};
pub use self::penalty::{
    invalid_penalty_transition, NewPenalty, Penalty, PenaltyFilter, PenaltyStatus,
    PenaltyTransition, PenaltyType,
};
pub use self::penalty_service::PenaltyService;
pub use self::repayment::{NewRepayment, Repayment, RepaymentFilter};
pub use self::repayment_service::RepaymentService;
pub use self::savings::{NewSaving, Saving, SavingFilter, SavingStatus};
pub use self::savings_service::SavingsService;
pub use self::settings::{
    effective_settings, EffectiveSetting, GroupPolicy, Setting, SettingKey, SettingValueError,
};
pub use self::settings_service::SettingsService;
pub use self::social_fund::{
    invalid_social_fund_transition, NewSocialFundTx, SocialFundStatus, SocialFundTransaction,
    SocialFundTransition, SocialFundTxType,
};
pub use self::social_fund_service::SocialFundService;
pub use self::string_enum::ParseEnumError;
pub use self::trace_id::{TraceId, TRACE_ID_HEADER};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use village_bank::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// # assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
