//! Driving port for the loan lifecycle.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{
    Error, GroupAccess, Loan, LoanEligibility, LoanFilter, LoanId, LoanTerms, LoanView, MemberId,
};

/// A newly requested loan with its advisory eligibility assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplication {
    /// The pending loan.
    pub loan: Loan,
    /// Savings-based eligibility at request time.
    pub eligibility: LoanEligibility,
}

/// Loan operations.
///
/// Every transition is a compare-and-swap on the current status; a loan
/// that has already moved on yields `InvalidTransition`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanLifecycle: Send + Sync {
    /// Request a loan. Requires `request_loan`.
    async fn create_loan(
        &self,
        access: &GroupAccess,
        terms: LoanTerms,
    ) -> Result<LoanApplication, Error>;

    /// `pending → approved`. Requires `approve_loans`.
    async fn approve_loan(&self, access: &GroupAccess, loan_id: LoanId) -> Result<Loan, Error>;

    /// `pending → rejected`. Requires `approve_loans`.
    async fn reject_loan(&self, access: &GroupAccess, loan_id: LoanId) -> Result<Loan, Error>;

    /// `approved → disbursed`. Requires `disburse_loans`. `date` defaults to
    /// today.
    async fn disburse_loan(
        &self,
        access: &GroupAccess,
        loan_id: LoanId,
        date: Option<NaiveDate>,
    ) -> Result<Loan, Error>;

    /// `repaying → completed`. Requires `manage_loans`.
    async fn complete_loan(&self, access: &GroupAccess, loan_id: LoanId) -> Result<Loan, Error>;

    /// `repaying → defaulted`. Requires `manage_loans`.
    async fn default_loan(&self, access: &GroupAccess, loan_id: LoanId) -> Result<Loan, Error>;

    /// Loan with its repayment position.
    async fn get_loan(&self, access: &GroupAccess, loan_id: LoanId) -> Result<LoanView, Error>;

    /// Loans of the group.
    async fn list_loans(
        &self,
        access: &GroupAccess,
        filter: LoanFilter,
    ) -> Result<Vec<LoanView>, Error>;

    /// Largest principal `member_id` may borrow, optionally assessing a
    /// requested amount.
    async fn eligibility(
        &self,
        access: &GroupAccess,
        member_id: MemberId,
        principal: Option<Decimal>,
    ) -> Result<LoanEligibility, Error>;

    /// Complete every repaying loan whose repayments cover its total.
    async fn complete_fully_repaid(&self, access: &GroupAccess) -> Result<Vec<Loan>, Error>;
}
