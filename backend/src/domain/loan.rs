//! Loans and their lifecycle.
//!
//! A loan moves along a fixed path:
//!
//! ```text
//! pending ─┬─▶ approved ─▶ disbursed ─▶ repaying ─┬─▶ completed
//!          └─▶ rejected                           └─▶ defaulted
//! ```
//!
//! `total_amount` is computed once at creation from the principal and the
//! flat interest rate and never recomputed. Status changes are expressed as
//! [`LoanTransition`] values which repositories apply as a compare-and-swap
//! on the current status.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::string_enum::define_string_enum;
use super::{
    loan_total, round_money, Amount, DurationMonths, Error, GroupId, InterestRate, LoanId,
    MemberId, UserId,
};

define_string_enum! {
    /// Lifecycle state of a loan.
    pub enum LoanStatus ("loan status") {
        /// Requested, awaiting a decision.
        Pending => "pending",
        /// Approved, not yet paid out.
        Approved => "approved",
        /// Request declined; terminal.
        Rejected => "rejected",
        /// Paid out to the member.
        Disbursed => "disbursed",
        /// At least one repayment received.
        Repaying => "repaying",
        /// Closed after full repayment; terminal.
        Completed => "completed",
        /// Written off; terminal.
        Defaulted => "defaulted",
    }
}

impl LoanStatus {
    /// Whether `self → next` is a legal single step.
    ///
    /// # Examples
    /// ```
    /// use village_bank::domain::LoanStatus;
    ///
    /// assert!(LoanStatus::Pending.can_transition_to(LoanStatus::Approved));
    /// assert!(!LoanStatus::Pending.can_transition_to(LoanStatus::Disbursed));
    /// ```
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved | Self::Rejected)
                | (Self::Approved, Self::Disbursed)
                | (Self::Disbursed, Self::Repaying)
                | (Self::Repaying, Self::Completed | Self::Defaulted)
        )
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Completed | Self::Defaulted)
    }

    /// Whether the loan counts towards the outstanding balance.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Disbursed | Self::Repaying)
    }
}

/// A loan record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    /// Identifier.
    pub id: LoanId,
    /// Owning group.
    pub group_id: GroupId,
    /// Borrowing member.
    pub member_id: MemberId,
    /// Amount lent.
    pub principal_amount: Amount,
    /// Flat interest percentage.
    pub interest_rate: InterestRate,
    /// Term in months.
    pub duration_months: DurationMonths,
    /// Principal plus interest, fixed at creation.
    pub total_amount: Decimal,
    /// Lifecycle state.
    pub status: LoanStatus,
    /// Stated purpose.
    pub purpose: Option<String>,
    /// Approving user.
    pub approved_by: Option<UserId>,
    /// Approval time.
    pub approved_at: Option<DateTime<Utc>>,
    /// Payout date.
    pub disbursement_date: Option<NaiveDate>,
    /// Contractual due date.
    pub due_date: NaiveDate,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Loan {
    /// Equal monthly share of the total, rounded to cents.
    #[must_use]
    pub fn monthly_installment(&self) -> Decimal {
        round_money(self.total_amount / Decimal::from(self.duration_months.get()))
    }
}

/// Validated loan request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanTerms {
    /// Borrowing member.
    pub member_id: MemberId,
    /// Amount requested.
    pub principal: Amount,
    /// Rate override; defaults to the group policy.
    pub interest_rate: Option<InterestRate>,
    /// Term override; defaults to the group policy.
    pub duration_months: Option<DurationMonths>,
    /// Stated purpose.
    pub purpose: Option<String>,
}

impl LoanTerms {
    /// Build a pending loan. `rate` and `duration` are already resolved
    /// against policy.
    ///
    /// # Errors
    /// Returns `InvalidRequest` when the due date overflows the calendar or
    /// the contractual total does not fit a ledger amount.
    pub fn into_pending_loan(
        self,
        group_id: GroupId,
        rate: InterestRate,
        duration: DurationMonths,
        created_at: DateTime<Utc>,
    ) -> Result<Loan, Error> {
        let due_date = duration
            .after(created_at.date_naive())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let total_amount = loan_total(self.principal, rate).map_err(|err| {
            Error::invalid_request(format!("loan total is out of range: {err}"))
                .with_details(json!({ "field": "principalAmount" }))
        })?;
        Ok(Loan {
            id: LoanId::random(),
            group_id,
            member_id: self.member_id,
            principal_amount: self.principal,
            interest_rate: rate,
            duration_months: duration,
            total_amount,
            status: LoanStatus::Pending,
            purpose: super::group::non_blank(self.purpose),
            approved_by: None,
            approved_at: None,
            disbursement_date: None,
            due_date,
            created_at,
        })
    }
}

/// A single compare-and-swap status change with its side fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanTransition {
    /// Status the loan must currently hold.
    pub from: LoanStatus,
    /// Status to move to.
    pub to: LoanStatus,
    /// Approver, set on approval.
    pub approved_by: Option<UserId>,
    /// Approval time, set on approval.
    pub approved_at: Option<DateTime<Utc>>,
    /// Payout date, set on disbursement.
    pub disbursement_date: Option<NaiveDate>,
}

impl LoanTransition {
    const fn bare(from: LoanStatus, to: LoanStatus) -> Self {
        Self {
            from,
            to,
            approved_by: None,
            approved_at: None,
            disbursement_date: None,
        }
    }

    /// `pending → approved`.
    #[must_use]
    pub const fn approve(approver: UserId, at: DateTime<Utc>) -> Self {
        Self {
            approved_by: Some(approver),
            approved_at: Some(at),
            ..Self::bare(LoanStatus::Pending, LoanStatus::Approved)
        }
    }

    /// `pending → rejected`.
    #[must_use]
    pub const fn reject() -> Self {
        Self::bare(LoanStatus::Pending, LoanStatus::Rejected)
    }

    /// `approved → disbursed`.
    #[must_use]
    pub const fn disburse(date: NaiveDate) -> Self {
        Self {
            disbursement_date: Some(date),
            ..Self::bare(LoanStatus::Approved, LoanStatus::Disbursed)
        }
    }

    /// `disbursed → repaying`, driven by the first repayment.
    #[must_use]
    pub const fn start_repaying() -> Self {
        Self::bare(LoanStatus::Disbursed, LoanStatus::Repaying)
    }

    /// `repaying → completed`.
    #[must_use]
    pub const fn complete() -> Self {
        Self::bare(LoanStatus::Repaying, LoanStatus::Completed)
    }

    /// `repaying → defaulted`.
    #[must_use]
    pub const fn default_loan() -> Self {
        Self::bare(LoanStatus::Repaying, LoanStatus::Defaulted)
    }

    /// Apply to an in-memory loan, enforcing the lifecycle and the CAS.
    ///
    /// # Errors
    /// Returns `InvalidTransition` when the loan does not hold `from` or the
    /// step is not part of the lifecycle.
    pub fn apply(&self, loan: &mut Loan) -> Result<(), Error> {
        if loan.status != self.from || !self.from.can_transition_to(self.to) {
            return Err(invalid_loan_transition(loan.status, self.to));
        }
        loan.status = self.to;
        if self.approved_by.is_some() {
            loan.approved_by = self.approved_by;
        }
        if self.approved_at.is_some() {
            loan.approved_at = self.approved_at;
        }
        if self.disbursement_date.is_some() {
            loan.disbursement_date = self.disbursement_date;
        }
        Ok(())
    }
}

/// Error for an illegal loan status change.
#[must_use]
pub fn invalid_loan_transition(from: LoanStatus, to: LoanStatus) -> Error {
    Error::status_transition("loan", from.as_str(), to.as_str())
}

/// Filter for loan listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoanFilter {
    /// Restrict to one member.
    pub member_id: Option<MemberId>,
    /// Restrict to one status.
    pub status: Option<LoanStatus>,
}

impl LoanFilter {
    /// Whether `loan` passes the filter.
    #[must_use]
    pub fn matches(&self, loan: &Loan) -> bool {
        self.member_id.is_none_or(|id| loan.member_id == id)
            && self.status.is_none_or(|status| loan.status == status)
    }
}

/// Loan with its repayment position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanView {
    /// The loan record.
    #[serde(flatten)]
    pub loan: Loan,
    /// Sum of repayments recorded against the loan.
    pub total_repaid: Decimal,
    /// `total_amount - total_repaid`, floored at zero.
    pub remaining_balance: Decimal,
    /// Equal monthly share of the total.
    pub monthly_installment: Decimal,
}

impl LoanView {
    /// Combine a loan with its repaid sum.
    #[must_use]
    pub fn new(loan: Loan, total_repaid: Decimal) -> Self {
        let remaining = loan.total_amount.saturating_sub(total_repaid).max(Decimal::ZERO);
        let monthly_installment = loan.monthly_installment();
        Self {
            loan,
            total_repaid: round_money(total_repaid),
            remaining_balance: round_money(remaining),
            monthly_installment,
        }
    }
}
