//! Loan repayments.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Amount, GroupId, Loan, LoanId, MemberId, MonthYear, RepaymentId, UserId};

/// A payment against one loan. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repayment {
    /// Identifier.
    pub id: RepaymentId,
    /// Owning group.
    pub group_id: GroupId,
    /// Loan being repaid.
    pub loan_id: LoanId,
    /// Borrower, copied from the loan.
    pub member_id: MemberId,
    /// Amount paid.
    pub amount: Amount,
    /// Date of payment.
    pub payment_date: NaiveDate,
    /// Reporting bucket.
    pub month_year: MonthYear,
    /// Whether the payment arrived after it was due.
    pub is_late: bool,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Recording user.
    pub recorded_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Validated repayment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRepayment {
    /// Loan being repaid.
    pub loan_id: LoanId,
    /// Amount paid.
    pub amount: Amount,
    /// Date of payment.
    pub payment_date: NaiveDate,
    /// Bucket override.
    pub month_year: Option<MonthYear>,
    /// Late flag.
    pub is_late: bool,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl NewRepayment {
    /// Materialise the row against `loan`.
    #[must_use]
    pub fn into_repayment(self, loan: &Loan, recorded_by: UserId, created_at: DateTime<Utc>) -> Repayment {
        Repayment {
            id: RepaymentId::random(),
            group_id: loan.group_id,
            loan_id: loan.id,
            member_id: loan.member_id,
            amount: self.amount,
            payment_date: self.payment_date,
            month_year: self
                .month_year
                .unwrap_or_else(|| MonthYear::of(self.payment_date)),
            is_late: self.is_late,
            notes: super::group::non_blank(self.notes),
            recorded_by,
            created_at,
        }
    }
}

/// Filter for repayment listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepaymentFilter {
    /// Restrict to one loan.
    pub loan_id: Option<LoanId>,
    /// Restrict to one member.
    pub member_id: Option<MemberId>,
}

impl RepaymentFilter {
    /// Whether `repayment` passes the filter.
    #[must_use]
    pub fn matches(&self, repayment: &Repayment) -> bool {
        self.loan_id.is_none_or(|id| repayment.loan_id == id)
            && self.member_id.is_none_or(|id| repayment.member_id == id)
    }
}
