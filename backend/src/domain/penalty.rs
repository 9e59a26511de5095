//! Penalties levied on members.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::string_enum::define_string_enum;
use super::{Amount, Error, GroupId, LoanId, MemberId, PenaltyId};

define_string_enum! {
    /// Reason category for a penalty.
    pub enum PenaltyType ("penalty type") {
        /// Savings deposit arrived late.
        LateDeposit => "late_deposit",
        /// Loan repayment arrived late.
        LateRepayment => "late_repayment",
        /// Loan defaulted.
        Default => "default",
        /// Anything else.
        Other => "other",
    }
}

impl PenaltyType {
    /// Whether a penalty of this type may reference a loan.
    #[must_use]
    pub const fn allows_loan(self) -> bool {
        matches!(self, Self::LateRepayment | Self::Default)
    }
}

define_string_enum! {
    /// Penalty settlement state.
    pub enum PenaltyStatus ("penalty status") {
        /// Outstanding.
        Unpaid => "unpaid",
        /// Settled; terminal.
        Paid => "paid",
        /// Forgiven; terminal.
        Waived => "waived",
    }
}

/// A penalty record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Penalty {
    /// Identifier.
    pub id: PenaltyId,
    /// Owning group.
    pub group_id: GroupId,
    /// Penalised member.
    pub member_id: MemberId,
    /// Related loan.
    pub loan_id: Option<LoanId>,
    /// Amount owed.
    pub amount: Amount,
    /// Category.
    pub penalty_type: PenaltyType,
    /// Date levied.
    pub penalty_date: NaiveDate,
    /// Explanation.
    pub reason: Option<String>,
    /// Settlement state.
    pub status: PenaltyStatus,
    /// Settlement date when paid.
    pub paid_date: Option<NaiveDate>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Penalty request; the amount may be left to group policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPenalty {
    /// Penalised member.
    pub member_id: MemberId,
    /// Related loan.
    pub loan_id: Option<LoanId>,
    /// Explicit amount.
    pub amount: Option<Amount>,
    /// Category.
    pub penalty_type: PenaltyType,
    /// Date levied.
    pub penalty_date: NaiveDate,
    /// Explanation.
    pub reason: Option<String>,
}

impl NewPenalty {
    /// Check the loan reference against the penalty type.
    ///
    /// # Errors
    /// Returns `InvalidRequest` when a loan is given for a type that does
    /// not relate to loans.
    pub fn validate(&self) -> Result<(), Error> {
        if self.loan_id.is_some() && !self.penalty_type.allows_loan() {
            return Err(Error::invalid_request(format!(
                "{} penalties cannot reference a loan",
                self.penalty_type
            ))
            .with_details(json!({ "field": "loanId" })));
        }
        Ok(())
    }

    /// Materialise an unpaid penalty with the resolved amount.
    #[must_use]
    pub fn into_penalty(self, group_id: GroupId, amount: Amount, created_at: DateTime<Utc>) -> Penalty {
        Penalty {
            id: PenaltyId::random(),
            group_id,
            member_id: self.member_id,
            loan_id: self.loan_id,
            amount,
            penalty_type: self.penalty_type,
            penalty_date: self.penalty_date,
            reason: super::group::non_blank(self.reason),
            status: PenaltyStatus::Unpaid,
            paid_date: None,
            created_at,
        }
    }
}

/// Settlement of an unpaid penalty, applied as a status CAS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyTransition {
    /// Status to move to; the penalty must be `unpaid`.
    pub to: PenaltyStatus,
    /// Settlement date, for payments.
    pub paid_date: Option<NaiveDate>,
}

impl PenaltyTransition {
    /// Required current status for every settlement.
    pub const FROM: PenaltyStatus = PenaltyStatus::Unpaid;

    /// `unpaid → paid`.
    #[must_use]
    pub const fn pay(date: NaiveDate) -> Self {
        Self {
            to: PenaltyStatus::Paid,
            paid_date: Some(date),
        }
    }

    /// `unpaid → waived`.
    #[must_use]
    pub const fn waive() -> Self {
        Self {
            to: PenaltyStatus::Waived,
            paid_date: None,
        }
    }

    /// Apply to an in-memory penalty.
    ///
    /// # Errors
    /// Returns `InvalidTransition` unless the penalty is unpaid.
    pub fn apply(&self, penalty: &mut Penalty) -> Result<(), Error> {
        if penalty.status != Self::FROM {
            return Err(invalid_penalty_transition(penalty.status, self.to));
        }
        penalty.status = self.to;
        penalty.paid_date = self.paid_date;
        Ok(())
    }
}

/// Error for an illegal penalty status change.
#[must_use]
pub fn invalid_penalty_transition(from: PenaltyStatus, to: PenaltyStatus) -> Error {
    Error::status_transition("penalty", from.as_str(), to.as_str())
}

/// Filter for penalty listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PenaltyFilter {
    /// Restrict to one member.
    pub member_id: Option<MemberId>,
    /// Restrict to one status.
    pub status: Option<PenaltyStatus>,
}

impl PenaltyFilter {
    /// Whether `penalty` passes the filter.
    #[must_use]
    pub fn matches(&self, penalty: &Penalty) -> bool {
        self.member_id.is_none_or(|id| penalty.member_id == id)
            && self.status.is_none_or(|status| penalty.status == status)
    }
}
