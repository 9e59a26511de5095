//! Social fund sub-ledger.
//!
//! Contributions are booked `completed`. Withdrawals start `pending` and are
//! approved or rejected by a treasurer; only approved or completed
//! withdrawals reduce the balance.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::string_enum::define_string_enum;
use super::{Amount, Error, GroupId, MemberId, MonthYear, SocialFundTxId, UserId};

define_string_enum! {
    /// Direction of a social fund transaction.
    pub enum SocialFundTxType ("transaction type") {
        /// Money paid into the fund.
        Contribution => "contribution",
        /// Money paid out of the fund.
        Withdrawal => "withdrawal",
    }
}

define_string_enum! {
    /// Social fund transaction state.
    pub enum SocialFundStatus ("social fund status") {
        /// Withdrawal awaiting review.
        Pending => "pending",
        /// Withdrawal approved.
        Approved => "approved",
        /// Settled.
        Completed => "completed",
        /// Withdrawal declined.
        Rejected => "rejected",
    }
}

/// A contribution or withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialFundTransaction {
    /// Identifier.
    pub id: SocialFundTxId,
    /// Owning group.
    pub group_id: GroupId,
    /// Contributing or withdrawing member.
    pub member_id: MemberId,
    /// Amount moved.
    pub amount: Amount,
    /// Direction.
    pub transaction_type: SocialFundTxType,
    /// State.
    pub status: SocialFundStatus,
    /// Date of the transaction.
    pub transaction_date: NaiveDate,
    /// Reporting bucket.
    pub month_year: MonthYear,
    /// Reason given.
    pub purpose: Option<String>,
    /// Reviewer of a withdrawal.
    pub approved_by: Option<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Validated contribution or withdrawal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSocialFundTx {
    /// Member the transaction belongs to.
    pub member_id: MemberId,
    /// Amount moved.
    pub amount: Amount,
    /// Date of the transaction.
    pub transaction_date: NaiveDate,
    /// Reason given.
    pub purpose: Option<String>,
}

impl NewSocialFundTx {
    /// Materialise as a completed contribution.
    #[must_use]
    pub fn into_contribution(self, group_id: GroupId, created_at: DateTime<Utc>) -> SocialFundTransaction {
        self.into_transaction(
            group_id,
            SocialFundTxType::Contribution,
            SocialFundStatus::Completed,
            created_at,
        )
    }

    /// Materialise as a pending withdrawal.
    #[must_use]
    pub fn into_withdrawal(self, group_id: GroupId, created_at: DateTime<Utc>) -> SocialFundTransaction {
        self.into_transaction(
            group_id,
            SocialFundTxType::Withdrawal,
            SocialFundStatus::Pending,
            created_at,
        )
    }

    fn into_transaction(
        self,
        group_id: GroupId,
        transaction_type: SocialFundTxType,
        status: SocialFundStatus,
        created_at: DateTime<Utc>,
    ) -> SocialFundTransaction {
        SocialFundTransaction {
            id: SocialFundTxId::random(),
            group_id,
            member_id: self.member_id,
            amount: self.amount,
            transaction_type,
            status,
            transaction_date: self.transaction_date,
            month_year: MonthYear::of(self.transaction_date),
            purpose: super::group::non_blank(self.purpose),
            approved_by: None,
            created_at,
        }
    }
}

/// Review of a pending withdrawal, applied as a status CAS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocialFundTransition {
    /// Status the transaction must currently hold.
    pub from: SocialFundStatus,
    /// Status to move to.
    pub to: SocialFundStatus,
    /// Reviewer.
    pub approved_by: UserId,
}

impl SocialFundTransition {
    /// `pending → approved`.
    #[must_use]
    pub const fn approve(reviewer: UserId) -> Self {
        Self {
            from: SocialFundStatus::Pending,
            to: SocialFundStatus::Approved,
            approved_by: reviewer,
        }
    }

    /// `pending → rejected`.
    #[must_use]
    pub const fn reject(reviewer: UserId) -> Self {
        Self {
            from: SocialFundStatus::Pending,
            to: SocialFundStatus::Rejected,
            approved_by: reviewer,
        }
    }

    /// Apply to an in-memory withdrawal.
    ///
    /// # Errors
    /// Returns `InvalidTransition` when the transaction is not a withdrawal
    /// holding `from`.
    pub fn apply(&self, tx: &mut SocialFundTransaction) -> Result<(), Error> {
        if tx.transaction_type != SocialFundTxType::Withdrawal {
            return Err(Error::invalid_transition("only withdrawals can be reviewed"));
        }
        if tx.status != self.from {
            return Err(invalid_social_fund_transition(tx.status, self.to));
        }
        tx.status = self.to;
        tx.approved_by = Some(self.approved_by);
        Ok(())
    }
}

/// Error for an illegal social fund status change.
#[must_use]
pub fn invalid_social_fund_transition(from: SocialFundStatus, to: SocialFundStatus) -> Error {
    Error::status_transition("social_fund_transaction", from.as_str(), to.as_str())
}
