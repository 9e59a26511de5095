//! Savings deposits.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::string_enum::define_string_enum;
use super::{Amount, GroupId, MemberId, MonthYear, SavingId, UserId};

define_string_enum! {
    /// Deposit state. Only `completed` deposits count towards savings.
    pub enum SavingStatus ("saving status") {
        /// Confirmed deposit.
        Completed => "completed",
        /// Recorded by a member, awaiting confirmation.
        Pending => "pending",
        /// Received after the expected date.
        Late => "late",
    }
}

/// A savings deposit. Append-only; only `status` changes after insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Saving {
    /// Identifier.
    pub id: SavingId,
    /// Owning group.
    pub group_id: GroupId,
    /// Depositing member.
    pub member_id: MemberId,
    /// Deposited amount.
    pub amount: Amount,
    /// Date of deposit.
    pub deposit_date: NaiveDate,
    /// Reporting bucket.
    pub month_year: MonthYear,
    /// Deposit state.
    pub status: SavingStatus,
    /// Free-form notes.
    pub notes: Option<String>,
    /// User who recorded the deposit.
    pub recorded_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Validated deposit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSaving {
    /// Depositing member.
    pub member_id: MemberId,
    /// Deposited amount.
    pub amount: Amount,
    /// Date of deposit.
    pub deposit_date: NaiveDate,
    /// Bucket override; defaults to the deposit date's month.
    pub month_year: Option<MonthYear>,
    /// Requested status, honoured only for bookkeepers.
    pub status: Option<SavingStatus>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Filter for deposit listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SavingFilter {
    /// Restrict to one member.
    pub member_id: Option<MemberId>,
    /// Restrict to one reporting bucket.
    pub month_year: Option<MonthYear>,
}

impl SavingFilter {
    /// Whether `saving` passes the filter.
    #[must_use]
    pub fn matches(&self, saving: &Saving) -> bool {
        self.member_id.is_none_or(|id| saving.member_id == id)
            && self.month_year.is_none_or(|bucket| saving.month_year == bucket)
    }
}

impl NewSaving {
    /// Materialise the row with its final status.
    #[must_use]
    pub fn into_saving(
        self,
        group_id: GroupId,
        status: SavingStatus,
        recorded_by: UserId,
        created_at: DateTime<Utc>,
    ) -> Saving {
        Saving {
            id: SavingId::random(),
            group_id,
            member_id: self.member_id,
            amount: self.amount,
            deposit_date: self.deposit_date,
            month_year: self
                .month_year
                .unwrap_or_else(|| MonthYear::of(self.deposit_date)),
            status,
            notes: super::group::non_blank(self.notes),
            recorded_by,
            created_at,
        }
    }
}
