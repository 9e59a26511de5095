//! Driving port for derived ledger views.

use async_trait::async_trait;

use crate::domain::{
    Error, GroupAccess, GroupDashboard, MemberId, MemberSummary, MonthlyTotals,
    ReconciliationReport,
};

/// Read-only aggregates recomputed from the ledgers on every call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerReports: Send + Sync {
    /// Savings, loan, social fund and penalty position of one member.
    async fn member_summary(
        &self,
        access: &GroupAccess,
        member_id: MemberId,
    ) -> Result<MemberSummary, Error>;

    /// Group totals.
    async fn dashboard(&self, access: &GroupAccess) -> Result<GroupDashboard, Error>;

    /// Savings, disbursements, repayments and contributions per month.
    async fn monthly_totals(&self, access: &GroupAccess) -> Result<Vec<MonthlyTotals>, Error>;

    /// Consistency findings for the group.
    async fn reconciliation(&self, access: &GroupAccess) -> Result<ReconciliationReport, Error>;
}
