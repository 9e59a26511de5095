//! Ledger reports service: derived views recomputed on every call.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{LedgerReports, LedgerStore};
use crate::domain::service_support::{load_policy, require_member};
use crate::domain::{
    Capability, Error, GroupAccess, GroupDashboard, MemberId, MemberSummary, MonthlyTotals,
    ReconciliationReport,
};

/// Implements [`LedgerReports`].
#[derive(Clone)]
pub struct LedgerService {
    store: LedgerStore,
    clock: Arc<dyn Clock>,
}

impl LedgerService {
    /// Create the service.
    pub fn new(store: LedgerStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

#[async_trait]
impl LedgerReports for LedgerService {
    async fn member_summary(
        &self,
        access: &GroupAccess,
        member_id: MemberId,
    ) -> Result<MemberSummary, Error> {
        require_member(self.store.members.as_ref(), access, &member_id).await?;
        let snapshot = self.store.snapshot(access.group_id()).await?;
        Ok(snapshot.member_summary(member_id))
    }

    async fn dashboard(&self, access: &GroupAccess) -> Result<GroupDashboard, Error> {
        let snapshot = self.store.snapshot(access.group_id()).await?;
        Ok(snapshot.dashboard(*access.group_id()))
    }

    async fn monthly_totals(&self, access: &GroupAccess) -> Result<Vec<MonthlyTotals>, Error> {
        let snapshot = self.store.snapshot(access.group_id()).await?;
        Ok(snapshot.monthly_totals())
    }

    async fn reconciliation(&self, access: &GroupAccess) -> Result<ReconciliationReport, Error> {
        access.require(Capability::ManageGroup)?;
        let policy = load_policy(self.store.settings.as_ref(), access).await?;
        let snapshot = self.store.snapshot(access.group_id()).await?;
        let report = snapshot.reconcile(*access.group_id(), &policy, self.clock.utc());
        if report.findings.is_empty() {
            info!(group_id = %report.group_id, "ledgers reconciled cleanly");
        } else {
            warn!(
                group_id = %report.group_id,
                findings = report.findings.len(),
                "reconciliation found inconsistencies"
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::domain::service_test_support::{
        access, fixture_clock, fixture_today, member, MockStore,
    };
    use crate::domain::{
        Amount, ErrorCode, GroupRole, MemberStatus, MonthYear, NewSaving, NewSocialFundTx,
        ReconciliationFinding, SavingStatus, SocialFundStatus,
    };

    /// Store whose ledgers hold one member with savings and an overdrawn fund.
    fn populated(access: &GroupAccess) -> (MockStore, MemberId) {
        let group_id = *access.group_id();
        let existing = member(group_id, MemberStatus::Active);
        let member_id = existing.id;
        let deposit = NewSaving {
            member_id,
            amount: Amount::new(dec!(1200)).expect("amount"),
            deposit_date: fixture_today(),
            month_year: None,
            status: None,
            notes: None,
        }
        .into_saving(group_id, SavingStatus::Completed, *access.user_id(), Utc::now());
        let mut withdrawal = NewSocialFundTx {
            member_id,
            amount: Amount::new(dec!(50)).expect("amount"),
            transaction_date: fixture_today(),
            purpose: None,
        }
        .into_withdrawal(group_id, Utc::now());
        withdrawal.status = SocialFundStatus::Approved;

        let mut mocks = MockStore::default().with_default_settings();
        let found = existing.clone();
        mocks
            .members
            .expect_find()
            .returning(move |_, _| Ok(Some(found.clone())));
        mocks
            .members
            .expect_list()
            .returning(move |_| Ok(vec![existing.clone()]));
        mocks
            .savings
            .expect_list()
            .returning(move |_, _| Ok(vec![deposit.clone()]));
        mocks.loans.expect_list().returning(|_, _| Ok(Vec::new()));
        mocks.repayments.expect_list().returning(|_, _| Ok(Vec::new()));
        mocks
            .social_fund
            .expect_list()
            .returning(move |_, _| Ok(vec![withdrawal.clone()]));
        mocks.penalties.expect_list().returning(|_, _| Ok(Vec::new()));
        (mocks, member_id)
    }

    #[tokio::test]
    async fn member_summary_folds_the_snapshot() {
        let access = access(GroupRole::Member);
        let (mocks, member_id) = populated(&access);
        let service = LedgerService::new(mocks.into_store(), fixture_clock());

        let summary = service
            .member_summary(&access, member_id)
            .await
            .expect("summary");
        assert_eq!(summary.total_savings, dec!(1200));
        assert_eq!(summary.social_fund_balance, dec!(-50));
    }

    #[tokio::test]
    async fn dashboard_counts_active_members() {
        let access = access(GroupRole::Member);
        let (mocks, _) = populated(&access);
        let service = LedgerService::new(mocks.into_store(), fixture_clock());

        let dashboard = service.dashboard(&access).await.expect("dashboard");
        assert_eq!(dashboard.total_members, 1);
        assert_eq!(dashboard.pending_loans, 0);
    }

    #[tokio::test]
    async fn monthly_totals_skip_withdrawals() {
        let access = access(GroupRole::Member);
        let (mocks, _) = populated(&access);
        let service = LedgerService::new(mocks.into_store(), fixture_clock());

        let months = service.monthly_totals(&access).await.expect("monthly totals");
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].month_year, MonthYear::of(fixture_today()));
        assert_eq!(months[0].savings, dec!(1200));
        assert_eq!(months[0].social_fund_contributions, dec!(0));
    }

    #[tokio::test]
    async fn reconciliation_reports_overdrawn_fund() {
        let access = access(GroupRole::Treasurer);
        let (mocks, _) = populated(&access);
        let service = LedgerService::new(mocks.into_store(), fixture_clock());

        let report = service.reconciliation(&access).await.expect("report");
        assert_eq!(
            report.findings,
            vec![ReconciliationFinding::NegativeSocialFundBalance {
                balance: dec!(-50)
            }]
        );
    }

    #[tokio::test]
    async fn members_cannot_run_reconciliation() {
        let service = LedgerService::new(MockStore::default().into_store(), fixture_clock());
        let error = service
            .reconciliation(&access(GroupRole::Member))
            .await
            .expect_err("forbidden");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }
}
