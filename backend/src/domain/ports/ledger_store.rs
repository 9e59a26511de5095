//! Bundle of every driven repository port.
//!
//! Adapters hand one [`LedgerStore`] to the service layer; services clone
//! the `Arc`s they need.

use std::sync::Arc;

use crate::domain::{
    GroupId, LedgerSnapshot, LoanFilter, PenaltyFilter, RepaymentFilter, SavingFilter,
};

use super::{
    GroupRepository, LoanRepository, MemberRepository, MembershipRepository, PenaltyRepository,
    ProfileRepository, RepaymentRepository, RepositoryError, SavingsRepository,
    SettingsRepository, SocialFundRepository,
};

/// Every repository a village bank needs.
#[derive(Clone)]
pub struct LedgerStore {
    /// Groups.
    pub groups: Arc<dyn GroupRepository>,
    /// Memberships.
    pub memberships: Arc<dyn MembershipRepository>,
    /// Platform roles.
    pub profiles: Arc<dyn ProfileRepository>,
    /// Member register.
    pub members: Arc<dyn MemberRepository>,
    /// Savings ledger.
    pub savings: Arc<dyn SavingsRepository>,
    /// Loans.
    pub loans: Arc<dyn LoanRepository>,
    /// Repayments.
    pub repayments: Arc<dyn RepaymentRepository>,
    /// Social fund.
    pub social_fund: Arc<dyn SocialFundRepository>,
    /// Penalties.
    pub penalties: Arc<dyn PenaltyRepository>,
    /// Settings.
    pub settings: Arc<dyn SettingsRepository>,
}

impl LedgerStore {
    /// Load every ledger row of `group_id`.
    ///
    /// # Errors
    /// Propagates the first repository failure.
    pub async fn snapshot(&self, group_id: &GroupId) -> Result<LedgerSnapshot, RepositoryError> {
        Ok(LedgerSnapshot {
            members: self.members.list(group_id).await?,
            savings: self.savings.list(group_id, SavingFilter::default()).await?,
            loans: self.loans.list(group_id, LoanFilter::default()).await?,
            repayments: self
                .repayments
                .list(group_id, RepaymentFilter::default())
                .await?,
            social_fund: self.social_fund.list(group_id, None).await?,
            penalties: self
                .penalties
                .list(group_id, PenaltyFilter::default())
                .await?,
        })
    }
}
