//! Shared HTTP adapter state.
//!
//! Handlers receive this bundle via `actix_web::web::Data` and only ever see
//! driving ports, so they stay testable with mocks or the in-memory store.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AccessControl, GroupRegistry, LedgerReports, LedgerStore, LoanLifecycle, MemberDirectory,
    PenaltyLedger, RepaymentLedger, SavingsLedger, SettingsStore, SocialFundLedger,
};
use crate::domain::{
    AccessService, GroupService, LedgerService, LoanService, MemberService, PenaltyService,
    RepaymentService, SavingsService, SettingsService, SocialFundService,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub access: Arc<dyn AccessControl>,
    pub groups: Arc<dyn GroupRegistry>,
    pub members: Arc<dyn MemberDirectory>,
    pub savings: Arc<dyn SavingsLedger>,
    pub loans: Arc<dyn LoanLifecycle>,
    pub repayments: Arc<dyn RepaymentLedger>,
    pub social_fund: Arc<dyn SocialFundLedger>,
    pub penalties: Arc<dyn PenaltyLedger>,
    pub settings: Arc<dyn SettingsStore>,
    pub reports: Arc<dyn LedgerReports>,
}

impl HttpState {
    /// Wire the production services over one repository bundle.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use village_bank::inbound::http::state::HttpState;
    /// use village_bank::outbound::memory::MemoryStore;
    ///
    /// let state = HttpState::from_store(MemoryStore::new().ledger_store(), Arc::new(DefaultClock));
    /// let _loans = state.loans.clone();
    /// ```
    pub fn from_store(store: LedgerStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            access: Arc::new(AccessService::new(
                store.groups.clone(),
                store.memberships.clone(),
                store.profiles.clone(),
            )),
            groups: Arc::new(GroupService::new(
                store.groups.clone(),
                store.memberships.clone(),
                clock.clone(),
            )),
            members: Arc::new(MemberService::new(store.clone(), clock.clone())),
            savings: Arc::new(SavingsService::new(store.clone(), clock.clone())),
            loans: Arc::new(LoanService::new(store.clone(), clock.clone())),
            repayments: Arc::new(RepaymentService::new(store.clone(), clock.clone())),
            social_fund: Arc::new(SocialFundService::new(store.clone(), clock.clone())),
            penalties: Arc::new(PenaltyService::new(store.clone(), clock.clone())),
            settings: Arc::new(SettingsService::new(store.clone(), clock.clone())),
            reports: Arc::new(LedgerService::new(store, clock)),
        }
    }
}
