//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`) are implemented by the persistence adapters.
//! Driving ports are implemented by the domain services and consumed by the
//! HTTP adapter and the reconciliation CLI.

mod macros;
pub(crate) use macros::define_port_error;

mod access_control;
mod group_registry;
mod group_repository;
mod ledger_commands;
mod ledger_reports;
mod ledger_store;
mod loan_lifecycle;
mod loan_repository;
mod member_repository;
mod penalty_repository;
mod repayment_repository;
mod repository_error;
mod savings_repository;
mod settings_repository;
mod social_fund_repository;

#[cfg(test)]
pub use access_control::MockAccessControl;
pub use access_control::AccessControl;
#[cfg(test)]
pub use group_registry::{MockGroupRegistry, MockMemberDirectory};
pub use group_registry::{GroupRegistry, MemberDirectory};
#[cfg(test)]
pub use group_repository::{MockGroupRepository, MockMembershipRepository, MockProfileRepository};
pub use group_repository::{GroupRepository, MembershipRepository, ProfileRepository};
#[cfg(test)]
pub use ledger_commands::{
    MockPenaltyLedger, MockRepaymentLedger, MockSavingsLedger, MockSettingsStore,
    MockSocialFundLedger,
};
pub use ledger_commands::{
    PenaltyLedger, RepaymentLedger, SavingsLedger, SettingsStore, SocialFundLedger,
    SocialFundOverview,
};
#[cfg(test)]
pub use ledger_reports::MockLedgerReports;
pub use ledger_reports::LedgerReports;
pub use ledger_store::LedgerStore;
#[cfg(test)]
pub use loan_lifecycle::MockLoanLifecycle;
pub use loan_lifecycle::{LoanApplication, LoanLifecycle};
#[cfg(test)]
pub use loan_repository::MockLoanRepository;
pub use loan_repository::LoanRepository;
#[cfg(test)]
pub use member_repository::MockMemberRepository;
pub use member_repository::MemberRepository;
#[cfg(test)]
pub use penalty_repository::MockPenaltyRepository;
pub use penalty_repository::PenaltyRepository;
#[cfg(test)]
pub use repayment_repository::MockRepaymentRepository;
pub use repayment_repository::RepaymentRepository;
pub use repository_error::RepositoryError;
#[cfg(test)]
pub use savings_repository::MockSavingsRepository;
pub use savings_repository::SavingsRepository;
#[cfg(test)]
pub use settings_repository::MockSettingsRepository;
pub use settings_repository::SettingsRepository;
#[cfg(test)]
pub use social_fund_repository::MockSocialFundRepository;
pub use social_fund_repository::SocialFundRepository;
