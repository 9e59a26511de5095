//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Each repository port has one Diesel adapter here, all sharing a single
//! [`DbPool`]. Adapters only translate between row structs and domain types;
//! row structs (`models.rs`) and the `table!` definitions (`schema.rs`) stay
//! private to this module.
//!
//! Status changes are compare-and-swap `UPDATE`s guarded on the expected
//! status. When no row is touched the adapter re-reads the status so the
//! caller can tell a missing row from a stale one.
//!
//! ```ignore
//! use village_bank::outbound::persistence::{DbPool, PoolConfig, ledger_store};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/village_bank")).await?;
//! let store = ledger_store(pool);
//! ```

use std::sync::Arc;

use crate::domain::ports::LedgerStore;

pub(crate) mod diesel_helpers;
mod diesel_group_repository;
mod diesel_loan_repository;
mod diesel_member_repository;
mod diesel_penalty_repository;
mod diesel_savings_repository;
mod diesel_settings_repository;
mod diesel_social_fund_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_group_repository::{
    DieselGroupRepository, DieselMembershipRepository, DieselProfileRepository,
};
pub use diesel_loan_repository::{DieselLoanRepository, DieselRepaymentRepository};
pub use diesel_member_repository::DieselMemberRepository;
pub use diesel_penalty_repository::DieselPenaltyRepository;
pub use diesel_savings_repository::DieselSavingsRepository;
pub use diesel_settings_repository::DieselSettingsRepository;
pub use diesel_social_fund_repository::DieselSocialFundRepository;
pub use migrations::{run_migrations, run_migrations_blocking};
pub use pool::{DbPool, PoolConfig, PoolError};

/// Wire every Diesel adapter onto one pool.
pub fn ledger_store(pool: DbPool) -> LedgerStore {
    LedgerStore {
        groups: Arc::new(DieselGroupRepository::new(pool.clone())),
        memberships: Arc::new(DieselMembershipRepository::new(pool.clone())),
        profiles: Arc::new(DieselProfileRepository::new(pool.clone())),
        members: Arc::new(DieselMemberRepository::new(pool.clone())),
        savings: Arc::new(DieselSavingsRepository::new(pool.clone())),
        loans: Arc::new(DieselLoanRepository::new(pool.clone())),
        repayments: Arc::new(DieselRepaymentRepository::new(pool.clone())),
        social_fund: Arc::new(DieselSocialFundRepository::new(pool.clone())),
        penalties: Arc::new(DieselPenaltyRepository::new(pool.clone())),
        settings: Arc::new(DieselSettingsRepository::new(pool)),
    }
}
