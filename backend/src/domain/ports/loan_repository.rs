//! Port for loan records.

use async_trait::async_trait;

use crate::domain::{GroupId, Loan, LoanFilter, LoanId, LoanTransition};

use super::RepositoryError;

/// Storage for loans.
///
/// `transition` must be atomic: the row is updated only while its status
/// equals `transition.from`. When nothing is updated the adapter re-reads
/// the row and reports [`RepositoryError::Missing`] or
/// [`RepositoryError::StatusMismatch`] with the status found.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// Insert a new pending loan.
    async fn insert(&self, loan: &Loan) -> Result<(), RepositoryError>;

    /// Fetch a loan of the group.
    async fn find(&self, group_id: &GroupId, id: &LoanId) -> Result<Option<Loan>, RepositoryError>;

    /// List loans, newest first.
    async fn list(&self, group_id: &GroupId, filter: LoanFilter)
    -> Result<Vec<Loan>, RepositoryError>;

    /// Compare-and-swap the loan status and set the transition's fields.
    async fn transition(
        &self,
        group_id: &GroupId,
        id: &LoanId,
        transition: &LoanTransition,
    ) -> Result<Loan, RepositoryError>;
}
