//! Repayment ledger service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::ports::{LedgerStore, RepaymentLedger, RepositoryError};
use crate::domain::service_support::not_found;
use crate::domain::{
    invalid_loan_transition, Capability, Error, GroupAccess, LoanStatus, LoanTransition,
    NewRepayment, Repayment, RepaymentFilter,
};

/// Implements [`RepaymentLedger`].
#[derive(Clone)]
pub struct RepaymentService {
    store: LedgerStore,
    clock: Arc<dyn Clock>,
}

impl RepaymentService {
    /// Create the service.
    pub fn new(store: LedgerStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

#[async_trait]
impl RepaymentLedger for RepaymentService {
    async fn record_repayment(
        &self,
        access: &GroupAccess,
        request: NewRepayment,
    ) -> Result<Repayment, Error> {
        access.require_mutation(Capability::RecordRepayments)?;
        let loan = self
            .store
            .loans
            .find(access.group_id(), &request.loan_id)
            .await?
            .ok_or_else(|| not_found("loan", &request.loan_id))?;
        if !loan.status.is_active() {
            return Err(invalid_loan_transition(loan.status, LoanStatus::Repaying));
        }

        let repayment = request.into_repayment(&loan, *access.user_id(), self.clock.utc());
        self.store.repayments.insert(&repayment).await?;
        info!(
            group_id = %repayment.group_id,
            loan_id = %repayment.loan_id,
            repayment_id = %repayment.id,
            amount = %repayment.amount,
            "repayment recorded"
        );

        if loan.status == LoanStatus::Disbursed {
            match self
                .store
                .loans
                .transition(access.group_id(), &loan.id, &LoanTransition::start_repaying())
                .await
            {
                Ok(_) => info!(loan_id = %loan.id, "loan entered repayment"),
                // Another repayment got there first.
                Err(RepositoryError::StatusMismatch { actual, .. }) => {
                    debug!(loan_id = %loan.id, %actual, "loan already left disbursed");
                }
                Err(other) => return Err(other.into()),
            }
        }
        Ok(repayment)
    }

    async fn list_repayments(
        &self,
        access: &GroupAccess,
        filter: RepaymentFilter,
    ) -> Result<Vec<Repayment>, Error> {
        Ok(self.store.repayments.list(access.group_id(), filter).await?)
    }
}
