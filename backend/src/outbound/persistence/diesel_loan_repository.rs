//! PostgreSQL-backed loan and repayment adapters.
//!
//! Loan transitions are a single `UPDATE … WHERE status = from`; when no row
//! is touched the current status is re-read to report why.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{LoanRepository, RepaymentRepository, RepositoryError};
use crate::domain::{
    DurationMonths, GroupId, InterestRate, Loan, LoanFilter, LoanId, LoanTransition, MemberId,
    Repayment, RepaymentFilter, RepaymentId, UserId,
};
use crate::{query_optional, query_vec};

use super::diesel_helpers::{
    amount_column, cas_failure, map_diesel_error, map_pool_error, parse_column,
};
use super::models::{LoanRow, LoanTransitionUpdate, RepaymentRow};
use super::pool::DbPool;
use super::schema::{loans, repayments};

fn corrupt(column: &str, error: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::query(format!("corrupt {column} column: {error}"))
}

fn row_to_loan(row: LoanRow) -> Result<Loan, RepositoryError> {
    let months = u32::try_from(row.duration_months)
        .map_err(|error| corrupt("loans.duration_months", error))?;
    Ok(Loan {
        id: LoanId::from_uuid(row.id),
        group_id: GroupId::from_uuid(row.group_id),
        member_id: MemberId::from_uuid(row.member_id),
        principal_amount: amount_column(row.principal_amount, "loans.principal_amount")?,
        interest_rate: InterestRate::new(row.interest_rate)
            .map_err(|error| corrupt("loans.interest_rate", error))?,
        duration_months: DurationMonths::new(months)
            .map_err(|error| corrupt("loans.duration_months", error))?,
        total_amount: row.total_amount,
        status: parse_column(&row.status, "loans.status")?,
        purpose: row.purpose,
        approved_by: row.approved_by.map(UserId::from_uuid),
        approved_at: row.approved_at,
        disbursement_date: row.disbursement_date,
        due_date: row.due_date,
        created_at: row.created_at,
    })
}

fn loan_to_row(loan: &Loan) -> Result<LoanRow, RepositoryError> {
    let duration_months = i32::try_from(loan.duration_months.get())
        .map_err(|_| RepositoryError::query("loan duration out of range"))?;
    Ok(LoanRow {
        id: *loan.id.as_uuid(),
        group_id: *loan.group_id.as_uuid(),
        member_id: *loan.member_id.as_uuid(),
        principal_amount: loan.principal_amount.value(),
        interest_rate: loan.interest_rate.value(),
        duration_months,
        total_amount: loan.total_amount,
        status: loan.status.as_str().to_owned(),
        purpose: loan.purpose.clone(),
        approved_by: loan.approved_by.map(|id| *id.as_uuid()),
        approved_at: loan.approved_at,
        disbursement_date: loan.disbursement_date,
        due_date: loan.due_date,
        created_at: loan.created_at,
    })
}

fn row_to_repayment(row: RepaymentRow) -> Result<Repayment, RepositoryError> {
    Ok(Repayment {
        id: RepaymentId::from_uuid(row.id),
        group_id: GroupId::from_uuid(row.group_id),
        loan_id: LoanId::from_uuid(row.loan_id),
        member_id: MemberId::from_uuid(row.member_id),
        amount: amount_column(row.amount, "repayments.amount")?,
        payment_date: row.payment_date,
        month_year: parse_column(&row.month_year, "repayments.month_year")?,
        is_late: row.is_late,
        notes: row.notes,
        recorded_by: UserId::from_uuid(row.recorded_by),
        created_at: row.created_at,
    })
}

/// Diesel-backed implementation of [`LoanRepository`].
#[derive(Clone)]
pub struct DieselLoanRepository {
    pool: DbPool,
}

impl DieselLoanRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanRepository for DieselLoanRepository {
    async fn insert(&self, loan: &Loan) -> Result<(), RepositoryError> {
        let row = loan_to_row(loan)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(loans::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find(&self, group_id: &GroupId, id: &LoanId) -> Result<Option<Loan>, RepositoryError> {
        query_optional!(
            self,
            loans::table,
            loans::group_id
                .eq(group_id.as_uuid())
                .and(loans::id.eq(id.as_uuid())),
            LoanRow,
            row_to_loan
        )
    }

    async fn list(
        &self,
        group_id: &GroupId,
        filter: LoanFilter,
    ) -> Result<Vec<Loan>, RepositoryError> {
        let mut query = loans::table
            .filter(loans::group_id.eq(*group_id.as_uuid()))
            .order_by(loans::created_at.desc())
            .into_boxed();
        if let Some(member_id) = filter.member_id {
            query = query.filter(loans::member_id.eq(*member_id.as_uuid()));
        }
        if let Some(status) = filter.status {
            query = query.filter(loans::status.eq(status.as_str()));
        }
        query_vec!(self, query, LoanRow, row_to_loan)
    }

    async fn transition(
        &self,
        group_id: &GroupId,
        id: &LoanId,
        transition: &LoanTransition,
    ) -> Result<Loan, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = LoanTransitionUpdate {
            status: transition.to.as_str(),
            approved_by: transition.approved_by.map(|id| *id.as_uuid()),
            approved_at: transition.approved_at,
            disbursement_date: transition.disbursement_date,
        };
        let updated: Option<LoanRow> = diesel::update(
            loans::table
                .filter(loans::group_id.eq(group_id.as_uuid()))
                .filter(loans::id.eq(id.as_uuid()))
                .filter(loans::status.eq(transition.from.as_str())),
        )
        .set(&changes)
        .returning(LoanRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        match updated {
            Some(row) => row_to_loan(row),
            None => {
                let found: Option<String> = loans::table
                    .filter(loans::group_id.eq(group_id.as_uuid()))
                    .filter(loans::id.eq(id.as_uuid()))
                    .select(loans::status)
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?;
                Err(cas_failure("loan", transition.from.as_str(), found))
            }
        }
    }
}

/// Diesel-backed implementation of [`RepaymentRepository`].
#[derive(Clone)]
pub struct DieselRepaymentRepository {
    pool: DbPool,
}

impl DieselRepaymentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RepaymentRepository for DieselRepaymentRepository {
    async fn insert(&self, repayment: &Repayment) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = RepaymentRow {
            id: *repayment.id.as_uuid(),
            group_id: *repayment.group_id.as_uuid(),
            loan_id: *repayment.loan_id.as_uuid(),
            member_id: *repayment.member_id.as_uuid(),
            amount: repayment.amount.value(),
            payment_date: repayment.payment_date,
            month_year: repayment.month_year.to_string(),
            is_late: repayment.is_late,
            notes: repayment.notes.clone(),
            recorded_by: *repayment.recorded_by.as_uuid(),
            created_at: repayment.created_at,
        };
        diesel::insert_into(repayments::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list(
        &self,
        group_id: &GroupId,
        filter: RepaymentFilter,
    ) -> Result<Vec<Repayment>, RepositoryError> {
        let mut query = repayments::table
            .filter(repayments::group_id.eq(*group_id.as_uuid()))
            .order_by(repayments::created_at.desc())
            .into_boxed();
        if let Some(loan_id) = filter.loan_id {
            query = query.filter(repayments::loan_id.eq(*loan_id.as_uuid()));
        }
        if let Some(member_id) = filter.member_id {
            query = query.filter(repayments::member_id.eq(*member_id.as_uuid()));
        }
        query_vec!(self, query, RepaymentRow, row_to_repayment)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::domain::{Amount, LoanStatus, LoanTerms};

    #[rstest]
    fn loan_rows_round_trip_through_storage_columns() {
        let loan = LoanTerms {
            member_id: MemberId::random(),
            principal: Amount::new(dec!(10000)).expect("principal"),
            interest_rate: None,
            duration_months: None,
            purpose: Some("seed".to_owned()),
        }
        .into_pending_loan(
            GroupId::random(),
            InterestRate::new(dec!(10)).expect("rate"),
            DurationMonths::new(3).expect("duration"),
            Utc::now(),
        )
        .expect("loan");

        let row = loan_to_row(&loan).expect("row");
        assert_eq!(row.status, "pending");
        assert_eq!(row.duration_months, 3);
        assert_eq!(row_to_loan(row).expect("loan"), loan);
    }

    #[rstest]
    fn negative_durations_are_corrupt() {
        let loan = LoanTerms {
            member_id: MemberId::random(),
            principal: Amount::new(dec!(100)).expect("principal"),
            interest_rate: None,
            duration_months: None,
            purpose: None,
        }
        .into_pending_loan(
            GroupId::random(),
            InterestRate::new(dec!(0)).expect("rate"),
            DurationMonths::new(1).expect("duration"),
            Utc::now(),
        )
        .expect("loan");
        let mut row = loan_to_row(&loan).expect("row");
        row.duration_months = -1;
        row.status = LoanStatus::Repaying.as_str().to_owned();
        assert!(row_to_loan(row).is_err());
    }
}
