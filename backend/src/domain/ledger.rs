//! Ledger aggregation.
//!
//! Every figure here is a pure fold over transaction rows. Nothing is
//! cached or stored; summaries are recomputed on demand from the ledgers so
//! they cannot drift from the rows that back them. All folds are
//! commutative, so row order never changes a result.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::money::sum_money;
use super::{
    round_money, GroupId, GroupPolicy, Loan, LoanId, LoanStatus, Member, MemberId, MonthYear,
    Penalty, PenaltyStatus, Repayment, Saving, SavingStatus, SocialFundStatus,
    SocialFundTransaction, SocialFundTxType,
};

/// Sum of completed savings.
#[must_use]
pub fn total_savings<'a>(savings: impl IntoIterator<Item = &'a Saving>) -> Decimal {
    round_money(sum_money(
        savings
            .into_iter()
            .filter(|saving| saving.status == SavingStatus::Completed)
            .map(|saving| saving.amount.value()),
    ))
}

/// Sum of `total_amount` over disbursed and repaying loans.
///
/// Repayments do not reduce this figure; it reports the gross contractual
/// exposure of active loans.
#[must_use]
pub fn outstanding_loan_balance<'a>(loans: impl IntoIterator<Item = &'a Loan>) -> Decimal {
    round_money(sum_money(
        loans
            .into_iter()
            .filter(|loan| loan.status.is_active())
            .map(|loan| loan.total_amount),
    ))
}

/// Sum of unpaid penalties.
#[must_use]
pub fn unpaid_penalties<'a>(penalties: impl IntoIterator<Item = &'a Penalty>) -> Decimal {
    round_money(sum_money(
        penalties
            .into_iter()
            .filter(|penalty| penalty.status == PenaltyStatus::Unpaid)
            .map(|penalty| penalty.amount.value()),
    ))
}

/// Completed contributions minus approved or completed withdrawals.
///
/// Pending and rejected withdrawals never reduce the balance.
///
/// # Examples
/// ```
/// use village_bank::domain::social_fund_balance;
///
/// assert_eq!(social_fund_balance(&[]).to_string(), "0.00");
/// ```
#[must_use]
pub fn social_fund_balance<'a>(
    transactions: impl IntoIterator<Item = &'a SocialFundTransaction>,
) -> Decimal {
    round_money(sum_money(transactions.into_iter().map(|tx| {
        match (tx.transaction_type, tx.status) {
            (SocialFundTxType::Contribution, SocialFundStatus::Completed) => tx.amount.value(),
            (
                SocialFundTxType::Withdrawal,
                SocialFundStatus::Approved | SocialFundStatus::Completed,
            ) => -tx.amount.value(),
            _ => Decimal::ZERO,
        }
    })))
}

/// Sum of repayments.
#[must_use]
pub fn total_repaid<'a>(repayments: impl IntoIterator<Item = &'a Repayment>) -> Decimal {
    round_money(sum_money(repayments.into_iter().map(|r| r.amount.value())))
}

/// `total_savings × multiplier`, rounded to cents and saturating at
/// [`Decimal::MAX`].
#[must_use]
pub fn max_eligible_principal(total_savings: Decimal, multiplier: Decimal) -> Decimal {
    round_money(total_savings.saturating_mul(multiplier))
}

/// Every row of one group's ledgers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerSnapshot {
    /// Member register.
    pub members: Vec<Member>,
    /// Savings deposits.
    pub savings: Vec<Saving>,
    /// Loans.
    pub loans: Vec<Loan>,
    /// Repayments.
    pub repayments: Vec<Repayment>,
    /// Social fund transactions.
    pub social_fund: Vec<SocialFundTransaction>,
    /// Penalties.
    pub penalties: Vec<Penalty>,
}

impl LedgerSnapshot {
    /// Summary for one member.
    #[must_use]
    pub fn member_summary(&self, member_id: MemberId) -> MemberSummary {
        MemberSummary {
            member_id,
            total_savings: total_savings(self.savings.iter().filter(|s| s.member_id == member_id)),
            outstanding_loan_balance: outstanding_loan_balance(
                self.loans.iter().filter(|l| l.member_id == member_id),
            ),
            social_fund_balance: social_fund_balance(
                self.social_fund.iter().filter(|t| t.member_id == member_id),
            ),
            unpaid_penalties: unpaid_penalties(
                self.penalties.iter().filter(|p| p.member_id == member_id),
            ),
            total_repaid: total_repaid(self.repayments.iter().filter(|r| r.member_id == member_id)),
        }
    }

    /// Repaid sum per loan.
    #[must_use]
    pub fn repaid_by_loan(&self) -> HashMap<LoanId, Decimal> {
        self.repayments
            .iter()
            .fold(HashMap::new(), |mut acc, repayment| {
                let sum = acc.entry(repayment.loan_id).or_insert(Decimal::ZERO);
                *sum = sum.saturating_add(repayment.amount.value());
                acc
            })
    }

    /// Repaying loans whose repayments cover the contractual total.
    #[must_use]
    pub fn fully_repaid_loans(&self) -> Vec<(&Loan, Decimal)> {
        let repaid = self.repaid_by_loan();
        self.loans
            .iter()
            .filter(|loan| loan.status == LoanStatus::Repaying)
            .filter_map(|loan| {
                let sum = repaid.get(&loan.id).copied().unwrap_or(Decimal::ZERO);
                (sum >= loan.total_amount).then_some((loan, round_money(sum)))
            })
            .collect()
    }

    /// Ledger activity per reporting bucket, oldest month first.
    ///
    /// Savings, repayments and contributions are bucketed by their stored
    /// `month_year`; loans by the month of their disbursement date. Only
    /// completed deposits and contributions count, and loans that were never
    /// disbursed are left out.
    #[must_use]
    pub fn monthly_totals(&self) -> Vec<MonthlyTotals> {
        let mut months: BTreeMap<MonthYear, MonthlyTotals> = BTreeMap::new();

        for saving in self
            .savings
            .iter()
            .filter(|saving| saving.status == SavingStatus::Completed)
        {
            let bucket = MonthlyTotals::bucket(&mut months, saving.month_year);
            bucket.savings = bucket.savings.saturating_add(saving.amount.value());
        }
        for loan in &self.loans {
            if let Some(day) = loan.disbursement_date {
                let bucket = MonthlyTotals::bucket(&mut months, MonthYear::of(day));
                bucket.loans_disbursed = bucket
                    .loans_disbursed
                    .saturating_add(loan.principal_amount.value());
            }
        }
        for repayment in &self.repayments {
            let bucket = MonthlyTotals::bucket(&mut months, repayment.month_year);
            bucket.repayments = bucket.repayments.saturating_add(repayment.amount.value());
        }
        for tx in self.social_fund.iter().filter(|tx| {
            tx.transaction_type == SocialFundTxType::Contribution
                && tx.status == SocialFundStatus::Completed
        }) {
            let bucket = MonthlyTotals::bucket(&mut months, tx.month_year);
            bucket.social_fund_contributions =
                bucket.social_fund_contributions.saturating_add(tx.amount.value());
        }

        months
            .into_values()
            .map(|mut totals| {
                totals.savings = round_money(totals.savings);
                totals.loans_disbursed = round_money(totals.loans_disbursed);
                totals.repayments = round_money(totals.repayments);
                totals.social_fund_contributions = round_money(totals.social_fund_contributions);
                totals
            })
            .collect()
    }

    /// Group-wide dashboard.
    #[must_use]
    pub fn dashboard(&self, group_id: GroupId) -> GroupDashboard {
        GroupDashboard {
            group_id,
            total_members: self.members.iter().filter(|m| m.is_active()).count(),
            total_savings: total_savings(&self.savings),
            outstanding_loan_balance: outstanding_loan_balance(&self.loans),
            social_fund_balance: social_fund_balance(&self.social_fund),
            unpaid_penalties: unpaid_penalties(&self.penalties),
            total_repaid: total_repaid(&self.repayments),
            pending_loans: self
                .loans
                .iter()
                .filter(|l| l.status == LoanStatus::Pending)
                .count(),
            active_loans_count: self.loans.iter().filter(|l| l.status.is_active()).count(),
        }
    }

    /// Consistency report for the group under `policy`.
    #[must_use]
    pub fn reconcile(
        &self,
        group_id: GroupId,
        policy: &GroupPolicy,
        generated_at: DateTime<Utc>,
    ) -> ReconciliationReport {
        let dashboard = self.dashboard(group_id);
        let mut findings = Vec::new();

        if dashboard.social_fund_balance < Decimal::ZERO {
            findings.push(ReconciliationFinding::NegativeSocialFundBalance {
                balance: dashboard.social_fund_balance,
            });
        }

        for loan in self.loans.iter().filter(|loan| !loan.status.is_terminal()) {
            let savings = total_savings(self.savings.iter().filter(|s| s.member_id == loan.member_id));
            let max_eligible = max_eligible_principal(savings, policy.max_loan_multiplier);
            if loan.principal_amount.value() > max_eligible {
                findings.push(ReconciliationFinding::LoanExceedsEligibility {
                    loan_id: loan.id,
                    member_id: loan.member_id,
                    principal: loan.principal_amount.value(),
                    max_eligible_principal: max_eligible,
                });
            }
        }

        for (loan, repaid) in self.fully_repaid_loans() {
            findings.push(ReconciliationFinding::LoanFullyRepaid {
                loan_id: loan.id,
                total_amount: loan.total_amount,
                total_repaid: repaid,
            });
        }

        ReconciliationReport {
            group_id,
            generated_at,
            dashboard,
            findings,
        }
    }
}

/// Derived position of one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    /// Member summarised.
    pub member_id: MemberId,
    /// Completed savings.
    pub total_savings: Decimal,
    /// Gross total of active loans.
    pub outstanding_loan_balance: Decimal,
    /// Member's net social fund position.
    pub social_fund_balance: Decimal,
    /// Unpaid penalties.
    pub unpaid_penalties: Decimal,
    /// Repayments made.
    pub total_repaid: Decimal,
}

/// Advisory eligibility assessment for a loan request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanEligibility {
    /// Member assessed.
    pub member_id: MemberId,
    /// Completed savings.
    pub total_savings: Decimal,
    /// Multiplier in force.
    pub max_loan_multiplier: Decimal,
    /// Largest principal the member may request.
    pub max_eligible_principal: Decimal,
    /// Principal being assessed, if any.
    pub requested_principal: Option<Decimal>,
    /// Whether the requested principal is within the limit.
    pub eligible: bool,
}

impl LoanEligibility {
    /// Assess `requested` against a member's savings.
    ///
    /// # Examples
    /// ```
    /// use rust_decimal::Decimal;
    /// use village_bank::domain::{LoanEligibility, MemberId};
    ///
    /// let assessment = LoanEligibility::assess(
    ///     MemberId::random(),
    ///     Decimal::from(5_000),
    ///     Decimal::from(3),
    ///     Some(Decimal::from(20_000)),
    /// );
    /// assert_eq!(assessment.max_eligible_principal, Decimal::from(15_000));
    /// assert!(!assessment.eligible);
    /// ```
    #[must_use]
    pub fn assess(
        member_id: MemberId,
        total_savings: Decimal,
        multiplier: Decimal,
        requested: Option<Decimal>,
    ) -> Self {
        let max = max_eligible_principal(total_savings, multiplier);
        Self {
            member_id,
            total_savings,
            max_loan_multiplier: multiplier,
            max_eligible_principal: max,
            requested_principal: requested,
            eligible: requested.is_none_or(|principal| principal <= max),
        }
    }
}

/// Ledger activity within one `YYYY-MM` bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotals {
    /// Bucket summarised.
    pub month_year: MonthYear,
    /// Completed deposits.
    pub savings: Decimal,
    /// Principal paid out.
    pub loans_disbursed: Decimal,
    /// Repayments received.
    pub repayments: Decimal,
    /// Completed social fund contributions.
    pub social_fund_contributions: Decimal,
}

impl MonthlyTotals {
    fn bucket(
        months: &mut BTreeMap<MonthYear, Self>,
        month_year: MonthYear,
    ) -> &mut Self {
        months.entry(month_year).or_insert_with(|| Self {
            month_year,
            savings: Decimal::ZERO,
            loans_disbursed: Decimal::ZERO,
            repayments: Decimal::ZERO,
            social_fund_contributions: Decimal::ZERO,
        })
    }
}

/// Group-wide totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDashboard {
    /// Group summarised.
    pub group_id: GroupId,
    /// Active members.
    pub total_members: usize,
    /// Completed savings.
    pub total_savings: Decimal,
    /// Gross total of active loans.
    pub outstanding_loan_balance: Decimal,
    /// Social fund balance.
    pub social_fund_balance: Decimal,
    /// Unpaid penalties.
    pub unpaid_penalties: Decimal,
    /// Repayments received.
    pub total_repaid: Decimal,
    /// Loans awaiting a decision.
    pub pending_loans: usize,
    /// Disbursed or repaying loans.
    pub active_loans_count: usize,
}

/// One inconsistency found by reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ReconciliationFinding {
    /// Approved withdrawals exceed contributions.
    NegativeSocialFundBalance {
        /// Current balance.
        balance: Decimal,
    },
    /// An open loan exceeds what the member's savings now support.
    LoanExceedsEligibility {
        /// Loan flagged.
        loan_id: LoanId,
        /// Borrower.
        member_id: MemberId,
        /// Loan principal.
        principal: Decimal,
        /// Current limit.
        max_eligible_principal: Decimal,
    },
    /// A repaying loan has been paid in full but not closed.
    LoanFullyRepaid {
        /// Loan flagged.
        loan_id: LoanId,
        /// Contractual total.
        total_amount: Decimal,
        /// Repayments recorded.
        total_repaid: Decimal,
    },
}

/// Reconciliation output for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    /// Group checked.
    pub group_id: GroupId,
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
    /// Totals at report time.
    pub dashboard: GroupDashboard,
    /// Inconsistencies found.
    pub findings: Vec<ReconciliationFinding>,
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
