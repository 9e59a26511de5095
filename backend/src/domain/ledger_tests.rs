//! Tests for ledger folds, dashboards and reconciliation.

use chrono::{NaiveDate, Utc};
use rstest::{fixture, rstest};
use rust_decimal_macros::dec;

use super::*;
use crate::domain::{
    Amount, DurationMonths, InterestRate, LoanTerms, MemberDetails, MemberStatus, MonthYear,
    NewPenalty, NewSocialFundTx, PenaltyType, SavingId, UserId,
};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 10).expect("date")
}

fn money(value: Decimal) -> Amount {
    Amount::new(value).expect("positive amount")
}

fn saving(group_id: GroupId, member_id: MemberId, amount: Decimal, status: SavingStatus) -> Saving {
    Saving {
        id: SavingId::random(),
        group_id,
        member_id,
        amount: money(amount),
        deposit_date: day(),
        month_year: MonthYear::of(day()),
        status,
        notes: None,
        recorded_by: UserId::random(),
        created_at: Utc::now(),
    }
}

fn loan(group_id: GroupId, member_id: MemberId, principal: Decimal, status: LoanStatus) -> Loan {
    let mut loan = LoanTerms {
        member_id,
        principal: money(principal),
        interest_rate: None,
        duration_months: None,
        purpose: None,
    }
    .into_pending_loan(
        group_id,
        InterestRate::new(dec!(10)).expect("rate"),
        DurationMonths::new(3).expect("duration"),
        Utc::now(),
    )
    .expect("loan");
    loan.status = status;
    loan
}

fn fund_tx(
    group_id: GroupId,
    member_id: MemberId,
    amount: Decimal,
    kind: SocialFundTxType,
    status: SocialFundStatus,
) -> SocialFundTransaction {
    let request = NewSocialFundTx {
        member_id,
        amount: money(amount),
        transaction_date: day(),
        purpose: None,
    };
    let mut tx = match kind {
        SocialFundTxType::Contribution => request.into_contribution(group_id, Utc::now()),
        SocialFundTxType::Withdrawal => request.into_withdrawal(group_id, Utc::now()),
    };
    tx.status = status;
    tx
}

struct Fixture {
    group_id: GroupId,
    member_id: MemberId,
    snapshot: LedgerSnapshot,
}

#[fixture]
fn fixture() -> Fixture {
    let group_id = GroupId::random();
    let member = MemberDetails::new("Wanjiru", None, None, None, None)
        .expect("details")
        .into_member(group_id, MemberStatus::Active, day(), Utc::now());
    let member_id = member.id;
    let inactive = MemberDetails::new("Otieno", None, None, None, None)
        .expect("details")
        .into_member(group_id, MemberStatus::Inactive, day(), Utc::now());

    let snapshot = LedgerSnapshot {
        members: vec![member, inactive],
        savings: vec![
            saving(group_id, member_id, dec!(3000), SavingStatus::Completed),
            saving(group_id, member_id, dec!(2000), SavingStatus::Completed),
            saving(group_id, member_id, dec!(999), SavingStatus::Pending),
        ],
        loans: vec![
            loan(group_id, member_id, dec!(10000), LoanStatus::Disbursed),
            loan(group_id, member_id, dec!(1000), LoanStatus::Pending),
            loan(group_id, member_id, dec!(500), LoanStatus::Completed),
        ],
        repayments: Vec::new(),
        social_fund: vec![
            fund_tx(group_id, member_id, dec!(1000), SocialFundTxType::Contribution, SocialFundStatus::Completed),
            fund_tx(group_id, member_id, dec!(400), SocialFundTxType::Withdrawal, SocialFundStatus::Approved),
            fund_tx(group_id, member_id, dec!(300), SocialFundTxType::Withdrawal, SocialFundStatus::Pending),
            fund_tx(group_id, member_id, dec!(200), SocialFundTxType::Withdrawal, SocialFundStatus::Rejected),
        ],
        penalties: vec![NewPenalty {
            member_id,
            loan_id: None,
            amount: None,
            penalty_type: PenaltyType::Other,
            penalty_date: day(),
            reason: None,
        }
        .into_penalty(group_id, money(dec!(500)), Utc::now())],
    };
    Fixture {
        group_id,
        member_id,
        snapshot,
    }
}

#[rstest]
fn member_summary_folds_each_ledger(fixture: Fixture) {
    let summary = fixture.snapshot.member_summary(fixture.member_id);
    assert_eq!(summary.total_savings, dec!(5000.00));
    assert_eq!(summary.outstanding_loan_balance, dec!(11000.00));
    assert_eq!(summary.social_fund_balance, dec!(600.00));
    assert_eq!(summary.unpaid_penalties, dec!(500.00));
    assert_eq!(summary.total_repaid, dec!(0.00));
}

#[rstest]
fn dashboard_counts_active_members_and_loans(fixture: Fixture) {
    let dashboard = fixture.snapshot.dashboard(fixture.group_id);
    assert_eq!(dashboard.total_members, 1);
    assert_eq!(dashboard.pending_loans, 1);
    assert_eq!(dashboard.active_loans_count, 1);
}

#[rstest]
fn social_fund_balance_ignores_row_order(fixture: Fixture) {
    let forward = social_fund_balance(&fixture.snapshot.social_fund);
    let mut reversed = fixture.snapshot.social_fund.clone();
    reversed.reverse();
    assert_eq!(forward, social_fund_balance(&reversed));
    reversed.rotate_left(1);
    assert_eq!(forward, social_fund_balance(&reversed));
}

#[rstest]
fn savings_total_is_never_negative() {
    assert_eq!(total_savings(&[]), dec!(0.00));
    let group_id = GroupId::random();
    let rows = vec![saving(group_id, MemberId::random(), dec!(1), SavingStatus::Late)];
    assert!(total_savings(&rows) >= Decimal::ZERO);
}

#[rstest]
#[case(dec!(20000), false)]
#[case(dec!(15000), true)]
#[case(dec!(14999.99), true)]
fn eligibility_is_savings_times_multiplier(#[case] requested: Decimal, #[case] eligible: bool) {
    let assessment = LoanEligibility::assess(MemberId::random(), dec!(5000), dec!(3), Some(requested));
    assert_eq!(assessment.max_eligible_principal, dec!(15000.00));
    assert_eq!(assessment.eligible, eligible);
}

#[rstest]
fn reconcile_reports_every_finding(mut fixture: Fixture) {
    let group_id = fixture.group_id;
    let member_id = fixture.member_id;
    fixture.snapshot.social_fund.push(fund_tx(
        group_id,
        member_id,
        dec!(5000),
        SocialFundTxType::Withdrawal,
        SocialFundStatus::Approved,
    ));
    let repaying = loan(group_id, member_id, dec!(100), LoanStatus::Repaying);
    fixture.snapshot.repayments.push(Repayment {
        id: crate::domain::RepaymentId::random(),
        group_id,
        loan_id: repaying.id,
        member_id,
        amount: money(dec!(110)),
        payment_date: day(),
        month_year: MonthYear::of(day()),
        is_late: false,
        notes: None,
        recorded_by: UserId::random(),
        created_at: Utc::now(),
    });
    let repaying_id = repaying.id;
    fixture.snapshot.loans.push(repaying);

    let policy = GroupPolicy {
        max_loan_multiplier: dec!(1),
        ..GroupPolicy::default()
    };
    let report = fixture.snapshot.reconcile(group_id, &policy, Utc::now());

    assert!(report.findings.iter().any(|finding| matches!(
        finding,
        ReconciliationFinding::NegativeSocialFundBalance { balance } if *balance == dec!(-4400.00)
    )));
    assert!(report.findings.iter().any(|finding| matches!(
        finding,
        ReconciliationFinding::LoanExceedsEligibility { principal, .. } if *principal == dec!(10000.00)
    )));
    assert!(report.findings.iter().any(|finding| matches!(
        finding,
        ReconciliationFinding::LoanFullyRepaid { loan_id, .. } if *loan_id == repaying_id
    )));
}

#[rstest]
fn findings_serialise_with_kind_tag() {
    let finding = ReconciliationFinding::NegativeSocialFundBalance { balance: dec!(-1.00) };
    let json = serde_json::to_value(&finding).expect("serialise");
    assert_eq!(json["kind"], "negative_social_fund_balance");
    assert_eq!(json["balance"], "-1.00");
}

#[rstest]
fn monthly_totals_bucket_each_ledger(mut fixture: Fixture) {
    let group_id = fixture.group_id;
    let member_id = fixture.member_id;
    let february = NaiveDate::from_ymd_opt(2025, 2, 3).expect("date");
    fixture.snapshot.loans[0].disbursement_date = Some(february);
    fixture.snapshot.repayments.push(Repayment {
        id: crate::domain::RepaymentId::random(),
        group_id,
        loan_id: fixture.snapshot.loans[0].id,
        member_id,
        amount: money(dec!(3666.67)),
        payment_date: february,
        month_year: MonthYear::of(february),
        is_late: false,
        notes: None,
        recorded_by: UserId::random(),
        created_at: Utc::now(),
    });

    let months = fixture.snapshot.monthly_totals();
    let keys: Vec<String> = months.iter().map(|m| m.month_year.to_string()).collect();
    assert_eq!(keys, ["2025-01", "2025-02"]);

    let january = &months[0];
    assert_eq!(january.savings, dec!(5000.00));
    assert_eq!(january.social_fund_contributions, dec!(1000.00));
    assert_eq!(january.loans_disbursed, dec!(0.00));

    let february = &months[1];
    assert_eq!(february.loans_disbursed, dec!(10000.00));
    assert_eq!(february.repayments, dec!(3666.67));
    assert_eq!(february.savings, dec!(0.00));
}

#[rstest]
fn monthly_totals_of_an_empty_ledger_are_empty() {
    assert!(LedgerSnapshot::default().monthly_totals().is_empty());
}

#[rstest]
fn folds_near_the_amount_ceiling_do_not_overflow() {
    let group_id = GroupId::random();
    let member_id = MemberId::random();
    let rows: Vec<Saving> = (0..4)
        .map(|_| saving(group_id, member_id, crate::domain::MAX_AMOUNT, SavingStatus::Completed))
        .collect();
    let total = total_savings(&rows);
    assert_eq!(total, dec!(3999999999999.96));
    assert_eq!(max_eligible_principal(Decimal::MAX, dec!(100)), round_money(Decimal::MAX));
}
