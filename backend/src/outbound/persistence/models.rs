//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Enums travel as their wire text and
//! money as `Decimal`; the repositories convert rows back into validated
//! domain values.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::schema::{
    group_memberships, group_settings, groups, loans, members, penalties, profiles, repayments,
    savings, social_fund_transactions,
};

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Row struct for the groups table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GroupRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: String,
    pub created_by: Uuid,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Changeset for profile edits.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = groups)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct GroupProfileUpdate<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub location: Option<&'a str>,
}

/// Changeset applied by a review.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = groups)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct GroupReviewUpdate<'a> {
    pub status: &'a str,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub admin_notes: Option<&'a str>,
}

/// Row struct for the group_memberships table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = group_memberships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MembershipRow {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading platform roles.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProfileRecord {
    pub user_id: Uuid,
    pub platform_role: String,
}

/// Insertable struct for upserting platform roles.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = profiles)]
pub(crate) struct ProfileRow<'a> {
    pub user_id: Uuid,
    pub platform_role: &'a str,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

/// Row struct for the members table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MemberRow {
    pub id: Uuid,
    pub group_id: Uuid,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub national_id: Option<String>,
    pub address: Option<String>,
    pub status: String,
    pub join_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Changeset for contact and status edits. `group_id` is deliberately absent.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = members)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct MemberUpdateRow<'a> {
    pub full_name: &'a str,
    pub phone: Option<&'a str>,
    pub email: Option<&'a str>,
    pub national_id: Option<&'a str>,
    pub address: Option<&'a str>,
    pub status: &'a str,
}

// ---------------------------------------------------------------------------
// Ledgers
// ---------------------------------------------------------------------------

/// Row struct for the savings table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = savings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SavingRow {
    pub id: Uuid,
    pub group_id: Uuid,
    pub member_id: Uuid,
    pub amount: Decimal,
    pub deposit_date: NaiveDate,
    pub month_year: String,
    pub status: String,
    pub notes: Option<String>,
    pub recorded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Row struct for the loans table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = loans)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LoanRow {
    pub id: Uuid,
    pub group_id: Uuid,
    pub member_id: Uuid,
    pub principal_amount: Decimal,
    pub interest_rate: Decimal,
    pub duration_months: i32,
    pub total_amount: Decimal,
    pub status: String,
    pub purpose: Option<String>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub disbursement_date: Option<NaiveDate>,
    pub due_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Changeset written by a loan transition. `None` fields are left alone.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = loans)]
pub(crate) struct LoanTransitionUpdate<'a> {
    pub status: &'a str,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub disbursement_date: Option<NaiveDate>,
}

/// Row struct for the repayments table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = repayments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RepaymentRow {
    pub id: Uuid,
    pub group_id: Uuid,
    pub loan_id: Uuid,
    pub member_id: Uuid,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub month_year: String,
    pub is_late: bool,
    pub notes: Option<String>,
    pub recorded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Row struct for the social_fund_transactions table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = social_fund_transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SocialFundRow {
    pub id: Uuid,
    pub group_id: Uuid,
    pub member_id: Uuid,
    pub amount: Decimal,
    pub transaction_type: String,
    pub status: String,
    pub transaction_date: NaiveDate,
    pub month_year: String,
    pub purpose: Option<String>,
    pub approved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Row struct for the penalties table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = penalties)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PenaltyRow {
    pub id: Uuid,
    pub group_id: Uuid,
    pub member_id: Uuid,
    pub loan_id: Option<Uuid>,
    pub amount: Decimal,
    pub penalty_type: String,
    pub penalty_date: NaiveDate,
    pub reason: Option<String>,
    pub status: String,
    pub paid_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Row struct for the group_settings table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = group_settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SettingRow {
    pub group_id: Uuid,
    pub key: String,
    pub value: String,
    pub updated_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}
