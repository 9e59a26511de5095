//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Enum columns
//! are `Varchar` holding the snake_case wire text of the domain enums; money
//! columns are `Numeric(14, 2)`.

diesel::table! {
    /// Village banks and their approval state.
    groups (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Nullable<Text>,
        location -> Nullable<Text>,
        status -> Varchar,
        created_by -> Uuid,
        reviewed_by -> Nullable<Uuid>,
        reviewed_at -> Nullable<Timestamptz>,
        admin_notes -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Platform users' roles within groups. Primary key `(group_id, user_id)`.
    group_memberships (group_id, user_id) {
        group_id -> Uuid,
        user_id -> Uuid,
        role -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Platform roles; users without a row are plain users.
    profiles (user_id) {
        user_id -> Uuid,
        platform_role -> Varchar,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Member register.
    members (id) {
        id -> Uuid,
        group_id -> Uuid,
        full_name -> Text,
        phone -> Nullable<Text>,
        email -> Nullable<Text>,
        national_id -> Nullable<Text>,
        address -> Nullable<Text>,
        status -> Varchar,
        join_date -> Date,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Savings deposits.
    savings (id) {
        id -> Uuid,
        group_id -> Uuid,
        member_id -> Uuid,
        amount -> Numeric,
        deposit_date -> Date,
        month_year -> Varchar,
        status -> Varchar,
        notes -> Nullable<Text>,
        recorded_by -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Loans; `total_amount` is fixed at insert.
    loans (id) {
        id -> Uuid,
        group_id -> Uuid,
        member_id -> Uuid,
        principal_amount -> Numeric,
        interest_rate -> Numeric,
        duration_months -> Int4,
        total_amount -> Numeric,
        status -> Varchar,
        purpose -> Nullable<Text>,
        approved_by -> Nullable<Uuid>,
        approved_at -> Nullable<Timestamptz>,
        disbursement_date -> Nullable<Date>,
        due_date -> Date,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Loan repayments.
    repayments (id) {
        id -> Uuid,
        group_id -> Uuid,
        loan_id -> Uuid,
        member_id -> Uuid,
        amount -> Numeric,
        payment_date -> Date,
        month_year -> Varchar,
        is_late -> Bool,
        notes -> Nullable<Text>,
        recorded_by -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Social fund contributions and withdrawals.
    social_fund_transactions (id) {
        id -> Uuid,
        group_id -> Uuid,
        member_id -> Uuid,
        amount -> Numeric,
        transaction_type -> Varchar,
        status -> Varchar,
        transaction_date -> Date,
        month_year -> Varchar,
        purpose -> Nullable<Text>,
        approved_by -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Penalties.
    penalties (id) {
        id -> Uuid,
        group_id -> Uuid,
        member_id -> Uuid,
        loan_id -> Nullable<Uuid>,
        amount -> Numeric,
        penalty_type -> Varchar,
        penalty_date -> Date,
        reason -> Nullable<Text>,
        status -> Varchar,
        paid_date -> Nullable<Date>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-group policy values. Primary key `(group_id, key)`.
    group_settings (group_id, key) {
        group_id -> Uuid,
        key -> Varchar,
        value -> Text,
        updated_by -> Nullable<Uuid>,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(group_memberships -> groups (group_id));
diesel::joinable!(members -> groups (group_id));
diesel::joinable!(savings -> members (member_id));
diesel::joinable!(loans -> members (member_id));
diesel::joinable!(repayments -> loans (loan_id));
diesel::joinable!(social_fund_transactions -> members (member_id));
diesel::joinable!(penalties -> members (member_id));
diesel::joinable!(group_settings -> groups (group_id));

diesel::allow_tables_to_appear_in_same_query!(
    groups,
    group_memberships,
    profiles,
    members,
    savings,
    loans,
    repayments,
    social_fund_transactions,
    penalties,
    group_settings,
);
