//! Per-group policy settings.
//!
//! Settings are stored as validated text per `(group, key)`. Services never
//! read individual keys; they take a [`GroupPolicy`] snapshot once at the
//! start of an operation so one request always applies one policy.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::string_enum::define_string_enum;
use super::{DurationMonths, GroupId, InterestRate, UserId, MAX_AMOUNT};

/// Largest savings multiple a group may lend against.
const MAX_LOAN_MULTIPLIER: Decimal = Decimal::ONE_HUNDRED;

define_string_enum! {
    /// Known policy keys.
    pub enum SettingKey ("setting key") {
        /// Default flat interest percentage for new loans.
        InterestRate => "interest_rate",
        /// Savings multiple a member may borrow.
        MaxLoanMultiplier => "max_loan_multiplier",
        /// Flat penalty for a late deposit.
        LateDepositPenalty => "late_deposit_penalty",
        /// Percentage of the loan total charged for a late repayment.
        LateRepaymentPenaltyPercent => "late_repayment_penalty_percent",
        /// Expected monthly savings per member.
        MonthlySavingsAmount => "monthly_savings_amount",
        /// Expected monthly social fund contribution per member.
        SocialFundAmount => "social_fund_amount",
        /// Default loan term in months.
        LoanDurationMonths => "loan_duration_months",
        /// ISO 4217 currency code used for display.
        Currency => "currency",
        /// Whether ordinary members may record their own deposits.
        AllowMemberDeposits => "allow_member_deposits",
        /// Whether ineligible loan requests are refused outright.
        EnforceLoanEligibility => "enforce_loan_eligibility",
    }
}

/// Rejected setting value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value for {key}: {reason}")]
pub struct SettingValueError {
    /// Key being written.
    pub key: SettingKey,
    /// Why the value was refused.
    pub reason: &'static str,
}

impl SettingKey {
    /// Value applied when the group has not stored one.
    #[must_use]
    pub const fn default_value(self) -> &'static str {
        match self {
            Self::InterestRate => "10",
            Self::MaxLoanMultiplier => "3",
            Self::LateDepositPenalty
            | Self::LateRepaymentPenaltyPercent
            | Self::MonthlySavingsAmount
            | Self::SocialFundAmount => "0",
            Self::LoanDurationMonths => "3",
            Self::Currency => "KES",
            Self::AllowMemberDeposits | Self::EnforceLoanEligibility => "false",
        }
    }

    /// Validate `raw` for this key and return its canonical text.
    ///
    /// # Errors
    /// Returns [`SettingValueError`] when the value has the wrong shape or
    /// range for the key.
    ///
    /// # Examples
    /// ```
    /// use village_bank::domain::SettingKey;
    ///
    /// assert_eq!(SettingKey::Currency.normalise("kes"), Ok("KES".to_owned()));
    /// assert!(SettingKey::InterestRate.normalise("150").is_err());
    /// ```
    pub fn normalise(self, raw: &str) -> Result<String, SettingValueError> {
        let value = raw.trim();
        let fail = |reason| SettingValueError { key: self, reason };
        match self {
            Self::InterestRate | Self::LateRepaymentPenaltyPercent => {
                let parsed = parse_decimal(value).ok_or_else(|| fail("expected a decimal"))?;
                InterestRate::new(parsed).map_err(|_| fail("expected a percentage 0-100"))?;
                Ok(parsed.normalize().to_string())
            }
            Self::MaxLoanMultiplier => {
                let parsed = parse_decimal(value).ok_or_else(|| fail("expected a decimal"))?;
                if parsed < Decimal::ZERO {
                    return Err(fail("must not be negative"));
                }
                if parsed > MAX_LOAN_MULTIPLIER {
                    return Err(fail("must not exceed 100"));
                }
                Ok(parsed.normalize().to_string())
            }
            Self::LateDepositPenalty | Self::MonthlySavingsAmount | Self::SocialFundAmount => {
                let parsed = parse_decimal(value).ok_or_else(|| fail("expected a decimal"))?;
                if parsed < Decimal::ZERO {
                    return Err(fail("must not be negative"));
                }
                if parsed > MAX_AMOUNT {
                    return Err(fail("must not exceed 999999999999.99"));
                }
                Ok(parsed.normalize().to_string())
            }
            Self::LoanDurationMonths => {
                let months: u32 = value
                    .parse()
                    .map_err(|_| fail("expected a whole number of months"))?;
                DurationMonths::new(months).map_err(|_| fail("must be at least one month"))?;
                Ok(months.to_string())
            }
            Self::Currency => {
                if value.len() == 3 && value.chars().all(|c| c.is_ascii_alphabetic()) {
                    Ok(value.to_ascii_uppercase())
                } else {
                    Err(fail("expected a three-letter currency code"))
                }
            }
            Self::AllowMemberDeposits | Self::EnforceLoanEligibility => parse_bool(value)
                .map(|flag| flag.to_string())
                .ok_or_else(|| fail("expected true or false")),
        }
    }
}

fn parse_decimal(value: &str) -> Option<Decimal> {
    value.parse::<Decimal>().ok()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// A stored setting row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    /// Owning group.
    pub group_id: GroupId,
    /// Policy key.
    pub key: SettingKey,
    /// Canonical value text.
    pub value: String,
    /// Last editor.
    pub updated_by: Option<UserId>,
    /// Last edit time.
    pub updated_at: DateTime<Utc>,
}

/// A key with the value currently in force.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveSetting {
    /// Policy key.
    pub key: SettingKey,
    /// Value in force.
    pub value: String,
    /// Whether the value is the built-in default.
    pub is_default: bool,
    /// Last editor, when stored.
    pub updated_by: Option<UserId>,
    /// Last edit time, when stored.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Resolve every known key against the stored rows.
#[must_use]
pub fn effective_settings(stored: &[Setting]) -> Vec<EffectiveSetting> {
    SettingKey::ALL
        .iter()
        .map(|key| match stored.iter().find(|row| row.key == *key) {
            Some(row) => EffectiveSetting {
                key: *key,
                value: row.value.clone(),
                is_default: false,
                updated_by: row.updated_by,
                updated_at: Some(row.updated_at),
            },
            None => EffectiveSetting {
                key: *key,
                value: key.default_value().to_owned(),
                is_default: true,
                updated_by: None,
                updated_at: None,
            },
        })
        .collect()
}

/// Typed snapshot of a group's policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPolicy {
    /// Default interest rate for new loans.
    pub interest_rate: InterestRate,
    /// Savings multiple a member may borrow.
    pub max_loan_multiplier: Decimal,
    /// Flat late deposit penalty.
    pub late_deposit_penalty: Decimal,
    /// Late repayment penalty as a percentage of the loan total.
    pub late_repayment_penalty_percent: Decimal,
    /// Expected monthly savings.
    pub monthly_savings_amount: Decimal,
    /// Expected monthly social fund contribution.
    pub social_fund_amount: Decimal,
    /// Default loan term.
    pub loan_duration_months: DurationMonths,
    /// Display currency.
    pub currency: String,
    /// Whether members may record their own deposits.
    pub allow_member_deposits: bool,
    /// Whether ineligible loan requests are refused.
    pub enforce_loan_eligibility: bool,
}

impl Default for GroupPolicy {
    fn default() -> Self {
        Self::from_settings(&[])
    }
}

impl GroupPolicy {
    /// Build the snapshot from stored rows, falling back to defaults for
    /// missing keys and for stored values that no longer validate.
    #[must_use]
    pub fn from_settings(stored: &[Setting]) -> Self {
        let text = |key: SettingKey| -> String {
            stored
                .iter()
                .find(|row| row.key == key)
                .and_then(|row| match key.normalise(&row.value) {
                    Ok(value) => Some(value),
                    Err(error) => {
                        warn!(group_id = %row.group_id, %error, "ignoring invalid stored setting");
                        None
                    }
                })
                .unwrap_or_else(|| key.default_value().to_owned())
        };
        let decimal = |key: SettingKey| parse_decimal(&text(key)).unwrap_or(Decimal::ZERO);
        let flag = |key: SettingKey| parse_bool(&text(key)).unwrap_or(false);

        Self {
            interest_rate: InterestRate::new(decimal(SettingKey::InterestRate))
                .unwrap_or_else(|_| default_interest_rate()),
            max_loan_multiplier: decimal(SettingKey::MaxLoanMultiplier),
            late_deposit_penalty: decimal(SettingKey::LateDepositPenalty),
            late_repayment_penalty_percent: decimal(SettingKey::LateRepaymentPenaltyPercent),
            monthly_savings_amount: decimal(SettingKey::MonthlySavingsAmount),
            social_fund_amount: decimal(SettingKey::SocialFundAmount),
            loan_duration_months: text(SettingKey::LoanDurationMonths)
                .parse::<u32>()
                .ok()
                .and_then(|months| DurationMonths::new(months).ok())
                .unwrap_or_else(default_duration),
            currency: text(SettingKey::Currency),
            allow_member_deposits: flag(SettingKey::AllowMemberDeposits),
            enforce_loan_eligibility: flag(SettingKey::EnforceLoanEligibility),
        }
    }
}

fn default_interest_rate() -> InterestRate {
    InterestRate::new(Decimal::TEN).unwrap_or(InterestRate::ZERO)
}

fn default_duration() -> DurationMonths {
    DurationMonths::new(3).unwrap_or(DurationMonths::ONE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn row(key: SettingKey, value: &str) -> Setting {
        Setting {
            group_id: GroupId::random(),
            key,
            value: value.to_owned(),
            updated_by: None,
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    fn defaults_match_documented_values() {
        let policy = GroupPolicy::default();
        assert_eq!(policy.interest_rate.value(), dec!(10));
        assert_eq!(policy.max_loan_multiplier, dec!(3));
        assert_eq!(policy.loan_duration_months.get(), 3);
        assert_eq!(policy.currency, "KES");
        assert!(!policy.allow_member_deposits);
        assert!(!policy.enforce_loan_eligibility);
    }

    #[rstest]
    fn stored_values_override_defaults() {
        let policy = GroupPolicy::from_settings(&[
            row(SettingKey::MaxLoanMultiplier, "2.5"),
            row(SettingKey::AllowMemberDeposits, "true"),
            row(SettingKey::LoanDurationMonths, "6"),
        ]);
        assert_eq!(policy.max_loan_multiplier, dec!(2.5));
        assert!(policy.allow_member_deposits);
        assert_eq!(policy.loan_duration_months.get(), 6);
    }

    #[rstest]
    fn invalid_stored_values_fall_back() {
        let policy = GroupPolicy::from_settings(&[row(SettingKey::InterestRate, "abc")]);
        assert_eq!(policy.interest_rate.value(), dec!(10));
    }

    #[rstest]
    #[case(SettingKey::InterestRate, "12.50", Ok("12.5"))]
    #[case(SettingKey::InterestRate, "-1", Err(()))]
    #[case(SettingKey::MaxLoanMultiplier, "-2", Err(()))]
    #[case(SettingKey::MaxLoanMultiplier, "100", Ok("100"))]
    #[case(SettingKey::MaxLoanMultiplier, "100.5", Err(()))]
    #[case(SettingKey::LateDepositPenalty, "1000000000000", Err(()))]
    #[case(SettingKey::LoanDurationMonths, "0", Err(()))]
    #[case(SettingKey::LoanDurationMonths, "12", Ok("12"))]
    #[case(SettingKey::Currency, "usd", Ok("USD"))]
    #[case(SettingKey::Currency, "US", Err(()))]
    #[case(SettingKey::AllowMemberDeposits, "YES", Ok("true"))]
    fn normalise_validates_per_key(
        #[case] key: SettingKey,
        #[case] raw: &str,
        #[case] expected: Result<&str, ()>,
    ) {
        let actual = key.normalise(raw).map_err(|_| ());
        assert_eq!(actual.as_deref().map_err(|_| ()), expected);
    }

    #[rstest]
    fn effective_settings_cover_every_key() {
        let effective = effective_settings(&[row(SettingKey::Currency, "UGX")]);
        assert_eq!(effective.len(), SettingKey::ALL.len());
        let currency = effective
            .iter()
            .find(|setting| setting.key == SettingKey::Currency)
            .expect("currency present");
        assert_eq!(currency.value, "UGX");
        assert!(!currency.is_default);
        assert!(effective
            .iter()
            .filter(|setting| setting.key != SettingKey::Currency)
            .all(|setting| setting.is_default));
    }
}
