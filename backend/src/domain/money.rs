//! Monetary and calendar value objects.
//!
//! All money is fixed-point [`Decimal`] with at most two fractional digits.
//! Binary floating point never appears in ledger arithmetic.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of fractional digits carried by every stored amount.
pub const MONEY_SCALE: u32 = 2;

/// Largest amount a ledger column holds: `NUMERIC(14, 2)`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, MONEY_SCALE);

/// Validation errors for monetary and calendar values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyValidationError {
    /// Amount is zero or negative.
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    /// Value is negative where only non-negative values are allowed.
    #[error("value must not be negative")]
    NegativeValue,
    /// Amount exceeds [`MAX_AMOUNT`].
    #[error("amount must not exceed 999999999999.99")]
    TooLarge,
    /// Amount carries more than two fractional digits.
    #[error("amount must have at most 2 decimal places")]
    TooPrecise,
    /// Percentage outside `0..=100`.
    #[error("rate must be between 0 and 100")]
    RateOutOfRange,
    /// Loan duration of zero months.
    #[error("duration must be at least one month")]
    NonPositiveDuration,
    /// Month bucket not in `YYYY-MM` form.
    #[error("month_year must use the YYYY-MM format: {value}")]
    InvalidMonthYear {
        /// The rejected input.
        value: String,
    },
    /// Date arithmetic overflowed the supported calendar range.
    #[error("date is out of range")]
    DateOutOfRange,
}

/// Round to cents, midpoints away from zero, always carrying two digits.
///
/// # Examples
/// ```
/// use rust_decimal::Decimal;
/// use village_bank::domain::round_money;
///
/// let value = Decimal::new(10_005, 3); // 10.005
/// assert_eq!(round_money(value).to_string(), "10.01");
/// ```
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// A strictly positive amount of money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Validate and wrap a positive amount.
    ///
    /// # Errors
    /// Returns [`MoneyValidationError::NonPositiveAmount`] for zero or negative
    /// input, [`MoneyValidationError::TooLarge`] above [`MAX_AMOUNT`] and
    /// [`MoneyValidationError::TooPrecise`] for sub-cent values.
    pub fn new(value: Decimal) -> Result<Self, MoneyValidationError> {
        if value <= Decimal::ZERO {
            return Err(MoneyValidationError::NonPositiveAmount);
        }
        if value > MAX_AMOUNT {
            return Err(MoneyValidationError::TooLarge);
        }
        if value.normalize().scale() > MONEY_SCALE {
            return Err(MoneyValidationError::TooPrecise);
        }
        let mut scaled = value;
        scaled.rescale(MONEY_SCALE);
        Ok(Self(scaled))
    }

    /// The wrapped decimal value.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = MoneyValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Flat interest percentage applied once at loan creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct InterestRate(Decimal);

impl InterestRate {
    /// Interest-free.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Validate a percentage in `0..=100`.
    ///
    /// # Errors
    /// Returns [`MoneyValidationError::RateOutOfRange`] outside the range.
    pub fn new(value: Decimal) -> Result<Self, MoneyValidationError> {
        if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
            return Err(MoneyValidationError::RateOutOfRange);
        }
        Ok(Self(value))
    }

    /// The percentage as a decimal (10 means 10%).
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for InterestRate {
    type Error = MoneyValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<InterestRate> for Decimal {
    fn from(value: InterestRate) -> Self {
        value.0
    }
}

/// Loan term in whole months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct DurationMonths(u32);

impl DurationMonths {
    /// Shortest possible term.
    pub const ONE: Self = Self(1);

    /// Validate a positive month count.
    ///
    /// # Errors
    /// Returns [`MoneyValidationError::NonPositiveDuration`] for zero.
    pub const fn new(months: u32) -> Result<Self, MoneyValidationError> {
        if months == 0 {
            return Err(MoneyValidationError::NonPositiveDuration);
        }
        Ok(Self(months))
    }

    /// Number of months.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Add this duration to `start`, clamping to the last day of the month.
    ///
    /// # Errors
    /// Returns [`MoneyValidationError::DateOutOfRange`] on calendar overflow.
    pub fn after(self, start: NaiveDate) -> Result<NaiveDate, MoneyValidationError> {
        start
            .checked_add_months(Months::new(self.0))
            .ok_or(MoneyValidationError::DateOutOfRange)
    }
}

impl TryFrom<u32> for DurationMonths {
    type Error = MoneyValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DurationMonths> for u32 {
    fn from(value: DurationMonths) -> Self {
        value.0
    }
}

/// Reporting bucket key in `YYYY-MM` form.
///
/// # Examples
/// ```
/// use village_bank::domain::MonthYear;
///
/// let bucket: MonthYear = "2024-03".parse().expect("valid bucket");
/// assert_eq!(bucket.to_string(), "2024-03");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthYear {
    year: i32,
    month: u32,
}

impl MonthYear {
    /// Bucket containing `date`.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Calendar year.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Calendar month, 1-based.
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }
}

impl FromStr for MonthYear {
    type Err = MoneyValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || MoneyValidationError::InvalidMonthYear {
            value: value.to_owned(),
        };
        let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        Ok(Self { year, month })
    }
}

impl TryFrom<String> for MonthYear {
    type Error = MoneyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthYear> for String {
    fn from(value: MonthYear) -> Self {
        value.to_string()
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Contractual total for a flat-interest loan, rounded to cents.
///
/// # Examples
/// ```
/// use rust_decimal::Decimal;
/// use village_bank::domain::{loan_total, Amount, InterestRate};
///
/// let principal = Amount::new(Decimal::from(10_000)).expect("positive");
/// let rate = InterestRate::new(Decimal::from(10)).expect("in range");
/// assert_eq!(loan_total(principal, rate).expect("fits").to_string(), "11000.00");
/// ```
///
/// # Errors
/// Returns [`MoneyValidationError::TooLarge`] when the total would not fit a
/// ledger column.
pub fn loan_total(principal: Amount, rate: InterestRate) -> Result<Decimal, MoneyValidationError> {
    let factor = Decimal::ONE + rate.value() / Decimal::ONE_HUNDRED;
    let total = principal
        .value()
        .checked_mul(factor)
        .map(round_money)
        .ok_or(MoneyValidationError::TooLarge)?;
    if total > MAX_AMOUNT {
        return Err(MoneyValidationError::TooLarge);
    }
    Ok(total)
}

/// Apply a percentage to an amount, rounded to cents.
///
/// # Errors
/// Returns [`MoneyValidationError::TooLarge`] when the product overflows.
pub fn percent_of(base: Decimal, percent: Decimal) -> Result<Decimal, MoneyValidationError> {
    base.checked_mul(percent)
        .and_then(|product| product.checked_div(Decimal::ONE_HUNDRED))
        .map(round_money)
        .ok_or(MoneyValidationError::TooLarge)
}

/// Sum of amounts, saturating at [`Decimal::MAX`] instead of overflowing.
pub(crate) fn sum_money(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values
        .into_iter()
        .fold(Decimal::ZERO, |acc, value| acc.saturating_add(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-1))]
    fn amount_rejects_non_positive(#[case] value: Decimal) {
        assert_eq!(Amount::new(value), Err(MoneyValidationError::NonPositiveAmount));
    }

    #[rstest]
    fn amount_rejects_sub_cent_values() {
        assert_eq!(Amount::new(dec!(1.005)), Err(MoneyValidationError::TooPrecise));
    }

    #[rstest]
    fn amount_is_bounded_by_the_ledger_column() {
        assert_eq!(MAX_AMOUNT, dec!(999999999999.99));
        assert!(Amount::new(MAX_AMOUNT).is_ok());
        assert_eq!(
            Amount::new(dec!(1000000000000)),
            Err(MoneyValidationError::TooLarge)
        );
        assert_eq!(
            Amount::new(dec!(50000000000000000000000000000)),
            Err(MoneyValidationError::TooLarge)
        );
    }

    #[rstest]
    fn amount_accepts_trailing_zeros_and_rescales() {
        let amount = Amount::new(dec!(12.5000)).expect("valid amount");
        assert_eq!(amount.to_string(), "12.50");
    }

    #[rstest]
    #[case(dec!(-0.01), false)]
    #[case(dec!(0), true)]
    #[case(dec!(100), true)]
    #[case(dec!(100.01), false)]
    fn interest_rate_bounds(#[case] value: Decimal, #[case] ok: bool) {
        assert_eq!(InterestRate::new(value).is_ok(), ok);
    }

    #[rstest]
    #[case(dec!(10000), dec!(10), dec!(11000.00))]
    #[case(dec!(2500), dec!(0), dec!(2500.00))]
    #[case(dec!(333.33), dec!(7.5), dec!(358.33))]
    fn loan_total_is_flat_interest(
        #[case] principal: Decimal,
        #[case] rate: Decimal,
        #[case] expected: Decimal,
    ) {
        let principal = Amount::new(principal).expect("principal");
        let rate = InterestRate::new(rate).expect("rate");
        assert_eq!(loan_total(principal, rate), Ok(expected));
    }

    #[rstest]
    fn loan_total_refuses_totals_beyond_the_column() {
        let principal = Amount::new(MAX_AMOUNT).expect("principal");
        assert_eq!(
            loan_total(principal, InterestRate::new(dec!(100)).expect("rate")),
            Err(MoneyValidationError::TooLarge)
        );
        assert_eq!(loan_total(principal, InterestRate::ZERO), Ok(MAX_AMOUNT));
    }

    #[rstest]
    fn duration_after_clamps_to_month_end() {
        let start = NaiveDate::from_ymd_opt(2024, 11, 30).expect("date");
        let due = DurationMonths::new(3).expect("duration").after(start);
        assert_eq!(due, Ok(NaiveDate::from_ymd_opt(2025, 2, 28).expect("date")));
    }

    #[rstest]
    #[case("2024-1")]
    #[case("2024-13")]
    #[case("24-01")]
    #[case("2024/01")]
    fn month_year_rejects_malformed(#[case] raw: &str) {
        assert!(raw.parse::<MonthYear>().is_err());
    }

    #[rstest]
    fn month_year_of_date() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 4).expect("date");
        assert_eq!(MonthYear::of(date).to_string(), "2025-07");
    }

    #[rstest]
    fn percent_of_rounds_half_away_from_zero() {
        assert_eq!(percent_of(dec!(11000.00), dec!(2.5)), Ok(dec!(275.00)));
        assert_eq!(percent_of(dec!(0.10), dec!(5)), Ok(dec!(0.01)));
    }

    #[rstest]
    fn arithmetic_near_decimal_max_does_not_panic() {
        assert_eq!(
            percent_of(Decimal::MAX, dec!(100)),
            Err(MoneyValidationError::TooLarge)
        );
        assert_eq!(sum_money([Decimal::MAX, Decimal::MAX]), Decimal::MAX);
    }
}
