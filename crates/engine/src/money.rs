use std::{
    fmt,
    ops::{Add, AddAssign, Sub},
    str::FromStr,
};

use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::EngineError;

/// Amount of money in integer cents.
///
/// Expense totals, shares, payments and fund balances all use it. The HTTP
/// layer exchanges it as a decimal string with two places ("40.00").
///
/// ```rust
/// use engine::MoneyCents;
///
/// let share: MoneyCents = "40.5".parse().unwrap();
/// assert_eq!(share.cents(), 4050);
/// assert_eq!(share.to_string(), "40.50");
/// assert!("0.125".parse::<MoneyCents>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// The amount in currency units, scale 2.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Parses a request amount that must be strictly positive.
    /// `label` names the field in the error.
    pub fn parse_positive(value: &str, label: &str) -> Result<Self, EngineError> {
        let amount: MoneyCents = value.parse()?;
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(format!("{label} must be > 0")));
        }
        Ok(amount)
    }

    /// `None` on overflow.
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }
}

impl TryFrom<Decimal> for MoneyCents {
    type Error = EngineError;

    /// Exact conversion: more than two significant decimals is an error.
    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value.normalize().scale() > 2 {
            return Err(EngineError::InvalidAmount(format!(
                "{value} has more than two decimals"
            )));
        }
        value
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .map(MoneyCents)
            .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))
    }
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidAmount("empty amount".to_string()));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
        {
            return Err(EngineError::InvalidAmount(format!("invalid amount: {trimmed}")));
        }
        let value = Decimal::from_str(trimmed)
            .map_err(|_| EngineError::InvalidAmount(format!("invalid amount: {trimmed}")))?;
        MoneyCents::try_from(value)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.to_decimal())
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 += rhs.0;
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 - rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_two_decimals() {
        assert_eq!(MoneyCents::ZERO.to_string(), "0.00");
        assert_eq!(MoneyCents::new(7).to_string(), "0.07");
        assert_eq!(MoneyCents::new(4000).to_string(), "40.00");
        assert_eq!(MoneyCents::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn parses_request_amounts() {
        assert_eq!("40".parse::<MoneyCents>().unwrap(), MoneyCents::new(4000));
        assert_eq!(" 33.3 ".parse::<MoneyCents>().unwrap(), MoneyCents::new(3330));
        assert_eq!("1500000.00".parse::<MoneyCents>().unwrap(), MoneyCents::new(150_000_000));
        // Trailing zeros beyond the cent are harmless.
        assert_eq!("2.500".parse::<MoneyCents>().unwrap(), MoneyCents::new(250));
    }

    #[test]
    fn rejects_malformed_amounts() {
        for raw in ["", "  ", "abc", "1e3", "12,50", "0.125", "1.2.3"] {
            assert!(raw.parse::<MoneyCents>().is_err(), "{raw:?} parsed");
        }
    }

    #[test]
    fn parse_positive_names_the_field() {
        assert_eq!(
            MoneyCents::parse_positive("0.00", "amount"),
            Err(EngineError::InvalidAmount("amount must be > 0".to_string()))
        );
        assert!(MoneyCents::parse_positive("-5", "amount").is_err());
        assert_eq!(
            MoneyCents::parse_positive("0.01", "amount").unwrap(),
            MoneyCents::new(1)
        );
    }

    #[test]
    fn decimal_round_trip() {
        assert_eq!(MoneyCents::new(12_345).to_decimal(), Decimal::new(12_345, 2));
        assert_eq!(
            MoneyCents::try_from(Decimal::new(12_345, 2)).unwrap(),
            MoneyCents::new(12_345)
        );
        assert!(MoneyCents::try_from(Decimal::new(1, 3)).is_err());
    }
}
