use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Fixed-point decimal with 4 decimal places, stored as a scaled integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Amount(i64);

/// Error returned when text cannot be read as an [`Amount`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseAmountError {
    #[error("'{0}' is not a valid amount")]
    Invalid(String),
    #[error("'{0}' is out of range")]
    OutOfRange(String),
}

impl Amount {
    const SCALE: i64 = 10_000;
    const DECIMALS: usize = 4;

    pub const ZERO: Amount = Amount(0);

    pub fn from_scaled(value: i64) -> Self {
        Amount(value)
    }

    /// Whole currency units, e.g. `Amount::from_units(20)` is `20.0000`.
    pub fn from_units(units: i64) -> Self {
        Amount(units * Self::SCALE)
    }

    pub fn scaled(self) -> i64 {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// `None` when the result does not fit.
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    /// Total of every amount, or `None` on overflow.
    pub fn checked_sum(amounts: impl IntoIterator<Item = Amount>) -> Option<Amount> {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, |acc, amount| acc.checked_add(amount))
    }

    /// True when the amount has no fractional part and its whole part divides by `units`.
    pub fn is_multiple_of_units(self, units: i64) -> bool {
        self.0 % (units * Self::SCALE) == 0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        let whole = abs / Self::SCALE;
        let frac = abs % Self::SCALE;
        write!(f, "{sign}{whole}.{frac:04}")
    }
}

impl FromStr for Amount {
    type Err = ParseAmountError;

    /// Parse a plain decimal. Digits past the fourth decimal are rounded half away from zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = || ParseAmountError::Invalid(text.to_string());
        let out_of_range = || ParseAmountError::OutOfRange(text.to_string());

        let (negative, digits) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| out_of_range())?
        };

        let kept = &frac[..frac.len().min(Self::DECIMALS)];
        let mut frac_value: i64 = if kept.is_empty() { 0 } else { kept.parse().map_err(|_| invalid())? };
        for _ in kept.len()..Self::DECIMALS {
            frac_value *= 10;
        }
        if frac.as_bytes().get(Self::DECIMALS).is_some_and(|b| *b >= b'5') {
            frac_value += 1;
        }

        let scaled = whole
            .checked_mul(Self::SCALE)
            .and_then(|v| v.checked_add(frac_value))
            .ok_or_else(out_of_range)?;

        Ok(Amount(if negative { -scaled } else { scaled }))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

impl std::ops::Neg for Amount {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Amount(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_whole_number() {
        assert_eq!("500".parse::<Amount>(), Ok(Amount::from_units(500)));
        assert_eq!("+7".parse::<Amount>(), Ok(Amount::from_units(7)));
    }

    #[test]
    fn parse_decimals() {
        assert_eq!("1.5".parse::<Amount>(), Ok(Amount::from_scaled(15_000)));
        assert_eq!("0.0001".parse::<Amount>(), Ok(Amount::from_scaled(1)));
        assert_eq!(".25".parse::<Amount>(), Ok(Amount::from_scaled(2_500)));
        assert_eq!("3.".parse::<Amount>(), Ok(Amount::from_units(3)));
    }

    #[test]
    fn parse_six_decimals_from_legacy_files() {
        assert_eq!("500.000000".parse::<Amount>(), Ok(Amount::from_units(500)));
        assert_eq!("12.345678".parse::<Amount>(), Ok(Amount::from_scaled(123_457)));
    }

    #[test]
    fn parse_rounds_half_away_from_zero() {
        assert_eq!("1.23456".parse::<Amount>(), Ok(Amount::from_scaled(12_346)));
        assert_eq!("1.23454".parse::<Amount>(), Ok(Amount::from_scaled(12_345)));
        assert_eq!("-1.23455".parse::<Amount>(), Ok(Amount::from_scaled(-12_346)));
    }

    #[test]
    fn parse_handles_negative() {
        assert_eq!("-50.25".parse::<Amount>(), Ok(Amount::from_scaled(-502_500)));
    }

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!(" 10 ".parse::<Amount>(), Ok(Amount::from_units(10)));
    }

    #[test]
    fn parse_rejects_garbage() {
        for text in ["", "-", ".", "abc", "1,5", "1.2.3", "1e5", "--1"] {
            assert!(
                matches!(text.parse::<Amount>(), Err(ParseAmountError::Invalid(_))),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn parse_rejects_overflow() {
        assert!(matches!(
            "99999999999999999999".parse::<Amount>(),
            Err(ParseAmountError::OutOfRange(_))
        ));
    }

    #[test]
    fn display_formats_positive() {
        assert_eq!(Amount::from_scaled(1_000_000).to_string(), "100.0000");
        assert_eq!(Amount::from_scaled(15_000).to_string(), "1.5000");
        assert_eq!(Amount::from_scaled(1).to_string(), "0.0001");
        assert_eq!(Amount::from_scaled(0).to_string(), "0.0000");
    }

    #[test]
    fn display_formats_negative() {
        assert_eq!(Amount::from_scaled(-502_500).to_string(), "-50.2500");
        assert_eq!(Amount::from_scaled(-1).to_string(), "-0.0001");
    }

    #[test]
    fn display_output_parses_back() {
        let amount = Amount::from_scaled(-123_456_789);
        assert_eq!(amount.to_string().parse::<Amount>(), Ok(amount));
    }

    #[test]
    fn default_is_zero() {
        assert_eq!(Amount::default(), Amount::ZERO);
    }

    #[test]
    fn checked_arithmetic() {
        let a = Amount::from_scaled(100);
        let b = Amount::from_scaled(30);
        assert_eq!(a.checked_add(b), Some(Amount::from_scaled(130)));
        assert_eq!(a.checked_sub(b), Some(Amount::from_scaled(70)));
        assert_eq!(-a, Amount::from_scaled(-100));
    }

    #[test]
    fn checked_arithmetic_detects_overflow() {
        let near_max = Amount::from_scaled(i64::MAX - 5);
        assert_eq!(near_max.checked_add(Amount::from_scaled(6)), None);
        assert_eq!((-near_max).checked_sub(Amount::from_scaled(10)), None);
        assert_eq!(
            near_max.checked_add(Amount::from_scaled(5)),
            Some(Amount::from_scaled(i64::MAX))
        );
    }

    #[test]
    fn sum_of_amounts() {
        let total = Amount::checked_sum([1, 2, 3].into_iter().map(Amount::from_units));
        assert_eq!(total, Some(Amount::from_units(6)));
        assert_eq!(Amount::checked_sum([]), Some(Amount::ZERO));
    }

    #[test]
    fn sum_overflow_is_none() {
        let big = Amount::from_units(900_000_000_000_000);
        assert_eq!(Amount::checked_sum([big, big]), None);
    }

    #[test]
    fn multiples_of_units() {
        assert!(Amount::from_units(25).is_multiple_of_units(5));
        assert!(!Amount::from_units(23).is_multiple_of_units(5));
        assert!(!"25.5".parse::<Amount>().unwrap().is_multiple_of_units(5));
    }

    #[test]
    fn negative_ordering() {
        let negative = Amount::from_scaled(-100);
        let positive = Amount::from_scaled(100);
        assert!(negative < Amount::ZERO);
        assert!(Amount::ZERO < positive);
        assert!(negative.is_negative());
        assert!(positive.is_positive());
    }
}
