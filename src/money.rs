use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Money amounts are carried at 2 decimal places, FX rates at 6.
pub const MONEY_SCALE: u32 = 2;
pub const RATE_SCALE: u32 = 6;

pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round_rate(rate: Decimal) -> Decimal {
    rate.round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Percent change from `from` to `to`, rounded to 2 decimals.
pub fn percent_change(from: Decimal, to: Decimal) -> Option<Decimal> {
    if from.is_zero() {
        return None;
    }
    Some(round_money(((to - from) / from) * Decimal::ONE_HUNDRED))
}

/// An amount in a named ISO currency. All cross-currency arithmetic in the
/// core goes through [`Money::to_eur`]; nothing else converts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into().to_uppercase(),
        }
    }

    pub fn eur(amount: Decimal) -> Self {
        Self::new(amount, "EUR")
    }

    pub fn is_eur(&self) -> bool {
        self.currency == "EUR"
    }

    /// Convert to EUR using the pass-wide rate snapshot. EUR amounts pass
    /// through unchanged; everything else is multiplied by the snapshot rate
    /// and rounded to 2 decimals.
    pub fn to_eur(&self, rates: &FxRates) -> Result<Money> {
        if self.is_eur() {
            return Ok(self.clone());
        }

        let rate = rates
            .eur_rate(&self.currency)
            .ok_or_else(|| AppError::RateUnavailable(self.currency.clone()))?;

        Ok(Money::eur(round_money(self.amount * rate)))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

/// Currency → EUR rates fetched once per evaluation pass and shared
/// read-only across every entity in that pass.
#[derive(Debug, Clone)]
pub struct FxRates {
    rates: HashMap<String, Decimal>,
    pub fetched_at: DateTime<Utc>,
}

impl FxRates {
    pub fn new(rates: HashMap<String, Decimal>, fetched_at: DateTime<Utc>) -> Self {
        let rates = rates
            .into_iter()
            .map(|(currency, rate)| (currency.to_uppercase(), round_rate(rate)))
            .collect();

        Self { rates, fetched_at }
    }

    pub fn eur_rate(&self, currency: &str) -> Option<Decimal> {
        let currency = currency.to_uppercase();
        if currency == "EUR" {
            return Some(Decimal::ONE);
        }
        self.rates.get(&currency).copied()
    }

    pub fn currencies(&self) -> impl Iterator<Item = &String> {
        self.rates.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rates(pairs: &[(&str, Decimal)]) -> FxRates {
        FxRates::new(
            pairs.iter().map(|(c, r)| (c.to_string(), *r)).collect(),
            Utc::now(),
        )
    }

    #[test]
    fn eur_amounts_pass_through_unchanged() {
        let snapshot = rates(&[]);
        let m = Money::eur(dec!(123.456));
        assert_eq!(m.to_eur(&snapshot).unwrap(), m);
    }

    #[test]
    fn conversion_rounds_to_two_decimals() {
        let snapshot = rates(&[("USD", dec!(0.9))]);
        let m = Money::new(dec!(100.555), "usd");
        assert_eq!(m.to_eur(&snapshot).unwrap().amount, dec!(90.50));
    }

    #[test]
    fn rates_are_rounded_to_six_decimals() {
        let snapshot = rates(&[("USD", dec!(0.91234567))]);
        assert_eq!(snapshot.eur_rate("USD").unwrap(), dec!(0.912346));
    }

    #[test]
    fn missing_rate_is_an_error() {
        let snapshot = rates(&[]);
        let m = Money::new(dec!(10), "GBP");
        assert!(matches!(
            m.to_eur(&snapshot),
            Err(AppError::RateUnavailable(c)) if c == "GBP"
        ));
    }

    #[test]
    fn percent_change_handles_zero_base() {
        assert_eq!(percent_change(Decimal::ZERO, dec!(10)), None);
        assert_eq!(
            percent_change(dec!(90), dec!(99)).unwrap(),
            dec!(10.00)
        );
    }
}
