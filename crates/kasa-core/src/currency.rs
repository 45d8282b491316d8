//! # Currency Module
//!
//! The closed currency set, fixed-point exchange rates, and the fixed-size
//! per-currency totals record used by store balance snapshots.
//!
//! ## The Dual Ledger
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A store register can physically hold TRY and foreign cash at once.     │
//! │                                                                         │
//! │  Every payment line contributes to TWO slots of the store balance:      │
//! │                                                                         │
//! │    1. Settlement slot (always):                                         │
//! │       balances[method].try_kurus += sign × amount_kurus                 │
//! │       (amount_kurus = original × exchange_rate, the TRY equivalent)     │
//! │                                                                         │
//! │    2. Foreign slot (only for non-TRY lines):                            │
//! │       balances[method].<ccy>_kurus += sign × original_kurus             │
//! │                                                                         │
//! │  The TRY slot is the operating truth; the foreign slots let the store   │
//! │  reconcile physical foreign-currency holdings separately.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Currency
// =============================================================================

/// The closed set of currencies the ledger accepts.
///
/// The source of a payment line is one of these; everything is normalized
/// to the settlement currency (TRY) before it touches debts or the primary
/// balance slot. A closed enum (rather than free-form string keys) keeps
/// balance records fixed-size and rules out typo currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Turkish Lira - the settlement currency.
    Try,
    /// US Dollar.
    Usd,
    /// Euro.
    Eur,
    /// British Pound.
    Gbp,
}

impl Currency {
    /// The settlement currency all cross-currency amounts normalize to.
    pub const SETTLEMENT: Currency = Currency::Try;

    /// All supported currencies, settlement currency first.
    pub const ALL: [Currency; 4] = [Currency::Try, Currency::Usd, Currency::Eur, Currency::Gbp];

    /// ISO 4217 code.
    pub const fn code(&self) -> &'static str {
        match self {
            Currency::Try => "TRY",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }

    /// Whether this is the settlement currency.
    #[inline]
    pub const fn is_settlement(&self) -> bool {
        matches!(self, Currency::Try)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// Exchange Rate
// =============================================================================

/// Scale factor for fixed-point exchange rates: 1.0 = 10_000.
pub const EXCHANGE_RATE_SCALE: u32 = 10_000;

/// A multiplier from a line's currency to the settlement currency,
/// fixed-point scaled by 10_000.
///
/// ## Why Fixed Point?
/// A float rate multiplied into integer kurus would reintroduce the drift
/// the integer [`Money`] type exists to prevent. 10_000 gives four decimal
/// places, enough for retail FX board rates.
///
/// ## Example
/// ```rust
/// use kasa_core::currency::ExchangeRate;
///
/// let rate = ExchangeRate::from_scaled(325_000); // 32.5 TRY per USD
/// assert_eq!(rate.convert_kurus(10_000), 325_000); // $100 → ₺3250
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate(u32);

impl ExchangeRate {
    /// The identity rate (1.0), mandatory for settlement-currency lines.
    pub const ONE: ExchangeRate = ExchangeRate(EXCHANGE_RATE_SCALE);

    /// Creates a rate from its scaled representation (1.0 = 10_000).
    #[inline]
    pub const fn from_scaled(scaled: u32) -> Self {
        ExchangeRate(scaled)
    }

    /// Creates a rate from a float (for board-rate entry; rounded to
    /// four decimal places).
    pub fn from_rate(rate: f64) -> Self {
        ExchangeRate((rate * EXCHANGE_RATE_SCALE as f64).round() as u32)
    }

    /// Returns the scaled representation.
    #[inline]
    pub const fn scaled(&self) -> u32 {
        self.0
    }

    /// Whether this is the identity rate.
    #[inline]
    pub const fn is_identity(&self) -> bool {
        self.0 == EXCHANGE_RATE_SCALE
    }

    /// Converts an amount in the line's currency to settlement-currency
    /// kurus, rounding half away from zero.
    ///
    /// Uses i128 intermediates so large amounts cannot overflow.
    pub fn convert_kurus(&self, original_kurus: i64) -> i64 {
        let product = original_kurus as i128 * self.0 as i128;
        let half = (EXCHANGE_RATE_SCALE / 2) as i128;
        let rounded = if product >= 0 {
            (product + half) / EXCHANGE_RATE_SCALE as i128
        } else {
            (product - half) / EXCHANGE_RATE_SCALE as i128
        };
        rounded as i64
    }

    /// Converts a [`Money`] amount to settlement currency.
    #[inline]
    pub fn convert(&self, original: Money) -> Money {
        Money::from_kurus(self.convert_kurus(original.kurus()))
    }
}

impl Default for ExchangeRate {
    fn default() -> Self {
        ExchangeRate::ONE
    }
}

// =============================================================================
// Currency Totals
// =============================================================================

/// A fixed-size record of per-currency amounts, one slot per [`Currency`].
///
/// This is the value type of a store balance snapshot: for each payment
/// method the store holds one `CurrencyTotals`. The `try_kurus` slot is the
/// settlement-currency operating balance; foreign slots track physical
/// foreign cash in its own denomination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyTotals {
    pub try_kurus: i64,
    pub usd_kurus: i64,
    pub eur_kurus: i64,
    pub gbp_kurus: i64,
}

impl CurrencyTotals {
    /// Returns the amount held in the given currency.
    pub const fn get(&self, currency: Currency) -> i64 {
        match currency {
            Currency::Try => self.try_kurus,
            Currency::Usd => self.usd_kurus,
            Currency::Eur => self.eur_kurus,
            Currency::Gbp => self.gbp_kurus,
        }
    }

    /// Adds a signed delta to the given currency slot.
    pub fn add(&mut self, currency: Currency, delta_kurus: i64) {
        match currency {
            Currency::Try => self.try_kurus += delta_kurus,
            Currency::Usd => self.usd_kurus += delta_kurus,
            Currency::Eur => self.eur_kurus += delta_kurus,
            Currency::Gbp => self.gbp_kurus += delta_kurus,
        }
    }

    /// Whether every slot is zero.
    pub const fn is_zero(&self) -> bool {
        self.try_kurus == 0 && self.usd_kurus == 0 && self.eur_kurus == 0 && self.gbp_kurus == 0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_codes() {
        assert_eq!(Currency::Try.code(), "TRY");
        assert_eq!(Currency::Usd.code(), "USD");
        assert!(Currency::Try.is_settlement());
        assert!(!Currency::Eur.is_settlement());
        assert_eq!(Currency::SETTLEMENT, Currency::Try);
    }

    #[test]
    fn test_identity_rate() {
        let rate = ExchangeRate::ONE;
        assert!(rate.is_identity());
        assert_eq!(rate.convert_kurus(1099), 1099);
    }

    #[test]
    fn test_conversion_rounding() {
        // 32.5678 TRY per USD
        let rate = ExchangeRate::from_scaled(325_678);
        // $1.00 = 100 cents → 3256.78 kurus → rounds to 3257
        assert_eq!(rate.convert_kurus(100), 3257);
        // Negative amounts round away from zero symmetrically
        assert_eq!(rate.convert_kurus(-100), -3257);
    }

    #[test]
    fn test_from_rate() {
        let rate = ExchangeRate::from_rate(32.5);
        assert_eq!(rate.scaled(), 325_000);
        assert_eq!(rate.convert_kurus(10_000), 325_000);
    }

    #[test]
    fn test_currency_totals() {
        let mut totals = CurrencyTotals::default();
        assert!(totals.is_zero());

        totals.add(Currency::Try, 1500);
        totals.add(Currency::Usd, 100);
        totals.add(Currency::Try, -500);

        assert_eq!(totals.get(Currency::Try), 1000);
        assert_eq!(totals.get(Currency::Usd), 100);
        assert_eq!(totals.get(Currency::Eur), 0);
        assert!(!totals.is_zero());
    }
}
