//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A debt ledger that accumulates partial collections over months         │
//! │  cannot afford drift of even one kurus per payment.                     │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Kurus                                            │
//! │    Every persisted amount is an i64 count of kurus (1/100 TRY).         │
//! │    The only tolerance in the system is the explicit settlement          │
//! │    epsilon (PAID_EPSILON_KURUS) used for debt status derivation.        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kasa_core::money::Money;
//!
//! // Create from kurus (preferred)
//! let amount = Money::from_kurus(1099); // ₺10.99
//!
//! // Arithmetic operations
//! let doubled = amount * 2;                      // ₺21.98
//! let total = amount + Money::from_kurus(500);   // ₺15.99
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in kurus, the smallest unit of the
/// settlement currency (TRY).
///
/// ## Design Decisions
/// - **i64 (signed)**: OverShort correction lines and overpaid debts are
///   legitimately negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// Every monetary field persisted by kasa-db is a raw `_kurus` i64; this
/// type wraps those values for arithmetic and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from kurus (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use kasa_core::money::Money;
    ///
    /// let amount = Money::from_kurus(1099); // Represents ₺10.99
    /// assert_eq!(amount.kurus(), 1099);
    /// ```
    #[inline]
    pub const fn from_kurus(kurus: i64) -> Self {
        Money(kurus)
    }

    /// Creates a Money value from major and minor units (lira and kurus).
    ///
    /// ## Example
    /// ```rust
    /// use kasa_core::money::Money;
    ///
    /// let amount = Money::from_major_minor(10, 99); // ₺10.99
    /// assert_eq!(amount.kurus(), 1099);
    ///
    /// let shortfall = Money::from_major_minor(-5, 50); // -₺5.50
    /// assert_eq!(shortfall.kurus(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50)` = -₺5.50, not -₺4.50
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in kurus.
    #[inline]
    pub const fn kurus(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (lira) portion.
    #[inline]
    pub const fn lira(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (kurus) portion (always 0-99).
    #[inline]
    pub const fn kurus_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and debugging. UI layers format amounts themselves
/// to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₺{}.{:02}", sign, self.lira().abs(), self.kurus_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Negation (for reversal deltas when a document is edited).
impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_kurus() {
        let money = Money::from_kurus(1099);
        assert_eq!(money.kurus(), 1099);
        assert_eq!(money.lira(), 10);
        assert_eq!(money.kurus_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        let money = Money::from_major_minor(10, 99);
        assert_eq!(money.kurus(), 1099);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.kurus(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_kurus(1099)), "₺10.99");
        assert_eq!(format!("{}", Money::from_kurus(500)), "₺5.00");
        assert_eq!(format!("{}", Money::from_kurus(-550)), "-₺5.50");
        assert_eq!(format!("{}", Money::from_kurus(0)), "₺0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_kurus(1000);
        let b = Money::from_kurus(500);

        assert_eq!((a + b).kurus(), 1500);
        assert_eq!((a - b).kurus(), 500);
        assert_eq!((-a).kurus(), -1000);
        let result: Money = a * 3;
        assert_eq!(result.kurus(), 3000);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_kurus(100);
        assert!(positive.is_positive());

        let negative = Money::from_kurus(-100);
        assert!(negative.is_negative());
    }
}
