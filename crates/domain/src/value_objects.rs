//! Value objects shared across the catalog, cart and order domains.

use serde::{Deserialize, Serialize};

/// Money amount held in paise to avoid floating point issues.
///
/// Serializes as a bare integer number of paise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    paise: i64,
}

impl Money {
    /// Creates a new Money amount from paise.
    pub const fn from_paise(paise: i64) -> Self {
        Self { paise }
    }

    /// Creates a new Money amount from whole rupees.
    pub const fn from_rupees(rupees: i64) -> Self {
        Self {
            paise: rupees * 100,
        }
    }

    /// Returns zero money.
    pub const fn zero() -> Self {
        Self { paise: 0 }
    }

    /// Returns the amount in paise.
    pub fn paise(&self) -> i64 {
        self.paise
    }

    /// Returns the rupee portion (whole number).
    pub fn rupees(&self) -> i64 {
        self.paise / 100
    }

    /// Returns the paise portion (remainder after rupees).
    pub fn paise_part(&self) -> i64 {
        self.paise.abs() % 100
    }

    pub fn is_zero(&self) -> bool {
        self.paise == 0
    }

    pub fn is_negative(&self) -> bool {
        self.paise < 0
    }

    /// Multiplies by a quantity, saturating at the bounds of `i64`.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            paise: self.paise.saturating_mul(i64::from(quantity)),
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.paise < 0 {
            write!(f, "-₹{}.{:02}", self.rupees().abs(), self.paise_part())
        } else {
            write!(f, "₹{}.{:02}", self.rupees(), self.paise_part())
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            paise: self.paise.saturating_add(rhs.paise),
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            paise: self.paise.saturating_sub(rhs.paise),
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.paise = self.paise.saturating_add(rhs.paise);
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// A named attribute of a product variant, e.g. `Colour: Red`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spec {
    pub name: String,
    pub value: String,
}

impl Spec {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl std::fmt::Display for Spec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_rupees() {
        let money = Money::from_rupees(999);
        assert_eq!(money.paise(), 99_900);
        assert_eq!(money.rupees(), 999);
        assert_eq!(money.paise_part(), 0);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_paise(1234).to_string(), "₹12.34");
        assert_eq!(Money::from_rupees(50).to_string(), "₹50.00");
        assert_eq!(Money::from_paise(-5).to_string(), "-₹0.05");
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_rupees(100);
        let b = Money::from_rupees(50);

        assert_eq!(a + b, Money::from_rupees(150));
        assert_eq!(a - b, Money::from_rupees(50));
        assert_eq!(b.multiply(2), Money::from_rupees(100));
        assert!((b - a).is_negative());
    }

    #[test]
    fn test_money_arithmetic_saturates() {
        let max = Money::from_paise(i64::MAX);

        assert_eq!(max.multiply(2), max);
        assert_eq!(max + Money::from_rupees(1), max);
        assert_eq!(
            Money::from_paise(i64::MIN) - Money::from_rupees(1),
            Money::from_paise(i64::MIN)
        );

        let mut total = max;
        total += max;
        assert_eq!(total, max);
    }

    #[test]
    fn test_money_sum() {
        let total: Money = [Money::from_rupees(100), Money::from_rupees(100)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_rupees(200));

        let empty: Money = std::iter::empty().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_money_serializes_as_integer() {
        let json = serde_json::to_string(&Money::from_rupees(5)).unwrap();
        assert_eq!(json, "500");
    }

    #[test]
    fn test_spec_display() {
        assert_eq!(Spec::new("Colour", "Red").to_string(), "Colour: Red");
    }
}
