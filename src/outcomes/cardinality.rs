//! Outcome counts that may be infinite.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The number of outcomes in an issue or space. Any continuous issue makes
/// the containing space `Infinite`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    Finite(u128),
    Infinite,
}

impl Cardinality {
    /// Returns true for a finite count.
    pub fn is_finite(&self) -> bool {
        matches!(self, Cardinality::Finite(_))
    }

    /// Returns the finite count, if there is one.
    pub fn as_finite(&self) -> Option<u128> {
        match self {
            Cardinality::Finite(n) => Some(*n),
            Cardinality::Infinite => None,
        }
    }

    /// Multiplies two cardinalities. Finite products saturate; infinity
    /// absorbs.
    pub fn times(self, other: Cardinality) -> Cardinality {
        match (self, other) {
            (Cardinality::Finite(a), Cardinality::Finite(b)) => {
                Cardinality::Finite(a.saturating_mul(b))
            }
            _ => Cardinality::Infinite,
        }
    }

    /// Product over an iterator of cardinalities. The empty product is 1.
    pub fn product(iter: impl IntoIterator<Item = Cardinality>) -> Cardinality {
        iter.into_iter()
            .fold(Cardinality::Finite(1), Cardinality::times)
    }

    /// Returns true if this count is strictly greater than `cap`.
    pub fn exceeds(&self, cap: u128) -> bool {
        match self {
            Cardinality::Finite(n) => *n > cap,
            Cardinality::Infinite => true,
        }
    }
}

impl PartialOrd for Cardinality {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(match (self, other) {
            (Cardinality::Finite(a), Cardinality::Finite(b)) => a.cmp(b),
            (Cardinality::Finite(_), Cardinality::Infinite) => Ordering::Less,
            (Cardinality::Infinite, Cardinality::Finite(_)) => Ordering::Greater,
            (Cardinality::Infinite, Cardinality::Infinite) => Ordering::Equal,
        })
    }
}

impl From<u128> for Cardinality {
    fn from(n: u128) -> Self {
        Cardinality::Finite(n)
    }
}

impl From<usize> for Cardinality {
    fn from(n: usize) -> Self {
        Cardinality::Finite(n as u128)
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::Finite(n) => write!(f, "{}", n),
            Cardinality::Infinite => write!(f, "inf"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_of_finite_counts_multiplies() {
        let c = Cardinality::product([
            Cardinality::Finite(3),
            Cardinality::Finite(4),
            Cardinality::Finite(2),
        ]);
        assert_eq!(c, Cardinality::Finite(24));
    }

    #[test]
    fn infinity_absorbs_products() {
        let c = Cardinality::product([Cardinality::Finite(10), Cardinality::Infinite]);
        assert_eq!(c, Cardinality::Infinite);
    }

    #[test]
    fn empty_product_is_one() {
        let none: [Cardinality; 0] = [];
        assert_eq!(Cardinality::product(none), Cardinality::Finite(1));
    }

    #[test]
    fn exceeds_compares_against_caps() {
        assert!(Cardinality::Finite(101).exceeds(100));
        assert!(!Cardinality::Finite(100).exceeds(100));
        assert!(Cardinality::Infinite.exceeds(u128::MAX));
    }

    #[test]
    fn ordering_places_infinity_last() {
        assert!(Cardinality::Finite(u128::MAX) < Cardinality::Infinite);
        assert!(Cardinality::Finite(2) > Cardinality::Finite(1));
    }

    #[test]
    fn finite_products_saturate() {
        let c = Cardinality::Finite(u128::MAX).times(Cardinality::Finite(2));
        assert_eq!(c, Cardinality::Finite(u128::MAX));
    }
}
