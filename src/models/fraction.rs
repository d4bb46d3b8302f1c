//! Musical time as an exact rational number of whole notes.
//!
//! Ticks are the integer subdivision used by spanner lookups and the tick
//! cursor: 480 ticks per quarter note.

use num_rational::Rational32;
use num_traits::{CheckedAdd, CheckedDiv, CheckedSub};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Sub};
use thiserror::Error;

/// Ticks per quarter note
pub const DIVISION: i32 = 480;

/// Ticks per whole note
const WHOLE_TICKS: i64 = DIVISION as i64 * 4;

/// Exact fraction of a whole note, always kept reduced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "(i32, i32)", into = "(i32, i32)")]
pub struct Fraction(Rational32);

impl Fraction {
    /// Create a new fraction. Panics on a zero denominator.
    pub fn new(numerator: i32, denominator: i32) -> Self {
        assert!(denominator != 0, "Fraction denominator must be non-zero");
        Fraction(Rational32::new(numerator, denominator))
    }

    pub fn zero() -> Self {
        Fraction(Rational32::from_integer(0))
    }

    pub fn one() -> Self {
        Fraction(Rational32::from_integer(1))
    }

    /// Build a fraction from an integer tick count
    pub fn from_ticks(ticks: i32) -> Self {
        Fraction::new(ticks, DIVISION * 4)
    }

    pub fn numerator(&self) -> i32 {
        *self.0.numer()
    }

    pub fn denominator(&self) -> i32 {
        *self.0.denom()
    }

    pub fn is_zero(&self) -> bool {
        self.numerator() == 0
    }

    /// Integer ticks, truncated toward zero
    pub fn ticks(&self) -> i32 {
        (self.numerator() as i64 * WHOLE_TICKS / self.denominator() as i64) as i32
    }
}

/// Fraction arithmetic whose exact result does not fit 32 bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{lhs} {op} {rhs} overflows")]
pub struct FractionOverflow {
    pub lhs: Fraction,
    pub op: char,
    pub rhs: Fraction,
}

impl Fraction {
    pub fn checked_add(self, rhs: Fraction) -> Result<Fraction, FractionOverflow> {
        self.0
            .checked_add(&rhs.0)
            .map(Fraction)
            .ok_or(FractionOverflow { lhs: self, op: '+', rhs })
    }

    pub fn checked_sub(self, rhs: Fraction) -> Result<Fraction, FractionOverflow> {
        self.0
            .checked_sub(&rhs.0)
            .map(Fraction)
            .ok_or(FractionOverflow { lhs: self, op: '-', rhs })
    }

    /// Also fails on a zero divisor
    pub fn checked_div(self, rhs: Fraction) -> Result<Fraction, FractionOverflow> {
        self.0
            .checked_div(&rhs.0)
            .map(Fraction)
            .ok_or(FractionOverflow { lhs: self, op: '/', rhs })
    }
}

impl Default for Fraction {
    fn default() -> Self {
        Fraction::zero()
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator(), self.denominator())
    }
}

impl TryFrom<(i32, i32)> for Fraction {
    type Error = String;

    fn try_from((n, d): (i32, i32)) -> Result<Self, Self::Error> {
        if d == 0 {
            return Err(format!("invalid fraction {}/0", n));
        }
        Ok(Fraction::new(n, d))
    }
}

impl From<Fraction> for (i32, i32) {
    fn from(f: Fraction) -> Self {
        (f.numerator(), f.denominator())
    }
}

impl Add for Fraction {
    type Output = Fraction;
    fn add(self, rhs: Fraction) -> Fraction {
        Fraction(self.0 + rhs.0)
    }
}

impl AddAssign for Fraction {
    fn add_assign(&mut self, rhs: Fraction) {
        self.0 = self.0 + rhs.0;
    }
}

impl Sub for Fraction {
    type Output = Fraction;
    fn sub(self, rhs: Fraction) -> Fraction {
        Fraction(self.0 - rhs.0)
    }
}

impl Div for Fraction {
    type Output = Fraction;
    fn div(self, rhs: Fraction) -> Fraction {
        assert!(!rhs.is_zero(), "division by zero fraction");
        Fraction(self.0 / rhs.0)
    }
}
