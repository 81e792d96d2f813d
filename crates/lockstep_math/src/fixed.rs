//! # Fixed-Point Arithmetic
//!
//! **CRITICAL: NO FLOATING POINT IN THE SIMULATION**
//!
//! Every position, distance and partition line in the engine is a `Fixed`:
//! an `i32` holding `value * 2^16`.
//!
//! ## Overflow Rules
//!
//! - Addition, subtraction and negation wrap (two's complement). Map
//!   coordinates are bounded well inside the representable range, and
//!   wrapping keeps the result identical on every target.
//! - Multiplication widens to `i64` and truncates back to `i32`.
//! - Division saturates to `i32::MIN` / `i32::MAX` when the quotient does
//!   not fit, which also covers division by zero.
//!
//! ## Range
//!
//! - Minimum: -32768.0
//! - Maximum: 32767.99998 (1/65536 resolution)

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use bytemuck::{Pod, Zeroable};

/// Number of fractional bits.
pub const FRACBITS: u32 = 16;

/// Raw value of `1.0`.
pub const FRACUNIT: i32 = 1 << FRACBITS;

/// Fixed-point number with 16 fractional bits.
///
/// Internally stores `value * 65536` as an `i32`.
///
/// # Example
///
/// ```rust
/// use lockstep_math::Fixed;
///
/// let half = Fixed::from_raw(0x8000);
/// assert_eq!((Fixed::from_int(3) * half).to_int(), 1);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Pod, Zeroable)]
#[repr(transparent)]
pub struct Fixed(i32);

impl Fixed {
    /// Zero value.
    pub const ZERO: Self = Self(0);

    /// One unit (1.0).
    pub const ONE: Self = Self(FRACUNIT);

    /// Largest representable value.
    pub const MAX: Self = Self(i32::MAX);

    /// Smallest representable value.
    pub const MIN: Self = Self(i32::MIN);

    /// Creates a fixed-point number from a whole map unit.
    ///
    /// Values outside `-32768..=32767` wrap.
    #[inline]
    #[must_use]
    pub const fn from_int(whole: i32) -> Self {
        Self(whole.wrapping_shl(FRACBITS))
    }

    /// Creates a fixed-point number from its raw representation.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw internal value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Drops the fractional part (arithmetic shift, rounds toward -inf).
    ///
    /// This is the de-fractionalization used before multiplying two
    /// coordinates so the product stays inside an `i32`.
    #[inline]
    #[must_use]
    pub const fn to_int(self) -> i32 {
        self.0 >> FRACBITS
    }

    /// Returns the fractional bits (0..65536).
    #[inline]
    #[must_use]
    pub const fn frac(self) -> i32 {
        self.0 & (FRACUNIT - 1)
    }

    /// Returns true if this value is zero.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns true if this value is strictly negative.
    #[inline]
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Returns true if this value is strictly positive.
    #[inline]
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Branch-free absolute value. `MIN.abs()` wraps to `MIN`.
    #[inline]
    #[must_use]
    pub const fn abs(self) -> Self {
        let sign = self.0 >> 31;
        Self((self.0 ^ sign).wrapping_sub(sign))
    }

    /// Multiplies two fixed-point numbers.
    ///
    /// The product is computed in 64 bits and truncated back to 32.
    #[inline]
    #[must_use]
    pub const fn mul(self, rhs: Self) -> Self {
        Self(((self.0 as i64 * rhs.0 as i64) >> FRACBITS) as i32)
    }

    /// Divides two fixed-point numbers, saturating on overflow.
    #[inline]
    #[must_use]
    pub const fn div(self, rhs: Self) -> Self {
        if (self.0.unsigned_abs() >> 14) >= rhs.0.unsigned_abs() {
            return if (self.0 ^ rhs.0) < 0 { Self::MIN } else { Self::MAX };
        }
        Self((((self.0 as i64) << FRACBITS) / rhs.0 as i64) as i32)
    }

    /// Checked addition. Returns `None` on overflow.
    #[inline]
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction. Returns `None` on overflow.
    #[inline]
    #[must_use]
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match self.0.checked_sub(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Saturating addition.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Saturating subtraction.
    #[inline]
    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Add for Fixed {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl AddAssign for Fixed {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.wrapping_add(rhs.0);
    }
}

impl Sub for Fixed {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.wrapping_sub(rhs.0))
    }
}

impl SubAssign for Fixed {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.wrapping_sub(rhs.0);
    }
}

impl Neg for Fixed {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self::Output {
        Self(self.0.wrapping_neg())
    }
}

impl std::ops::Mul for Fixed {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self::Output {
        Fixed::mul(self, rhs)
    }
}

impl std::ops::Div for Fixed {
    type Output = Self;

    #[inline]
    fn div(self, rhs: Self) -> Self::Output {
        Fixed::div(self, rhs)
    }
}

impl fmt::Debug for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed({self})")
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Five decimals is enough to tell 1/65536 steps apart.
        let scaled = (i64::from(self.0) * 100_000) / i64::from(FRACUNIT);
        let sign = if scaled < 0 { "-" } else { "" };
        let scaled = scaled.abs();
        write!(f, "{sign}{}.{:05}", scaled / 100_000, scaled % 100_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_int() {
        let value = Fixed::from_int(100);
        assert_eq!(value.raw(), 100 << 16);
        assert_eq!(value.to_int(), 100);
        assert_eq!(value.frac(), 0);
    }

    #[test]
    fn test_to_int_rounds_toward_negative_infinity() {
        assert_eq!(Fixed::from_raw(-1).to_int(), -1);
        assert_eq!(Fixed::from_raw(FRACUNIT + 1).to_int(), 1);
    }

    #[test]
    fn test_addition_wraps() {
        let result = Fixed::MAX + Fixed::from_raw(1);
        assert_eq!(result, Fixed::MIN);
        assert!(Fixed::MAX.checked_add(Fixed::from_raw(1)).is_none());
        assert_eq!(Fixed::MAX.saturating_add(Fixed::ONE), Fixed::MAX);
    }

    #[test]
    fn test_mul() {
        let a = Fixed::from_raw(3 * FRACUNIT / 2); // 1.5
        let b = Fixed::from_int(-4);
        assert_eq!((a * b).to_int(), -6);
    }

    #[test]
    fn test_div() {
        let a = Fixed::from_int(7);
        let b = Fixed::from_int(2);
        assert_eq!((a / b).raw(), 7 * FRACUNIT / 2);
    }

    #[test]
    fn test_div_saturates() {
        assert_eq!(Fixed::from_int(1) / Fixed::ZERO, Fixed::MAX);
        assert_eq!(Fixed::from_int(-1) / Fixed::ZERO, Fixed::MIN);
        assert_eq!(Fixed::from_int(30_000) / Fixed::from_raw(1), Fixed::MAX);
        assert_eq!(Fixed::from_int(30_000) / Fixed::from_raw(-1), Fixed::MIN);
    }

    #[test]
    fn test_abs() {
        assert_eq!(Fixed::from_int(-5).abs(), Fixed::from_int(5));
        assert_eq!(Fixed::from_int(5).abs(), Fixed::from_int(5));
        assert_eq!(Fixed::MIN.abs(), Fixed::MIN);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Fixed::from_raw(3 * FRACUNIT / 2)), "1.50000");
        assert_eq!(format!("{}", Fixed::from_raw(-FRACUNIT / 4)), "-0.25000");
    }
}
