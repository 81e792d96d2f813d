//! # Binary Angles
//!
//! Angles are binary angle measurements (BAM): the full circle maps onto the
//! whole `u32` range, so wrapping arithmetic is the natural modular
//! arithmetic of rotation.
//!
//! Point-to-angle conversion reduces the vector into the first octant and
//! looks the slope up in a tangent table. The table is computed once on first
//! use and is immutable afterwards.

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::sync::OnceLock;

use crate::fixed::Fixed;

/// Number of slope buckets in the tangent table (entries `0..=SLOPERANGE`).
pub const SLOPERANGE: u32 = 2048;

/// Binary angle. `0` is east, `ANG90` is north.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Angle(u32);

/// 45 degrees.
pub const ANG45: Angle = Angle(0x2000_0000);
/// 90 degrees.
pub const ANG90: Angle = Angle(0x4000_0000);
/// 180 degrees.
pub const ANG180: Angle = Angle(0x8000_0000);
/// 270 degrees.
pub const ANG270: Angle = Angle(0xC000_0000);

impl Angle {
    /// Zero angle (east).
    pub const ZERO: Self = Self(0);

    /// Creates an angle from raw BAM units.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw BAM units.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Converts to degrees. Presentation only; never feed this back into
    /// the simulation.
    #[must_use]
    pub fn to_degrees(self) -> f64 {
        f64::from(self.0) * 360.0 / 4_294_967_296.0
    }
}

impl Add for Angle {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl AddAssign for Angle {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.wrapping_add(rhs.0);
    }
}

impl Sub for Angle {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.wrapping_sub(rhs.0))
    }
}

impl SubAssign for Angle {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.wrapping_sub(rhs.0);
    }
}

impl Neg for Angle {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self::Output {
        Self(self.0.wrapping_neg())
    }
}

impl fmt::Debug for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Angle({:#010x})", self.0)
    }
}

// ============================================================================
// TANGENT TABLE
// ============================================================================

static TAN_TO_ANGLE: OnceLock<Box<[u32]>> = OnceLock::new();

fn tan_to_angle() -> &'static [u32] {
    TAN_TO_ANGLE.get_or_init(|| {
        (0..=SLOPERANGE)
            .map(|i| {
                let slope = f64::from(i) / f64::from(SLOPERANGE);
                let turns = slope.atan() / std::f64::consts::TAU;
                (turns * 4_294_967_296.0).round() as u32
            })
            .collect()
    })
}

/// Looks up `atan(slope / SLOPERANGE)` in BAM. Out-of-range slopes clamp.
#[inline]
#[must_use]
pub fn tan_angle(slope: u32) -> Angle {
    let table = tan_to_angle();
    Angle(table[slope.min(SLOPERANGE) as usize])
}

/// Scaled slope `num / den` in table units, clamped to `SLOPERANGE`.
///
/// Denominators below 512 raw units (1/128 of a map unit) are treated as
/// vertical.
#[inline]
#[must_use]
pub const fn slope_div(num: u32, den: u32) -> u32 {
    if den < 512 {
        return SLOPERANGE;
    }
    let ans = (num << 3) / (den >> 8);
    if ans <= SLOPERANGE {
        ans
    } else {
        SLOPERANGE
    }
}

// ============================================================================
// POINT TO ANGLE
// ============================================================================

/// Angle of the vector `(dx, dy)`. The zero vector maps to angle zero.
#[must_use]
pub fn point_to_angle(dx: Fixed, dy: Fixed) -> Angle {
    let (x, y) = (dx.raw(), dy.raw());
    if x == 0 && y == 0 {
        return Angle::ZERO;
    }

    let ax = x.unsigned_abs();
    let ay = y.unsigned_abs();
    let one = Angle(1);

    match (x >= 0, y >= 0) {
        (true, true) => {
            if ax > ay {
                tan_angle(slope_div(ay, ax))
            } else {
                ANG90 - one - tan_angle(slope_div(ax, ay))
            }
        }
        (true, false) => {
            if ax > ay {
                -tan_angle(slope_div(ay, ax))
            } else {
                ANG270 + tan_angle(slope_div(ax, ay))
            }
        }
        (false, true) => {
            if ax > ay {
                ANG180 - one - tan_angle(slope_div(ay, ax))
            } else {
                ANG90 + tan_angle(slope_div(ax, ay))
            }
        }
        (false, false) => {
            if ax > ay {
                ANG180 + tan_angle(slope_div(ay, ax))
            } else {
                ANG270 - one - tan_angle(slope_div(ax, ay))
            }
        }
    }
}

/// Angle from `(x1, y1)` looking toward `(x2, y2)`.
#[inline]
#[must_use]
pub fn point_to_angle2(x1: Fixed, y1: Fixed, x2: Fixed, y2: Fixed) -> Angle {
    point_to_angle(x2 - x1, y2 - y1)
}

/// Vertical look angle from height `z1` to height `z2` over horizontal
/// distance `dist`.
#[inline]
#[must_use]
pub fn point_to_pitch(z1: Fixed, z2: Fixed, dist: Fixed) -> Angle {
    point_to_angle2(Fixed::ZERO, z1, dist, z2)
}
