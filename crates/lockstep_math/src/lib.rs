//! # LOCKSTEP MATH
//!
//! Deterministic scalar arithmetic for the simulation and the BSP queries.
//!
//! ## Contents
//!
//! - [`Fixed`]: 16.16 fixed-point scalar with documented overflow rules
//! - [`Angle`]: binary angle measurement over the full `u32` range
//! - [`point_to_angle`] and friends: vector direction via a tangent table
//!
//! Nothing in this crate touches floating point at query time. The tangent
//! table is built once with `f64` and then only read.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod angle;
pub mod fixed;

pub use angle::{
    point_to_angle, point_to_angle2, point_to_pitch, slope_div, tan_angle, Angle, ANG180,
    ANG270, ANG45, ANG90, SLOPERANGE,
};
pub use fixed::{Fixed, FRACBITS, FRACUNIT};
