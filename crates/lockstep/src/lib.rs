//! # LOCKSTEP
//!
//! The game's screens and the controller that moves between them.
//!
//! ## Layers
//!
//! ```text
//! PhaseController ── picks the next phase from the last exit action
//!        │
//! Scheduler ──────── runs one phase as a mini-loop (lockstep_core)
//!        │
//! Phase ──────────── title, legal, credits, demo, game, intermission
//! ```
//!
//! The `lockstep` binary wires the controller to the real-time clock and
//! a single-player session.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod controller;
pub mod error;
pub mod phases;
pub mod responders;

pub use controller::PhaseController;
pub use error::{LockstepError, LockstepResult};
pub use phases::{Phase, PhaseKind};
pub use responders::{KeyboardInput, MainMenu};
