//! # LOCKSTEP Net
//!
//! Tic exchange between nodes of one session.
//!
//! The scheduler runs a tic only once every in-game player's command for it
//! has arrived. This crate moves those commands between nodes; single-player
//! games use [`lockstep_core::LocalSession`] instead.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod loopback;

pub use loopback::{LoopbackNet, MeshStats, TicPacket, INBOX_CAPACITY};
