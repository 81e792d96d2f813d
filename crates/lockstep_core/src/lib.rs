//! # LOCKSTEP Core
//!
//! The tic scheduler of a deterministic lockstep game loop.
//!
//! ## Architecture Rules
//!
//! 1. **Fixed tic rate** - The world only advances in whole tics
//! 2. **Lockstep** - A tic runs only once every player's command is known
//! 3. **Draw never mutates** - Frames see the world through shared references
//!
//! ## Example
//!
//! ```rust
//! use lockstep_core::mock::{MockPresenter, MockSimulation, ScriptedInput};
//! use lockstep_core::{LocalSession, LoopConfig, LoopPhase, ManualClock, Scheduler};
//!
//! struct Idle;
//! impl LoopPhase for Idle {}
//!
//! let clock = ManualClock::default();
//! let mut scheduler = Scheduler::new(
//!     LoopConfig::default(),
//!     LocalSession::new(),
//!     clock.clone(),
//!     MockSimulation::new(),
//!     MockPresenter::new(),
//!     Box::new(ScriptedInput::new()),
//! );
//!
//! clock.advance_tics(1);
//! scheduler.step(&mut Idle).unwrap();
//! assert_eq!(scheduler.state().gametic, 1);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod action;
pub mod clock;
pub mod config;
pub mod demo;
pub mod error;
pub mod event;
pub mod memory;
pub mod mock;
pub mod phase;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod ticcmd;
pub mod traits;

pub use action::GameAction;
pub use clock::{ManualClock, SystemClock, TicClock, TICRATE};
pub use config::LoopConfig;
pub use demo::{DemoLibrary, DemoPlayback, DemoScript};
pub use error::{ConfigError, LoopError, LoopResult};
pub use event::{
    Event, EventKind, EventQueue, Responder, ResponderChain, SharedEventQueue, MAXEVENTS,
};
pub use memory::ScratchArena;
pub use phase::{Frame, LoopPhase, PhaseContext};
pub use scheduler::{LoopStats, Pacing, Scheduler};
pub use session::LocalSession;
pub use state::{GameState, LoopState, SessionFlags};
pub use ticcmd::{TicCmd, TicHistory, BACKUPTICS, MAXPLAYERS};
pub use traits::{
    rgba, Cluster, GameInput, NetSync, Presenter, Simulation, ViewPoint, BLACK, WHITE,
};
