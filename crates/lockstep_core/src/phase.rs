//! # Loop Phases
//!
//! A phase is the start/stop/draw/tick bundle one mini-loop run executes.
//! Every callback is optional; the defaults do nothing.

use lockstep_math::Fixed;

use crate::action::GameAction;
use crate::error::LoopResult;
use crate::memory::ScratchArena;
use crate::state::LoopState;
use crate::ticcmd::{TicCmd, MAXPLAYERS};
use crate::traits::{Presenter, Simulation};

/// Mutable access handed to `start`, `stop` and `tick`.
pub struct PhaseContext<'a> {
    /// Shared loop state.
    pub state: &'a mut LoopState,
    /// The game world.
    pub sim: &'a mut dyn Simulation,
    /// Commands the simulation just ran with. Empty outside `tick`.
    pub cmds: [TicCmd; MAXPLAYERS],
    /// Which players are in the game.
    pub in_game: [bool; MAXPLAYERS],
}

/// Read-only view handed to `draw`.
///
/// Drawing can reach the world only through shared references, so an
/// interpolated draw cannot change simulation state.
pub struct Frame<'a> {
    /// Shared loop state.
    pub state: &'a LoopState,
    /// The game world.
    pub sim: &'a dyn Simulation,
    /// Output surface.
    pub presenter: &'a mut dyn Presenter,
    /// Scratch budget for this iteration.
    pub arena: &'a ScratchArena,
    /// Progress into the next tic, for interpolated frames.
    pub fraction: Fixed,
    /// True for the extra frame drawn before simulating.
    pub interpolated: bool,
}

/// One phase of the game's control flow.
pub trait LoopPhase {
    /// Short name for logs.
    fn name(&self) -> &'static str {
        "phase"
    }

    /// Runs once when the mini-loop starts.
    ///
    /// # Errors
    ///
    /// Fails if the phase cannot set up (for example, corrupt level data).
    fn start(&mut self, _ctx: &mut PhaseContext<'_>) -> LoopResult<()> {
        Ok(())
    }

    /// Runs once when the mini-loop exits.
    fn stop(&mut self, _ctx: &mut PhaseContext<'_>) {}

    /// Draws the current state. May run any number of times per tic.
    fn draw(&self, _frame: &mut Frame<'_>) {}

    /// Runs after every simulation step. A non-`Nothing` result ends the
    /// mini-loop once the current batch of tics finishes.
    fn tick(&mut self, _ctx: &mut PhaseContext<'_>) -> GameAction {
        GameAction::Nothing
    }
}
