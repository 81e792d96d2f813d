//! # Phase Controller
//!
//! Sequences phases from the actions their mini-loops return.
//!
//! ```text
//! startup ──► legal ──► title map ──┐
//!                                   ▼
//!            ┌──────────────────► title ──NewGame/LoadGame──► gameplay ─┐
//!            │                      │                                   │
//!            │                   timeout                                │
//!            │                      ▼                                   │
//!            ├──── key ─────── credits                                  │
//!            │                      ▼                                   │
//!            ├──── key ─────── demos (each must end with ExitDemo)      │
//!            │                      ▼                                   │
//!            └──────────────── title map ◄──────────────────────────────┘
//! ```
//!
//! Gameplay alternates maps and intermissions until the world returns
//! something other than a level change.

use std::convert::Infallible;

use lockstep_core::{
    DemoLibrary, GameAction, LoopResult, NetSync, Presenter, Scheduler, Simulation,
    TicClock,
};

use crate::phases::{
    CreditsPhase, DemoPhase, GamePhase, IntermissionPhase, LegalPhase, Phase, PhaseKind,
    TitlePhase,
};

/// Drives the scheduler through the game's screens.
pub struct PhaseController<N, C, S, P> {
    scheduler: Scheduler<N, C, S, P>,
    demos: Box<dyn DemoLibrary>,
    visited: Vec<PhaseKind>,
}

impl<N, C, S, P> PhaseController<N, C, S, P>
where
    N: NetSync,
    C: TicClock,
    S: Simulation,
    P: Presenter,
{
    /// Creates a controller that loads attract demos from `demos`.
    #[must_use]
    pub fn new(scheduler: Scheduler<N, C, S, P>, demos: Box<dyn DemoLibrary>) -> Self {
        Self {
            scheduler,
            demos,
            visited: Vec::new(),
        }
    }

    /// The scheduler.
    #[must_use]
    pub const fn scheduler(&self) -> &Scheduler<N, C, S, P> {
        &self.scheduler
    }

    /// The scheduler, mutably.
    pub fn scheduler_mut(&mut self) -> &mut Scheduler<N, C, S, P> {
        &mut self.scheduler
    }

    /// Every phase run so far, in order.
    #[must_use]
    pub fn visited(&self) -> &[PhaseKind] {
        &self.visited
    }

    /// Runs one phase to completion.
    ///
    /// # Errors
    ///
    /// Propagates fatal mini-loop errors.
    pub fn run_phase(&mut self, mut phase: Phase) -> LoopResult<GameAction> {
        let kind = phase.kind();
        tracing::info!(phase = %kind, "entering phase");
        self.visited.push(kind);

        let action = self.scheduler.run(&mut phase)?;
        tracing::debug!(phase = %kind, %action, "phase finished");
        Ok(action)
    }

    /// Legal notice, then the title map unless a key skipped it.
    ///
    /// Skipped when an action is already pending or in a network game.
    ///
    /// # Errors
    ///
    /// Propagates fatal mini-loop errors.
    pub fn splash(&mut self) -> LoopResult<()> {
        let state = self.scheduler.state();
        if !state.action.is_nothing() || state.flags.netgame {
            return Ok(());
        }

        let config = self.scheduler.config();
        let legal = LegalPhase::new(config.secs_to_tics(config.legal_secs));
        if self.run_phase(Phase::Legal(legal))? != GameAction::Title {
            self.run_title_map()?;
        }
        self.scheduler.state_mut().action = GameAction::Title;
        Ok(())
    }

    /// Startup: the splash, or straight into gameplay for a network game.
    ///
    /// # Errors
    ///
    /// Propagates fatal mini-loop errors.
    pub fn run_opening(&mut self) -> LoopResult<()> {
        if self.scheduler.state().flags.netgame {
            tracing::info!("network game, skipping title");
            self.start_new_game();
            return self.run_gameplay().map(|_| ());
        }
        self.splash()
    }

    /// One pass of the title sequence.
    ///
    /// Returns the action that ended the pass.
    ///
    /// # Errors
    ///
    /// Propagates fatal mini-loop errors.
    pub fn run_sequence(&mut self) -> LoopResult<GameAction> {
        let config = self.scheduler.config();
        let title = TitlePhase::new(config.secs_to_tics(config.title_timeout_secs));
        let exit = self.run_phase(Phase::Title(title))?;

        if exit.starts_game() {
            self.start_new_game();
            return self.run_gameplay();
        }

        let config = self.scheduler.config();
        let credits = CreditsPhase::new(config.secs_to_tics(config.credits_hold_secs));
        let exit = self.run_phase(Phase::Credits(credits))?;
        if exit == GameAction::Title {
            return Ok(exit);
        }

        let names: Vec<String> = self
            .scheduler
            .config()
            .attract_demos()
            .into_iter()
            .map(str::to_owned)
            .collect();
        for name in &names {
            let exit = self.play_demo(name)?;
            if exit != GameAction::ExitDemo {
                return Ok(exit);
            }
        }

        self.run_title_map()
    }

    /// Maps and intermissions until the world stops asking for levels.
    ///
    /// # Errors
    ///
    /// Propagates fatal mini-loop errors, including a map that fails to
    /// load.
    pub fn run_gameplay(&mut self) -> LoopResult<GameAction> {
        loop {
            let exit = self.run_phase(Phase::Game(GamePhase::new()))?;
            match exit {
                GameAction::Completed => {
                    let exit = self.run_phase(Phase::Intermission(IntermissionPhase::new()))?;
                    if exit != GameAction::LoadLevel {
                        return Ok(exit);
                    }
                    self.advance_map();
                }
                action if action.reloads_level() => {}
                action => return Ok(action),
            }
        }
    }

    /// The opening, then the title sequence forever.
    ///
    /// # Errors
    ///
    /// Returns only on a fatal mini-loop error.
    pub fn run_forever(&mut self) -> LoopResult<Infallible> {
        self.run_opening()?;
        loop {
            let exit = self.run_sequence()?;
            tracing::debug!(%exit, "title sequence restarting");
        }
    }

    /// Plays one attract demo. A missing demo counts as finished.
    fn play_demo(&mut self, name: &str) -> LoopResult<GameAction> {
        let Some(script) = self.demos.load(name) else {
            tracing::warn!(demo = name, "demo not found, skipping");
            return Ok(GameAction::ExitDemo);
        };
        self.run_phase(Phase::Demo(DemoPhase::new(script)))
    }

    fn run_title_map(&mut self) -> LoopResult<GameAction> {
        let name = self.scheduler.config().title_map_demo.clone();
        let Some(script) = self.demos.load(&name) else {
            tracing::warn!(demo = %name, "title map not found, skipping");
            return Ok(GameAction::ExitDemo);
        };
        self.run_phase(Phase::Demo(DemoPhase::title_map(script)))
    }

    fn start_new_game(&mut self) {
        let state = self.scheduler.state_mut();
        state.map = 1;
        state.next_map = 2;
    }

    fn advance_map(&mut self) {
        let state = self.scheduler.state_mut();
        state.map = state.next_map;
        state.next_map += 1;
        tracing::info!(map = state.map, "advancing to next map");
    }
}

