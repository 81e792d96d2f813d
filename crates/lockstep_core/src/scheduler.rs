//! # Tic Scheduler
//!
//! The mini-loop: one call to [`Scheduler::run`] drives a phase until it
//! produces a [`GameAction`].
//!
//! ```text
//! Iteration:
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. REAL TICS      wall-clock tics since the previous iteration       │
//! │ 2. PRE-DRAW       (interpolation) previous state, read-only          │
//! │ 3. NET UPDATE     build local tics from input, poll peers            │
//! │ 4. DECIDE         counts from real vs. available tics; key-player    │
//! │                   pacing and skip requests                           │
//! │ 5. WAIT           spin/sleep for peers, at most one real tic         │
//! │ 6. SIMULATE       counts x ticdup steps, net update after each       │
//! │ 7. DRAW           phase draw, interface, present                     │
//! │ 8. CLEANUP        reset the scratch arena                            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tic numbers seen by the network are logical tics: `gametic / ticdup`.

use lockstep_math::Fixed;

use crate::action::GameAction;
use crate::clock::TicClock;
use crate::config::LoopConfig;
use crate::error::{LoopError, LoopResult};
use crate::event::{ResponderChain, SharedEventQueue};
use crate::memory::ScratchArena;
use crate::phase::{Frame, LoopPhase, PhaseContext};
use crate::state::{GameState, LoopState, SessionFlags};
use crate::ticcmd::{TicCmd, BACKUPTICS, MAXPLAYERS};
use crate::traits::{GameInput, NetSync, Presenter, Simulation};

/// Local tics may be built at most this far ahead of the simulation.
const MAX_LOOKAHEAD: i32 = BACKUPTICS as i32 / 2 - 1;

/// Pacing state carried across iterations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pacing {
    /// Iterations that went through pacing.
    pub frameon: u32,
    /// Rolling window: was the local side ahead of the key player?
    pub frameskip: [bool; 4],
    /// `maketic` at the previous pacing check.
    pub old_nettics: i32,
    /// Wall-clock logical tic at the start of the previous iteration.
    pub old_enter_tics: i32,
    /// Wall-clock logical tic of the last network update.
    pub last_make_time: i32,
    /// Local tics still to be skipped.
    pub skip_tics: i32,
}

/// Loop counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Iterations run.
    pub iterations: u64,
    /// Frames presented at the end of an iteration.
    pub frames: u64,
    /// Extra interpolated frames.
    pub interpolated_frames: u64,
    /// Simulation steps run, counting duplicates.
    pub tics_run: u64,
    /// Waits given up after a real tic passed.
    pub abandoned_waits: u64,
    /// Extra local tics built to catch up with the key player.
    pub catch_ups: u64,
    /// Times all four pacing windows asked for a skipped tic.
    pub skip_requests: u64,
}

/// Owner of the loop state and all collaborators.
pub struct Scheduler<N, C, S, P> {
    config: LoopConfig,
    ticdup: i32,
    net: N,
    clock: C,
    sim: S,
    presenter: P,
    input: Box<dyn GameInput>,
    responders: ResponderChain,
    events: SharedEventQueue,
    state: LoopState,
    arena: ScratchArena,
    pacing: Pacing,
    stats: LoopStats,
}

impl<N, C, S, P> Scheduler<N, C, S, P>
where
    N: NetSync,
    C: TicClock,
    S: Simulation,
    P: Presenter,
{
    /// Creates a scheduler.
    ///
    /// # Arguments
    ///
    /// * `config` - Validated loop configuration
    /// * `net` - Network layer
    /// * `clock` - Wall-clock source
    /// * `sim` - The game world
    /// * `presenter` - Renderer and display
    /// * `input` - Gameplay responder and tic command builder
    #[must_use]
    pub fn new(
        config: LoopConfig,
        net: N,
        clock: C,
        sim: S,
        presenter: P,
        input: Box<dyn GameInput>,
    ) -> Self {
        let ticdup = i32::try_from(config.ticdup).unwrap_or(1).max(1);
        let now = clock.now_tics() / ticdup;
        let flags = SessionFlags {
            devparm: config.devparm,
            netgame: net.is_netgame(),
            ..SessionFlags::default()
        };

        Self {
            arena: ScratchArena::new(config.scratch_bytes),
            ticdup,
            net,
            clock,
            sim,
            presenter,
            input,
            responders: ResponderChain::new(),
            events: SharedEventQueue::new(),
            state: LoopState::new(flags),
            pacing: Pacing {
                old_enter_tics: now,
                last_make_time: now,
                ..Pacing::default()
            },
            stats: LoopStats::default(),
            config,
        }
    }

    /// Replaces the responders ahead of gameplay input.
    #[must_use]
    pub fn with_responders(mut self, responders: ResponderChain) -> Self {
        self.responders = responders;
        self
    }

    /// Uses an existing event queue (for backends created first).
    #[must_use]
    pub fn with_events(mut self, events: SharedEventQueue) -> Self {
        self.events = events;
        self
    }

    // ========================================================================
    // MINI-LOOP
    // ========================================================================

    /// Runs `phase` until it, the simulation, or a responder requests a
    /// transition.
    ///
    /// # Errors
    ///
    /// Fails if the phase cannot start or the network breaks the tic
    /// ordering invariants. Both are fatal.
    pub fn run(&mut self, phase: &mut dyn LoopPhase) -> LoopResult<GameAction> {
        self.state.action = GameAction::Nothing;

        let mut ctx = PhaseContext {
            state: &mut self.state,
            sim: &mut self.sim,
            cmds: [TicCmd::default(); MAXPLAYERS],
            in_game: roster(&self.net),
        };
        phase.start(&mut ctx)?;
        tracing::info!(
            phase = phase.name(),
            gametic = self.state.gametic,
            "mini-loop start"
        );

        let mut action = GameAction::Nothing;
        while action.is_nothing() {
            action = self.step(phase)?;
        }

        self.state.game_state = GameState::None;
        let mut ctx = PhaseContext {
            state: &mut self.state,
            sim: &mut self.sim,
            cmds: [TicCmd::default(); MAXPLAYERS],
            in_game: roster(&self.net),
        };
        phase.stop(&mut ctx);

        tracing::info!(
            phase = phase.name(),
            %action,
            gametic = self.state.gametic,
            "mini-loop exit"
        );
        Ok(action)
    }

    /// Runs a single iteration of the mini-loop.
    ///
    /// Returns the exit action captured during this iteration, or
    /// [`GameAction::Nothing`] to keep going. Does not call `start` or
    /// `stop`.
    ///
    /// # Errors
    ///
    /// [`LoopError::LowTicBehind`] or [`LoopError::GameTicAhead`] if the
    /// network reports inconsistent tic counts.
    pub fn step(&mut self, phase: &mut dyn LoopPhase) -> LoopResult<GameAction> {
        let ticdup = self.ticdup;
        let mut action = GameAction::Nothing;
        self.stats.iterations += 1;

        let enter_tic = self.clock.now_tics() / ticdup;
        let real_tics = enter_tic - self.pacing.old_enter_tics;
        self.pacing.old_enter_tics = enter_tic;

        if self.config.interpolate_frames {
            self.draw_interpolated(phase);
        }

        self.net_update();
        let mut low_tic = self.net.low_tic();
        let available = low_tic - self.state.gametic / ticdup;

        'simulate: {
            let Some(counts) = self.decide_counts(real_tics, available) else {
                break 'simulate;
            };

            while !self.net.players_in_game() || low_tic < self.state.gametic / ticdup + counts {
                self.net_update();
                low_tic = self.net.low_tic();

                let game_tic = self.state.gametic / ticdup;
                if low_tic < game_tic {
                    return Err(LoopError::LowTicBehind { low_tic, game_tic });
                }

                if self.config.interpolate_frames {
                    self.draw_interpolated(phase);
                }

                // Menus keep running while peers stall; go draw them.
                if self.clock.now_tics() / ticdup - enter_tic > 0 {
                    self.stats.abandoned_waits += 1;
                    break 'simulate;
                }

                self.clock.sleep_ms(self.config.wait_sleep_ms);
            }

            action = self.run_tics(phase, counts, low_tic)?;
        }

        self.present(phase, action);
        self.arena.reset();

        Ok(action)
    }

    /// Decides how many logical tics to run. `None` means nobody is in the
    /// game and the iteration should go straight to drawing.
    fn decide_counts(&mut self, real_tics: i32, available: i32) -> Option<i32> {
        if self.config.new_sync {
            return Some(available.max(1));
        }

        let counts = if real_tics < available - 1 {
            real_tics + 1
        } else if real_tics < available {
            real_tics
        } else {
            available
        };

        self.pacing.frameon = self.pacing.frameon.wrapping_add(1);

        if !self.state.flags.demoplayback {
            let key = self.net.key_player()?;
            if self.net.console_player() != key {
                self.follow_key_player(key);
            }
        }

        Some(counts.max(1))
    }

    /// Keeps a non-key node within a few tics of the key player.
    fn follow_key_player(&mut self, key: usize) {
        let maketic = self.net.maketic();
        let key_tics = self.net.nettics(key);

        if maketic <= key_tics {
            // Behind: the next network update builds one extra tic.
            self.pacing.last_make_time -= 1;
            self.stats.catch_ups += 1;
            tracing::debug!(maketic, key_tics, "behind key player");
        }

        let window = (self.pacing.frameon & 3) as usize;
        self.pacing.frameskip[window] = self.pacing.old_nettics > key_tics;
        self.pacing.old_nettics = maketic;

        if self.pacing.frameskip.iter().all(|&ahead| ahead) {
            self.pacing.skip_tics = 1;
            self.stats.skip_requests += 1;
            tracing::debug!(maketic, key_tics, "ahead of key player, skipping a tic");
        }
    }

    /// Runs `counts` logical tics, each `ticdup` times.
    fn run_tics(
        &mut self,
        phase: &mut dyn LoopPhase,
        counts: i32,
        low_tic: i32,
    ) -> LoopResult<GameAction> {
        let ticdup = self.ticdup;
        let mut action = GameAction::Nothing;

        for _ in 0..counts {
            for dup in 0..ticdup {
                if !self.net.players_in_game() {
                    break;
                }

                let game_tic = self.state.gametic / ticdup;
                if game_tic > low_tic {
                    return Err(LoopError::GameTicAhead { game_tic, low_tic });
                }

                if self.config.interpolate_frames {
                    self.clock.mark_tic();
                }

                if let Some(cmds) = self.step_commands(dup) {
                    self.sim.advance_one_tic(&mut self.state, &cmds);

                    let mut ctx = PhaseContext {
                        state: &mut self.state,
                        sim: &mut self.sim,
                        cmds,
                        in_game: roster(&self.net),
                    };
                    let result = phase.tick(&mut ctx);
                    if !result.is_nothing() {
                        action = result;
                    }
                }

                if !self.state.action.is_nothing() {
                    action = self.state.action;
                }

                self.state.gametic += 1;
                self.stats.tics_run += 1;
            }

            self.net_update();
        }

        Ok(action)
    }

    /// Commands for one simulation step.
    ///
    /// Every duplicate but the last sees chat and special actions cleared.
    /// Returns `None` when an attached demo has run out.
    fn step_commands(&mut self, dup: i32) -> Option<[TicCmd; MAXPLAYERS]> {
        let last_dup = dup == self.ticdup - 1;
        let shape = |cmds: [TicCmd; MAXPLAYERS]| {
            if last_dup {
                cmds
            } else {
                cmds.map(TicCmd::for_duplicate)
            }
        };

        if let Some(demo) = self.state.demo.as_mut() {
            let tic = if dup == 0 {
                demo.next_tic()
            } else {
                demo.current()
            };
            if tic.is_none() && self.state.action.is_nothing() {
                tracing::info!(demo = demo.name(), tics = demo.position(), "demo finished");
                self.state.action = GameAction::ExitDemo;
            }
            return tic.map(shape);
        }

        let tic = self.state.gametic / self.ticdup;
        let history = self.net.history();
        let mut cmds = [TicCmd::default(); MAXPLAYERS];
        for (player, cmd) in cmds.iter_mut().enumerate() {
            if self.net.player_in_game(player) {
                *cmd = history.get(player, tic);
            }
        }
        Some(shape(cmds))
    }

    // ========================================================================
    // NETWORK
    // ========================================================================

    /// Builds local tics for the wall-clock time that passed, then polls
    /// peers.
    ///
    /// Input events are drained through the responder chain once per tic
    /// built. `maketic` never runs more than `BACKUPTICS / 2 - 1` tics
    /// ahead of the simulation.
    pub fn net_update(&mut self) {
        let now = self.clock.now_tics() / self.ticdup;
        let mut new_tics = now - self.pacing.last_make_time;
        self.pacing.last_make_time = now;

        if new_tics > 0 {
            if self.pacing.skip_tics <= new_tics {
                new_tics -= self.pacing.skip_tics;
                self.pacing.skip_tics = 0;
            } else {
                self.pacing.skip_tics -= new_tics;
                new_tics = 0;
            }

            let game_tic = self.state.gametic / self.ticdup;
            for _ in 0..new_tics {
                self.process_events();
                if self.net.maketic() - game_tic >= MAX_LOOKAHEAD {
                    break;
                }
                let cmd = self.input.build_ticcmd(&self.state);
                self.net.submit_local(cmd);
            }
        }

        self.net.poll();
    }

    /// Sends every queued event down the responder chain.
    fn process_events(&mut self) {
        for event in self.events.drain() {
            self.responders
                .dispatch(&event, &mut self.state, self.input.as_mut());
        }
    }

    // ========================================================================
    // PRESENTATION
    // ========================================================================

    /// Final frame of an iteration. The phase draw is skipped once an exit
    /// action is pending.
    fn present(&mut self, phase: &dyn LoopPhase, action: GameAction) {
        self.presenter.update_sounds();

        if self.config.interpolate_frames && !self.presenter.start_display() {
            return;
        }

        if action.is_nothing() {
            let mut frame = Frame {
                state: &self.state,
                sim: &self.sim,
                presenter: &mut self.presenter,
                arena: &self.arena,
                fraction: Fixed::ONE,
                interpolated: false,
            };
            phase.draw(&mut frame);
        }

        self.presenter.draw_interface(&self.state.flags);
        self.finish_draw();
        self.stats.frames += 1;
    }

    /// Extra frame of the previous state for smooth pacing.
    fn draw_interpolated(&mut self, phase: &dyn LoopPhase) {
        if !self.presenter.start_display() {
            return;
        }

        let mut frame = Frame {
            state: &self.state,
            sim: &self.sim,
            presenter: &mut self.presenter,
            arena: &self.arena,
            fraction: self.clock.tic_fraction(),
            interpolated: true,
        };
        phase.draw(&mut frame);

        self.presenter.draw_interface(&self.state.flags);
        self.finish_draw();
        self.stats.interpolated_frames += 1;
    }

    fn finish_draw(&mut self) {
        self.net_update();
        self.presenter.finish_update();
        if self.config.interpolate_frames {
            self.presenter.end_display();
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    /// Loop configuration.
    #[must_use]
    pub const fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Shared loop state.
    #[must_use]
    pub const fn state(&self) -> &LoopState {
        &self.state
    }

    /// Shared loop state, mutable.
    pub fn state_mut(&mut self) -> &mut LoopState {
        &mut self.state
    }

    /// Network layer.
    #[must_use]
    pub const fn net(&self) -> &N {
        &self.net
    }

    /// Network layer, mutable.
    pub fn net_mut(&mut self) -> &mut N {
        &mut self.net
    }

    /// Wall-clock source.
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// The game world.
    #[must_use]
    pub const fn sim(&self) -> &S {
        &self.sim
    }

    /// The game world, mutable.
    pub fn sim_mut(&mut self) -> &mut S {
        &mut self.sim
    }

    /// Renderer.
    #[must_use]
    pub const fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Renderer, mutable.
    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Handle for posting input events.
    #[must_use]
    pub fn events(&self) -> SharedEventQueue {
        self.events.clone()
    }

    /// Per-iteration scratch budget.
    #[must_use]
    pub const fn arena(&self) -> &ScratchArena {
        &self.arena
    }

    /// Pacing state.
    #[must_use]
    pub const fn pacing(&self) -> &Pacing {
        &self.pacing
    }

    /// Loop counters.
    #[must_use]
    pub const fn stats(&self) -> &LoopStats {
        &self.stats
    }

    /// Replay factor.
    #[must_use]
    pub const fn ticdup(&self) -> i32 {
        self.ticdup
    }
}

/// Which players are in the game.
fn roster<N: NetSync>(net: &N) -> [bool; MAXPLAYERS] {
    std::array::from_fn(|player| net.player_in_game(player))
}
