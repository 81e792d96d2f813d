//! # Mini-Loop Verification
//!
//! Drives the scheduler with a hand-stepped clock and scripted peers:
//!
//! 1. **Tic duplication**: only the last replay sees chat and specials
//! 2. **Fairness**: a silent peer never starves the display
//! 3. **Pacing**: a node ahead of the key player asks to skip tics
//! 4. **Demo feed**: an exhausted demo ends the run with `ExitDemo`

use std::cell::Cell;

use lockstep_core::mock::{MockPresenter, MockSimulation, ScriptedInput};
use lockstep_core::ticcmd::{BTS_PAUSE, BT_ATTACK, BT_SPECIAL};
use lockstep_core::{
    DemoPlayback, DemoScript, Event, Frame, GameAction, GameState, LocalSession, LoopConfig,
    LoopError, LoopPhase, ManualClock, NetSync, PhaseContext, Scheduler, TicCmd, TicHistory,
    BACKUPTICS, MAXPLAYERS,
};
use lockstep_math::Fixed;

// ============================================================================
// HARNESS
// ============================================================================

/// Peers with fixed tic counts; the console player's count follows
/// `maketic`.
struct StubNet {
    history: TicHistory,
    in_game: [bool; MAXPLAYERS],
    console: usize,
    peer_tics: [i32; MAXPLAYERS],
    maketic: i32,
}

impl StubNet {
    fn new(console: usize, in_game: [bool; MAXPLAYERS], peer_tics: [i32; MAXPLAYERS]) -> Self {
        Self {
            history: TicHistory::new(),
            in_game,
            console,
            peer_tics,
            maketic: 0,
        }
    }
}

impl NetSync for StubNet {
    fn maketic(&self) -> i32 {
        self.maketic
    }

    fn submit_local(&mut self, cmd: TicCmd) {
        self.history.set(self.console, self.maketic, cmd);
        self.maketic += 1;
    }

    fn poll(&mut self) {}

    fn nettics(&self, player: usize) -> i32 {
        if player == self.console {
            self.maketic
        } else {
            self.peer_tics[player]
        }
    }

    fn player_in_game(&self, player: usize) -> bool {
        self.in_game.get(player).copied().unwrap_or(false)
    }

    fn console_player(&self) -> usize {
        self.console
    }

    fn is_netgame(&self) -> bool {
        self.in_game.iter().filter(|&&p| p).count() > 1
    }

    fn history(&self) -> &TicHistory {
        &self.history
    }
}

/// Phase that counts its callbacks and can end the run on a given tic.
#[derive(Default)]
struct Probe {
    draws: Cell<u32>,
    interpolated_draws: Cell<u32>,
    last_fraction: Cell<Option<Fixed>>,
    ticks: u32,
    started: bool,
    stopped: bool,
    finish_on_tick: Option<(u32, GameAction)>,
}

impl LoopPhase for Probe {
    fn name(&self) -> &'static str {
        "probe"
    }

    fn start(&mut self, ctx: &mut PhaseContext<'_>) -> lockstep_core::LoopResult<()> {
        self.started = true;
        ctx.state.game_state = GameState::Level;
        Ok(())
    }

    fn stop(&mut self, _ctx: &mut PhaseContext<'_>) {
        self.stopped = true;
    }

    fn draw(&self, frame: &mut Frame<'_>) {
        if frame.interpolated {
            self.interpolated_draws.set(self.interpolated_draws.get() + 1);
        } else {
            self.draws.set(self.draws.get() + 1);
        }
        self.last_fraction.set(Some(frame.fraction));
    }

    fn tick(&mut self, _ctx: &mut PhaseContext<'_>) -> GameAction {
        self.ticks += 1;
        match self.finish_on_tick {
            Some((tick, action)) if tick == self.ticks => action,
            _ => GameAction::Nothing,
        }
    }
}

type LocalScheduler = Scheduler<LocalSession, ManualClock, MockSimulation, MockPresenter>;

fn local(config: LoopConfig) -> (LocalScheduler, ManualClock, ScriptedInput) {
    let clock = ManualClock::new(config.tic_rate);
    let input = ScriptedInput::new();
    let scheduler = Scheduler::new(
        config,
        LocalSession::new(),
        clock.clone(),
        MockSimulation::new(),
        MockPresenter::new(),
        Box::new(input.clone()),
    );
    (scheduler, clock, input)
}

type NetScheduler = Scheduler<StubNet, ManualClock, MockSimulation, MockPresenter>;

fn with_net(net: StubNet) -> (NetScheduler, ManualClock) {
    let config = LoopConfig::default();
    let clock = ManualClock::new(config.tic_rate);
    let scheduler = Scheduler::new(
        config,
        net,
        clock.clone(),
        MockSimulation::new(),
        MockPresenter::new(),
        Box::new(ScriptedInput::new()),
    );
    (scheduler, clock)
}

// ============================================================================
// TIC DUPLICATION
// ============================================================================

#[test]
fn test_ticdup_clears_chat_and_special_on_early_replays() {
    let config = LoopConfig {
        ticdup: 3,
        ..LoopConfig::default()
    };
    let (mut scheduler, _clock, input) = local(config);

    let original = TicCmd {
        forward: 10,
        buttons: BT_SPECIAL | BTS_PAUSE,
        chat_char: b'x',
        ..TicCmd::default()
    };
    input.queue([original]);

    let mut phase = Probe::default();
    for _ in 0..10 {
        if scheduler.sim().ran().len() >= 3 {
            break;
        }
        assert_eq!(scheduler.step(&mut phase).unwrap(), GameAction::Nothing);
    }

    let ran = scheduler.sim().ran();
    assert!(ran.len() >= 3);
    for early in &ran[..2] {
        assert_eq!(early[0].chat_char, 0);
        assert_eq!(early[0].buttons, 0);
        assert_eq!(early[0].forward, 10);
    }
    assert_eq!(ran[2][0], original);
    assert_eq!(scheduler.state().gametic % 3, 0);
}

#[test]
fn test_ticdup_keeps_normal_buttons() {
    let config = LoopConfig {
        ticdup: 2,
        ..LoopConfig::default()
    };
    let (mut scheduler, _clock, input) = local(config);
    input.queue([TicCmd {
        buttons: BT_ATTACK,
        chat_char: b'y',
        ..TicCmd::default()
    }]);

    let mut phase = Probe::default();
    while scheduler.sim().ran().len() < 2 {
        scheduler.step(&mut phase).unwrap();
    }

    let ran = scheduler.sim().ran();
    assert_eq!(ran[0][0].buttons, BT_ATTACK);
    assert_eq!(ran[0][0].chat_char, 0);
    assert_eq!(ran[1][0].chat_char, b'y');
}

// ============================================================================
// FAIRNESS AND PACING
// ============================================================================

#[test]
fn test_silent_peer_still_gets_frames() {
    let net = StubNet::new(0, [true, true, false, false], [0; MAXPLAYERS]);
    let (mut scheduler, _clock) = with_net(net);

    let mut phase = Probe::default();
    for _ in 0..5 {
        assert_eq!(scheduler.step(&mut phase).unwrap(), GameAction::Nothing);
    }

    assert_eq!(scheduler.presenter().frames(), 5);
    assert_eq!(phase.draws.get(), 5);
    assert_eq!(scheduler.state().gametic, 0);
    assert_eq!(scheduler.stats().abandoned_waits, 5);
    assert!(scheduler.net().maketic() > 0);
}

#[test]
fn test_lookahead_is_capped() {
    let net = StubNet::new(0, [true, true, false, false], [0; MAXPLAYERS]);
    let (mut scheduler, clock) = with_net(net);

    clock.advance_tics(500);
    scheduler.step(&mut Probe::default()).unwrap();

    assert_eq!(scheduler.net().maketic(), BACKUPTICS as i32 / 2 - 1);
}

#[test]
fn test_node_ahead_of_key_player_requests_skip() {
    // Console is player 1; the key player 0 never advances.
    let net = StubNet::new(1, [true, true, false, false], [0; MAXPLAYERS]);
    let (mut scheduler, _clock) = with_net(net);

    let mut phase = Probe::default();
    for _ in 0..8 {
        scheduler.step(&mut phase).unwrap();
    }

    assert!(scheduler.stats().skip_requests >= 1);
    assert_eq!(scheduler.presenter().frames(), 8);
}

#[test]
fn test_node_behind_key_player_catches_up() {
    let net = StubNet::new(1, [true, true, false, false], [100, 0, 0, 0]);
    let (mut scheduler, clock) = with_net(net);

    clock.advance_tics(1);
    scheduler.step(&mut Probe::default()).unwrap();
    let after_first = scheduler.net().maketic();
    assert!(scheduler.stats().catch_ups >= 1);

    clock.advance_tics(1);
    scheduler.step(&mut Probe::default()).unwrap();
    // One tic of wall time plus one borrowed from the pacing nudge.
    assert!(scheduler.net().maketic() >= after_first + 2);
}

#[test]
fn test_low_tic_behind_game_tic_is_fatal() {
    let (mut scheduler, _clock, _input) = local(LoopConfig::default());
    scheduler.state_mut().gametic = 10;

    let err = scheduler.step(&mut Probe::default()).unwrap_err();
    assert_eq!(
        err,
        LoopError::LowTicBehind {
            low_tic: 0,
            game_tic: 10
        }
    );
}

// ============================================================================
// RUN / EXIT
// ============================================================================

#[test]
fn test_tick_action_ends_run_without_final_draw() {
    let (mut scheduler, clock, _input) = local(LoopConfig::default());
    let mut phase = Probe {
        finish_on_tick: Some((1, GameAction::NewGame)),
        ..Probe::default()
    };

    clock.advance_tics(1);
    let action = scheduler.run(&mut phase).unwrap();

    assert_eq!(action, GameAction::NewGame);
    assert!(phase.started);
    assert!(phase.stopped);
    assert_eq!(phase.ticks, 1);
    assert_eq!(phase.draws.get(), 0);
    assert_eq!(scheduler.presenter().frames(), 1);
    assert_eq!(scheduler.state().game_state, GameState::None);
}

#[test]
fn test_simulation_action_ends_run() {
    let (mut scheduler, _clock, _input) = local(LoopConfig::default());
    scheduler.sim_mut().schedule(4, GameAction::Completed);

    let action = scheduler.run(&mut Probe::default()).unwrap();

    assert_eq!(action, GameAction::Completed);
    assert_eq!(scheduler.state().gametic, 5);
}

#[test]
fn test_demo_feed_ends_with_exit_demo() {
    let (mut scheduler, _clock, input) = local(LoopConfig::default());
    let recorded = TicCmd {
        forward: 50,
        ..TicCmd::default()
    };
    let state = scheduler.state_mut();
    state.flags.demoplayback = true;
    state.demo = Some(DemoPlayback::new(DemoScript::single(
        "DEMO1LMP",
        [recorded; 3],
    )));

    let action = scheduler.run(&mut Probe::default()).unwrap();

    assert_eq!(action, GameAction::ExitDemo);
    let ran = scheduler.sim().ran();
    assert_eq!(ran.len(), 3);
    assert!(ran.iter().all(|cmds| cmds[0] == recorded));
    // Live input is still collected but never reaches the world.
    assert!(input.built() > 0);
}

// ============================================================================
// INPUT AND PRESENTATION
// ============================================================================

#[test]
fn test_event_overflow_drops_oldest_before_dispatch() {
    let (mut scheduler, clock, input) = local(LoopConfig::default());
    let events = scheduler.events();
    for code in 0..70 {
        events.post(Event::down(code));
    }
    assert_eq!(events.overflow_count(), 6);

    clock.advance_tics(1);
    scheduler.step(&mut Probe::default()).unwrap();

    let seen = input.events();
    assert_eq!(seen.len(), 64);
    assert_eq!(seen[0], Event::down(6));
    assert_eq!(seen[63], Event::down(69));
    assert!(events.is_empty());
}

#[test]
fn test_interpolated_frames_draw_previous_state() {
    let config = LoopConfig {
        interpolate_frames: true,
        ..LoopConfig::default()
    };
    let (mut scheduler, clock, _input) = local(config);

    let mut phase = Probe::default();
    for _ in 0..3 {
        clock.advance_tics(1);
        scheduler.step(&mut phase).unwrap();
    }

    assert!(phase.interpolated_draws.get() >= 3);
    assert_eq!(phase.draws.get(), 3);
    assert_eq!(
        scheduler.stats().interpolated_frames,
        u64::from(phase.interpolated_draws.get())
    );
    assert!(clock.marks() >= 1);
    // The last draw of each iteration is the full-tic frame.
    assert_eq!(phase.last_fraction.get(), Some(Fixed::ONE));
}

#[test]
fn test_refused_display_skips_drawing() {
    let config = LoopConfig {
        interpolate_frames: true,
        ..LoopConfig::default()
    };
    let clock = ManualClock::new(config.tic_rate);
    let mut scheduler = Scheduler::new(
        config,
        LocalSession::new(),
        clock.clone(),
        MockSimulation::new(),
        MockPresenter::new().refusing_display(),
        Box::new(ScriptedInput::new()),
    );

    let mut phase = Probe::default();
    clock.advance_tics(2);
    scheduler.step(&mut phase).unwrap();

    assert_eq!(phase.draws.get() + phase.interpolated_draws.get(), 0);
    assert_eq!(scheduler.presenter().frames(), 0);
    assert!(scheduler.state().gametic > 0);
    assert!(scheduler.presenter().sound_updates() >= 1);
}

#[test]
fn test_new_sync_runs_every_available_tic() {
    let config = LoopConfig {
        new_sync: true,
        ..LoopConfig::default()
    };
    let (mut scheduler, clock, _input) = local(config);

    clock.advance_tics(10);
    scheduler.step(&mut Probe::default()).unwrap();

    assert_eq!(scheduler.state().gametic, 10);
    assert_eq!(scheduler.pacing().frameon, 0);
}
