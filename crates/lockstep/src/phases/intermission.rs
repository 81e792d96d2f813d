//! # Intermission
//!
//! Cluster text between maps.
//!
//! ## Sequence
//!
//! 1. Background fades in, 8 alpha per tic
//! 2. Text lines fade in one at a time, 6 alpha per tic
//! 3. Attack or use moves on (any time in developer mode)
//! 4. Clusters with `scroll_text_end` then scroll the text away before the
//!    finale; the rest load the next map straight away

use lockstep_core::{
    rgba, Cluster, Frame, GameAction, GameState, LoopPhase, LoopResult, PhaseContext, BLACK,
    MAXPLAYERS, WHITE,
};
use lockstep_core::ticcmd::{BT_ATTACK, BT_USE};

/// Virtual screen height the text is laid out on.
pub const SCREEN_HEIGHT: i32 = 240;

/// Pixels between text lines.
pub const LINE_HEIGHT: i32 = 14;

/// Lines kept from the cluster text.
pub const MAX_LINES: usize = 16;

const BACKGROUND_STEP: i32 = 8;
const TEXT_STEP: i32 = 6;

/// Splits cluster text into display lines.
///
/// Blank lines become a single space so they still take up a row. Text
/// after the last newline is a line of its own only if it is non-empty.
#[must_use]
pub fn layout_text(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text
        .split('\n')
        .map(|line| {
            if line.is_empty() {
                " ".to_string()
            } else {
                line.to_string()
            }
        })
        .collect();

    if text.is_empty() || text.ends_with('\n') {
        lines.pop();
    }
    lines.truncate(MAX_LINES);
    lines
}

/// Between-map text screen.
#[derive(Debug, Clone, Default)]
pub struct IntermissionPhase {
    cluster: Option<Cluster>,
    lines: Vec<String>,
    background_alpha: i32,
    line_alpha: i32,
    slot: usize,
    done: bool,
    fading_out: bool,
    text_offset: i32,
    attack_down: [bool; MAXPLAYERS],
    use_down: [bool; MAXPLAYERS],
}

impl IntermissionPhase {
    /// Creates the phase. The cluster is looked up when it starts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Display lines of the current cluster.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Line currently fading in.
    #[must_use]
    pub const fn slot(&self) -> usize {
        self.slot
    }

    /// Returns true once every line is shown.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    /// Returns true while the text scrolls away.
    #[must_use]
    pub const fn is_fading_out(&self) -> bool {
        self.fading_out
    }

    /// Moves on: scroll the text away or load the next map.
    fn finish(&mut self, ctx: &mut PhaseContext<'_>) {
        if self.fading_out {
            return;
        }
        if self.cluster.as_ref().is_some_and(|c| c.scroll_text_end) {
            self.fading_out = true;
        } else {
            ctx.state.action = GameAction::LoadLevel;
        }
        self.done = true;
    }

    /// Updates button state. Returns true on a fresh attack or use press.
    fn track_buttons(&mut self, ctx: &PhaseContext<'_>) -> bool {
        let mut pressed = false;
        for player in (0..MAXPLAYERS).filter(|&p| ctx.in_game[p]) {
            let buttons = ctx.cmds[player].buttons;

            let attack = buttons & BT_ATTACK != 0;
            pressed |= attack && !self.attack_down[player];
            self.attack_down[player] = attack;

            let use_held = buttons & BT_USE != 0;
            pressed |= use_held && !self.use_down[player];
            self.use_down[player] = use_held;
        }
        pressed
    }
}

impl LoopPhase for IntermissionPhase {
    fn name(&self) -> &'static str {
        "intermission"
    }

    fn start(&mut self, ctx: &mut PhaseContext<'_>) -> LoopResult<()> {
        *self = Self::new();
        ctx.state.game_state = GameState::Intermission;

        let cluster = ctx
            .sim
            .cluster(ctx.state.next_map)
            .or_else(|| ctx.sim.cluster(ctx.state.map));

        match cluster {
            Some(cluster) => {
                self.lines = layout_text(&cluster.text);
                self.cluster = Some(cluster);
            }
            None => {
                tracing::debug!(map = ctx.state.map, "no cluster, skipping intermission");
                ctx.state.action = GameAction::LoadLevel;
            }
        }
        Ok(())
    }

    fn draw(&self, frame: &mut Frame<'_>) {
        frame.presenter.clear(BLACK);
        let Some(cluster) = &self.cluster else {
            return;
        };

        let background = if cluster.scroll_text_end {
            rgba(255, 255, 255, self.background_alpha as u8)
        } else {
            WHITE
        };
        frame
            .presenter
            .draw_gfx(cluster.pic_x, cluster.pic_y, &cluster.pic, background);

        if !self.fading_out && self.background_alpha < 0xff {
            return;
        }

        let count = self.lines.len() as i32;
        let mut y = SCREEN_HEIGHT / 2 - count * LINE_HEIGHT / 2 - self.text_offset;
        for (index, line) in self.lines.iter().enumerate().take(self.slot + 1) {
            let alpha = if index == self.slot { self.line_alpha } else { 0xff };
            frame
                .presenter
                .draw_text(-1, y, rgba(255, 255, 255, alpha as u8), line);
            y += LINE_HEIGHT;
        }
    }

    fn tick(&mut self, ctx: &mut PhaseContext<'_>) -> GameAction {
        if self.fading_out {
            self.text_offset += 1;
            if self.text_offset <= SCREEN_HEIGHT {
                return GameAction::Nothing;
            }
            return if self.cluster.as_ref().is_some_and(|c| c.enter_only) {
                GameAction::LoadLevel
            } else {
                GameAction::Finale
            };
        }

        let pressed = self.track_buttons(ctx);

        self.background_alpha = (self.background_alpha + BACKGROUND_STEP).min(0xff);
        if self.background_alpha < 0xff {
            return GameAction::Nothing;
        }

        if pressed && (self.done || ctx.state.flags.devparm) {
            self.finish(ctx);
        }

        if self.done {
            return GameAction::Nothing;
        }

        self.line_alpha += TEXT_STEP;
        if self.line_alpha >= 0xff {
            self.line_alpha = 0xff;
            if self.slot + 1 >= self.lines.len() {
                self.done = true;
                return GameAction::Nothing;
            }
            self.slot += 1;
            self.line_alpha = 0;
        }

        GameAction::Nothing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockstep_core::mock::{DrawCall, MockPresenter, MockSimulation};
    use lockstep_core::{LoopState, ScratchArena, SessionFlags, TicCmd};
    use lockstep_math::Fixed;

    struct Rig {
        state: LoopState,
        sim: MockSimulation,
        phase: IntermissionPhase,
        buttons: u8,
    }

    impl Rig {
        fn new(cluster: Cluster) -> Self {
            let mut rig = Self {
                state: LoopState::new(SessionFlags::default()),
                sim: MockSimulation::new().with_cluster(2, cluster),
                phase: IntermissionPhase::new(),
                buttons: 0,
            };
            let mut ctx = PhaseContext {
                state: &mut rig.state,
                sim: &mut rig.sim,
                cmds: [TicCmd::default(); MAXPLAYERS],
                in_game: [true, false, false, false],
            };
            rig.phase.start(&mut ctx).unwrap();
            rig
        }

        fn tick(&mut self) -> GameAction {
            let mut cmds = [TicCmd::default(); MAXPLAYERS];
            cmds[0].buttons = self.buttons;
            let mut ctx = PhaseContext {
                state: &mut self.state,
                sim: &mut self.sim,
                cmds,
                in_game: [true, false, false, false],
            };
            let action = self.phase.tick(&mut ctx);
            if action.is_nothing() {
                ctx.state.action
            } else {
                action
            }
        }

        fn draw(&self) -> MockPresenter {
            let mut presenter = MockPresenter::new();
            let arena = ScratchArena::new(1024);
            let mut frame = Frame {
                state: &self.state,
                sim: &self.sim,
                presenter: &mut presenter,
                arena: &arena,
                fraction: Fixed::ONE,
                interpolated: false,
            };
            self.phase.draw(&mut frame);
            presenter
        }
    }

    fn cluster(text: &str, scroll_text_end: bool, enter_only: bool) -> Cluster {
        Cluster {
            text: text.to_string(),
            pic: "EVIL".to_string(),
            pic_x: 0,
            pic_y: 0,
            scroll_text_end,
            enter_only,
        }
    }

    #[test]
    fn test_layout_text() {
        assert_eq!(layout_text("A\n\nB"), vec!["A", " ", "B"]);
        assert_eq!(layout_text("A\nB\n"), vec!["A", "B"]);
        assert!(layout_text("").is_empty());
        assert_eq!(layout_text(&"x\n".repeat(40)).len(), MAX_LINES);
    }

    #[test]
    fn test_background_fades_before_text() {
        let mut rig = Rig::new(cluster("ONE\nTWO", false, false));
        assert_eq!(rig.state.game_state, GameState::Intermission);

        for _ in 0..31 {
            rig.tick();
        }
        let presenter = rig.draw();
        let calls = presenter.current();
        assert_eq!(calls.len(), 2);
        assert!(matches!(calls[1], DrawCall::Gfx { color: WHITE, .. }));

        rig.tick();
        let presenter = rig.draw();
        let calls = presenter.current();
        assert!(matches!(
            &calls[2],
            DrawCall::Text { y, text, .. } if *y == SCREEN_HEIGHT / 2 - 14 && text == "ONE"
        ));
    }

    #[test]
    fn test_lines_fade_in_then_wait_for_press() {
        let mut rig = Rig::new(cluster("ONE\n\nTHREE", false, false));
        assert_eq!(rig.phase.lines().len(), 3);

        for _ in 0..500 {
            assert_eq!(rig.tick(), GameAction::Nothing);
        }
        assert!(rig.phase.is_done());
        assert_eq!(rig.phase.slot(), 2);

        rig.buttons = BT_USE;
        assert_eq!(rig.tick(), GameAction::LoadLevel);
    }

    #[test]
    fn test_held_button_is_not_a_press() {
        let mut rig = Rig::new(cluster("ONE", false, false));
        rig.buttons = BT_ATTACK;
        for _ in 0..500 {
            assert_eq!(rig.tick(), GameAction::Nothing);
        }
        rig.buttons = 0;
        rig.tick();
        rig.buttons = BT_ATTACK;
        assert_eq!(rig.tick(), GameAction::LoadLevel);
    }

    #[test]
    fn test_scroll_then_finale() {
        let mut rig = Rig::new(cluster("THE END", true, false));
        for _ in 0..200 {
            rig.tick();
        }
        rig.buttons = BT_ATTACK;
        assert_eq!(rig.tick(), GameAction::Nothing);
        assert!(rig.phase.is_fading_out());

        let mut tics = 0;
        let action = loop {
            let action = rig.tick();
            tics += 1;
            if !action.is_nothing() {
                break action;
            }
        };
        assert_eq!(action, GameAction::Finale);
        assert_eq!(tics, SCREEN_HEIGHT + 1);
    }

    #[test]
    fn test_enter_only_cluster_loads_next_map() {
        let mut rig = Rig::new(cluster("HELLO", true, true));
        for _ in 0..200 {
            rig.tick();
        }
        rig.buttons = BT_USE;
        rig.tick();
        let action = (0..=SCREEN_HEIGHT).map(|_| rig.tick()).last();
        assert_eq!(action, Some(GameAction::LoadLevel));
    }

    #[test]
    fn test_missing_cluster_loads_level() {
        let mut state = LoopState::new(SessionFlags::default());
        let mut sim = MockSimulation::new();
        let mut phase = IntermissionPhase::new();
        let mut ctx = PhaseContext {
            state: &mut state,
            sim: &mut sim,
            cmds: [TicCmd::default(); MAXPLAYERS],
            in_game: [true, false, false, false],
        };
        phase.start(&mut ctx).unwrap();
        assert_eq!(state.action, GameAction::LoadLevel);
    }
}
