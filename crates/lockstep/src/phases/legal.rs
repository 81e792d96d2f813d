//! Legal notice shown once at startup.

use lockstep_core::{
    Frame, GameAction, GameState, LoopPhase, LoopResult, PhaseContext, BLACK, WHITE,
};

/// A fixed page any key can skip.
#[derive(Debug, Clone)]
pub struct LegalPhase {
    duration: i32,
    pic: &'static str,
    x: i32,
    y: i32,
}

impl LegalPhase {
    /// Shows the default notice for `duration` tics.
    #[must_use]
    pub const fn new(duration: i32) -> Self {
        Self {
            duration,
            pic: "USLEGAL",
            x: 32,
            y: 72,
        }
    }
}

impl LoopPhase for LegalPhase {
    fn name(&self) -> &'static str {
        "legal"
    }

    fn start(&mut self, ctx: &mut PhaseContext<'_>) -> LoopResult<()> {
        ctx.state.flags.allow_menu = false;
        ctx.state.flags.menu_active = false;
        ctx.state.game_state = GameState::Skippable;
        ctx.state.start_page();
        Ok(())
    }

    fn draw(&self, frame: &mut Frame<'_>) {
        frame.presenter.clear(BLACK);
        frame.presenter.draw_gfx(self.x, self.y, self.pic, WHITE);
    }

    fn tick(&mut self, ctx: &mut PhaseContext<'_>) -> GameAction {
        if ctx.state.page_elapsed() >= self.duration {
            GameAction::PAGE_FINISHED
        } else {
            GameAction::Nothing
        }
    }
}
