//! Title screen with the main menu open.

use lockstep_core::{rgba, Frame, GameAction, LoopPhase, LoopResult, PhaseContext, BLACK};

/// Title page. Times out only while the main menu stays open.
#[derive(Debug, Clone)]
pub struct TitlePhase {
    timeout: i32,
}

impl TitlePhase {
    /// Creates a title page that moves on after `timeout` tics.
    #[must_use]
    pub const fn new(timeout: i32) -> Self {
        Self { timeout }
    }
}

impl LoopPhase for TitlePhase {
    fn name(&self) -> &'static str {
        "title"
    }

    fn start(&mut self, ctx: &mut PhaseContext<'_>) -> LoopResult<()> {
        let flags = &mut ctx.state.flags;
        flags.allow_menu = true;
        flags.menu_active = true;
        flags.main_menu_active = true;
        flags.usergame = false;
        flags.paused = false;
        ctx.state.start_page();
        Ok(())
    }

    fn stop(&mut self, ctx: &mut PhaseContext<'_>) {
        let flags = &mut ctx.state.flags;
        flags.main_menu_active = false;
        flags.menu_active = false;
        flags.allow_menu = false;
    }

    fn draw(&self, frame: &mut Frame<'_>) {
        frame.presenter.clear(BLACK);
        frame
            .presenter
            .draw_gfx(58, 50, "TITLE", rgba(255, 255, 255, 0x64));
    }

    fn tick(&mut self, ctx: &mut PhaseContext<'_>) -> GameAction {
        if ctx.state.flags.main_menu_active {
            if ctx.state.page_elapsed() >= self.timeout {
                return GameAction::PAGE_FINISHED;
            }
        } else {
            // The timer only runs while nobody is browsing a submenu.
            ctx.state.start_page();
        }
        GameAction::Nothing
    }
}
