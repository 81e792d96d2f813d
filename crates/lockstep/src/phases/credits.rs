//! # Credits
//!
//! Three screens, each a picture and a caption:
//!
//! ```text
//! FadeIn ──► TextIn ──► Hold ──► Next ──► (next screen or done)
//!  pic +8     text +8    both -8
//!                        after hold
//! ```

use lockstep_core::{
    rgba, Frame, GameAction, GameState, LoopPhase, LoopResult, PhaseContext, BLACK,
};

/// Alpha change per tic.
const FADE_STEP: i32 = 8;

/// Picture and caption of each screen: `(name, x, y)`.
const SCREENS: [[(&str, i32, i32); 2]; 3] = [
    [("IDCRED1", 72, 24), ("IDCRED2", 40, 40)],
    [("WMSCRED1", 16, 80), ("WMSCRED2", 32, 24)],
    [("EVIL", 64, 30), ("FANCRED", 40, 52)],
];

/// Where the current screen is in its fade cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreditStage {
    /// Picture fading in.
    #[default]
    FadeIn,
    /// Caption fading in.
    TextIn,
    /// Holding, then fading both out.
    Hold,
    /// Screen finished.
    Next,
}

/// The credits sequence.
#[derive(Debug, Clone)]
pub struct CreditsPhase {
    hold: i32,
    stage: CreditStage,
    screen: usize,
    pic_alpha: i32,
    text_alpha: i32,
}

impl CreditsPhase {
    /// Creates the sequence; each screen is held for `hold` tics after it
    /// appears.
    #[must_use]
    pub const fn new(hold: i32) -> Self {
        Self {
            hold,
            stage: CreditStage::FadeIn,
            screen: 0,
            pic_alpha: 0,
            text_alpha: 0,
        }
    }

    /// Current stage.
    #[must_use]
    pub const fn stage(&self) -> CreditStage {
        self.stage
    }

    /// Index of the screen being shown.
    #[must_use]
    pub const fn screen(&self) -> usize {
        self.screen
    }

    /// Picture and caption alpha.
    #[must_use]
    pub const fn alphas(&self) -> (i32, i32) {
        (self.pic_alpha, self.text_alpha)
    }
}

impl LoopPhase for CreditsPhase {
    fn name(&self) -> &'static str {
        "credits"
    }

    fn start(&mut self, ctx: &mut PhaseContext<'_>) -> LoopResult<()> {
        *self = Self::new(self.hold);
        let flags = &mut ctx.state.flags;
        flags.allow_menu = false;
        flags.menu_active = false;
        flags.usergame = false;
        flags.paused = false;
        ctx.state.game_state = GameState::Skippable;
        ctx.state.start_page();
        Ok(())
    }

    fn draw(&self, frame: &mut Frame<'_>) {
        frame.presenter.clear(BLACK);
        let Some(&[(pic, px, py), (text, tx, ty)]) = SCREENS.get(self.screen) else {
            return;
        };
        frame
            .presenter
            .draw_gfx(px, py, pic, rgba(255, 255, 255, self.pic_alpha as u8));
        frame
            .presenter
            .draw_gfx(tx, ty, text, rgba(255, 255, 255, self.text_alpha as u8));
    }

    fn tick(&mut self, ctx: &mut PhaseContext<'_>) -> GameAction {
        match self.stage {
            CreditStage::FadeIn => {
                if self.pic_alpha < 0xff {
                    self.pic_alpha = (self.pic_alpha + FADE_STEP).min(0xff);
                } else {
                    self.stage = CreditStage::TextIn;
                }
            }
            CreditStage::TextIn => {
                if self.text_alpha < 0xff {
                    self.text_alpha = (self.text_alpha + FADE_STEP).min(0xff);
                } else {
                    self.stage = CreditStage::Hold;
                }
            }
            CreditStage::Hold => {
                if ctx.state.page_elapsed() >= self.hold {
                    self.pic_alpha = (self.pic_alpha - FADE_STEP).max(0);
                    self.text_alpha = (self.text_alpha - FADE_STEP).max(0);
                    if self.pic_alpha == 0 {
                        self.stage = CreditStage::Next;
                        self.screen += 1;
                    }
                }
            }
            CreditStage::Next => {
                if self.screen >= SCREENS.len() {
                    return GameAction::PAGE_FINISHED;
                }
                self.pic_alpha = 0;
                self.text_alpha = 0;
                self.stage = CreditStage::FadeIn;
                ctx.state.start_page();
            }
        }
        GameAction::Nothing
    }
}
