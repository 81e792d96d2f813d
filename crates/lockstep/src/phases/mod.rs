//! # Phases
//!
//! Every screen the game can be on is one [`LoopPhase`]. The controller
//! holds them as a [`Phase`] and reports them as a [`PhaseKind`].

use std::fmt;

use lockstep_core::{Frame, GameAction, LoopPhase, LoopResult, PhaseContext};

pub mod credits;
pub mod demo;
pub mod game;
pub mod intermission;
pub mod legal;
pub mod title;

pub use credits::{CreditStage, CreditsPhase};
pub use demo::DemoPhase;
pub use game::{draw_level, GamePhase};
pub use intermission::{layout_text, IntermissionPhase};
pub use legal::LegalPhase;
pub use title::TitlePhase;

/// Which screen a phase shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Title page with the main menu.
    Title,
    /// Legal notice.
    Legal,
    /// Credit screens.
    Credits,
    /// Attract-mode demo.
    Demo,
    /// Title map demo.
    TitleMap,
    /// A map being played.
    Game,
    /// Text between maps.
    Intermission,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Title => "title",
            Self::Legal => "legal",
            Self::Credits => "credits",
            Self::Demo => "demo",
            Self::TitleMap => "title map",
            Self::Game => "game",
            Self::Intermission => "intermission",
        };
        f.write_str(name)
    }
}

/// Any phase.
#[derive(Debug, Clone)]
pub enum Phase {
    /// Title page.
    Title(TitlePhase),
    /// Legal notice.
    Legal(LegalPhase),
    /// Credit screens.
    Credits(CreditsPhase),
    /// Demo or title map.
    Demo(DemoPhase),
    /// Gameplay.
    Game(GamePhase),
    /// Intermission.
    Intermission(IntermissionPhase),
}

impl Phase {
    /// Which screen this is.
    #[must_use]
    pub const fn kind(&self) -> PhaseKind {
        match self {
            Self::Title(_) => PhaseKind::Title,
            Self::Legal(_) => PhaseKind::Legal,
            Self::Credits(_) => PhaseKind::Credits,
            Self::Demo(demo) if demo.is_title_map() => PhaseKind::TitleMap,
            Self::Demo(_) => PhaseKind::Demo,
            Self::Game(_) => PhaseKind::Game,
            Self::Intermission(_) => PhaseKind::Intermission,
        }
    }

    fn inner(&self) -> &dyn LoopPhase {
        match self {
            Self::Title(phase) => phase,
            Self::Legal(phase) => phase,
            Self::Credits(phase) => phase,
            Self::Demo(phase) => phase,
            Self::Game(phase) => phase,
            Self::Intermission(phase) => phase,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn LoopPhase {
        match self {
            Self::Title(phase) => phase,
            Self::Legal(phase) => phase,
            Self::Credits(phase) => phase,
            Self::Demo(phase) => phase,
            Self::Game(phase) => phase,
            Self::Intermission(phase) => phase,
        }
    }
}

impl LoopPhase for Phase {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn start(&mut self, ctx: &mut PhaseContext<'_>) -> LoopResult<()> {
        self.inner_mut().start(ctx)
    }

    fn stop(&mut self, ctx: &mut PhaseContext<'_>) {
        self.inner_mut().stop(ctx);
    }

    fn draw(&self, frame: &mut Frame<'_>) {
        self.inner().draw(frame);
    }

    fn tick(&mut self, ctx: &mut PhaseContext<'_>) -> GameAction {
        self.inner_mut().tick(ctx)
    }
}
