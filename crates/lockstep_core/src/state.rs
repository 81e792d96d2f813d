//! # Loop State
//!
//! Everything the phases, responders and simulation share with the
//! scheduler. One instance, owned by the [`crate::Scheduler`] and lent out
//! per callback.

use crate::action::GameAction;
use crate::demo::DemoPlayback;

/// What kind of screen the simulation is currently driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    /// No phase is running.
    #[default]
    None,
    /// A map is being played.
    Level,
    /// Between maps.
    Intermission,
    /// End-of-episode text.
    Finale,
    /// A page any key can skip.
    Skippable,
}

/// Session-wide switches read by the responders and the interface layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct SessionFlags {
    /// A menu is open.
    pub menu_active: bool,
    /// The main (title) menu is open.
    pub main_menu_active: bool,
    /// The menu may be opened.
    pub allow_menu: bool,
    /// The player started this game (save/end game allowed).
    pub usergame: bool,
    /// The simulation is paused.
    pub paused: bool,
    /// A demo is playing.
    pub demoplayback: bool,
    /// Developer mode.
    pub devparm: bool,
    /// More than one node is connected.
    pub netgame: bool,
}

/// Shared mutable state of the running loop.
#[derive(Debug, Default)]
pub struct LoopState {
    /// Simulation tics run since startup, counting every duplicate.
    pub gametic: i32,
    /// Pending transition requested by simulation or menu code.
    ///
    /// Reset to [`GameAction::Nothing`] when a mini-loop run begins.
    pub action: GameAction,
    /// Screen the simulation is driving.
    pub game_state: GameState,
    /// Session switches.
    pub flags: SessionFlags,
    /// `gametic` when the current page was shown.
    pub page_tic: i32,
    /// Map being played.
    pub map: u32,
    /// Map to load after the intermission.
    pub next_map: u32,
    /// Demo feeding the simulation instead of the tic history.
    pub demo: Option<DemoPlayback>,
}

impl LoopState {
    /// Creates state for a fresh session.
    #[must_use]
    pub fn new(flags: SessionFlags) -> Self {
        Self {
            flags,
            map: 1,
            next_map: 2,
            ..Self::default()
        }
    }

    /// Tics since the current page was shown.
    #[inline]
    #[must_use]
    pub const fn page_elapsed(&self) -> i32 {
        self.gametic - self.page_tic
    }

    /// Marks the start of a new page.
    #[inline]
    pub fn start_page(&mut self) {
        self.page_tic = self.gametic;
    }
}
