//! # Game Actions
//!
//! The outcome signal that ends a mini-loop run. Simulation and menu code
//! set it through [`crate::LoopState::action`]; phase tick callbacks return
//! it directly.

use std::fmt;

/// Requested transition out of the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameAction {
    /// Keep running.
    #[default]
    Nothing,
    /// Load (or reload) the current map. Page phases also use this to
    /// report that their timer ran out.
    LoadLevel,
    /// Start a new game.
    NewGame,
    /// Load a saved game.
    LoadGame,
    /// Demo playback finished.
    ExitDemo,
    /// Map completed; intermission follows.
    Completed,
    /// Final map completed.
    Victory,
    /// Run the finale.
    Finale,
    /// Capture a screenshot.
    Screenshot,
    /// Jump to another map.
    WarpLevel,
    /// Jump to another map keeping player state.
    WarpQuick,
    /// Return to the title sequence.
    Title,
}

impl GameAction {
    /// Page-style phases report "timer expired" with this action.
    pub const PAGE_FINISHED: Self = Self::LoadLevel;

    /// Returns true for [`GameAction::Nothing`].
    #[inline]
    #[must_use]
    pub const fn is_nothing(self) -> bool {
        matches!(self, Self::Nothing)
    }

    /// Returns true if this action starts gameplay from the title.
    #[inline]
    #[must_use]
    pub const fn starts_game(self) -> bool {
        matches!(self, Self::NewGame | Self::LoadGame)
    }

    /// Returns true if gameplay should reload a map and keep going.
    #[inline]
    #[must_use]
    pub const fn reloads_level(self) -> bool {
        matches!(self, Self::LoadLevel | Self::WarpLevel | Self::WarpQuick)
    }
}

impl fmt::Display for GameAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
