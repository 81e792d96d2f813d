//! # Demo Feeding
//!
//! A demo is a recorded list of per-tic commands. While one is attached to
//! [`crate::LoopState::demo`], the simulation reads commands from it instead
//! of the tic history. Decoding demo files belongs to the loader; this
//! module only plays back what it is given.

use std::collections::HashMap;

use crate::ticcmd::{TicCmd, MAXPLAYERS};

/// Recorded commands for one demo.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DemoScript {
    /// Lump name the demo was loaded from.
    pub name: String,
    /// Map the demo was recorded on.
    pub map: u32,
    /// Which players were recorded.
    pub players: [bool; MAXPLAYERS],
    /// One entry per logical tic.
    pub tics: Vec<[TicCmd; MAXPLAYERS]>,
}

impl DemoScript {
    /// A single-player demo recorded on map 1.
    #[must_use]
    pub fn single(name: impl Into<String>, cmds: impl IntoIterator<Item = TicCmd>) -> Self {
        let mut players = [false; MAXPLAYERS];
        players[0] = true;
        Self {
            name: name.into(),
            map: 1,
            players,
            tics: cmds
                .into_iter()
                .map(|cmd| {
                    let mut tic = [TicCmd::default(); MAXPLAYERS];
                    tic[0] = cmd;
                    tic
                })
                .collect(),
        }
    }

    /// Number of recorded tics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tics.len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tics.is_empty()
    }
}

/// Playback cursor over a [`DemoScript`].
#[derive(Debug, Clone)]
pub struct DemoPlayback {
    script: DemoScript,
    cursor: usize,
    finished: bool,
}

impl DemoPlayback {
    /// Starts playback at the first tic.
    #[must_use]
    pub fn new(script: DemoScript) -> Self {
        Self {
            script,
            cursor: 0,
            finished: false,
        }
    }

    /// Commands for the next logical tic, or `None` once the demo ends.
    pub fn next_tic(&mut self) -> Option<[TicCmd; MAXPLAYERS]> {
        let Some(tic) = self.script.tics.get(self.cursor).copied() else {
            self.finished = true;
            return None;
        };
        self.cursor += 1;
        Some(tic)
    }

    /// Commands of the tic most recently returned by [`Self::next_tic`].
    ///
    /// `None` before the first tic and after the demo ran out.
    #[must_use]
    pub fn current(&self) -> Option<[TicCmd; MAXPLAYERS]> {
        if self.finished {
            return None;
        }
        self.cursor
            .checked_sub(1)
            .and_then(|index| self.script.tics.get(index).copied())
    }

    /// Returns true once [`Self::next_tic`] has run past the end.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Tics played so far.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.cursor
    }

    /// Name of the demo being played.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.script.name
    }

    /// Which players the demo drives.
    #[must_use]
    pub const fn players(&self) -> [bool; MAXPLAYERS] {
        self.script.players
    }

    /// Map the demo plays on.
    #[must_use]
    pub const fn map(&self) -> u32 {
        self.script.map
    }
}

/// Source of recorded demos.
pub trait DemoLibrary {
    /// Loads the demo stored under `name`, if it exists.
    fn load(&self, name: &str) -> Option<DemoScript>;
}

impl DemoLibrary for HashMap<String, DemoScript> {
    fn load(&self, name: &str) -> Option<DemoScript> {
        self.get(name).cloned()
    }
}
