//! # Local Session
//!
//! Single-node [`NetSync`]: one player, no peers. Every tic built locally is
//! immediately synchronized.

use crate::ticcmd::{TicCmd, TicHistory};
use crate::traits::NetSync;

/// A one-player game with no network.
#[derive(Debug, Clone, Default)]
pub struct LocalSession {
    history: TicHistory,
    maketic: i32,
}

impl LocalSession {
    /// Creates a session with player 0 in game.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl NetSync for LocalSession {
    fn maketic(&self) -> i32 {
        self.maketic
    }

    fn submit_local(&mut self, cmd: TicCmd) {
        self.history.set(0, self.maketic, cmd);
        self.maketic += 1;
    }

    fn poll(&mut self) {}

    fn nettics(&self, player: usize) -> i32 {
        if player == 0 {
            self.maketic
        } else {
            0
        }
    }

    fn player_in_game(&self, player: usize) -> bool {
        player == 0
    }

    fn console_player(&self) -> usize {
        0
    }

    fn is_netgame(&self) -> bool {
        false
    }

    fn history(&self) -> &TicHistory {
        &self.history
    }
}
