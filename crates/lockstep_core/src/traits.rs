//! # Collaborator Traits
//!
//! The scheduler drives the network, the renderer, the simulation and the
//! input layer only through these traits.
//!
//! ```text
//! scheduler defines:   collaborator implements:
//! ┌──────────────┐     ┌──────────────┐
//! │ trait NetSync│ ←── │ impl NetSync │
//! └──────────────┘     └──────────────┘
//! ```

use lockstep_bsp::{BspError, BspTree};
use lockstep_math::{Angle, Fixed};

use crate::event::Event;
use crate::state::{LoopState, SessionFlags};
use crate::ticcmd::{TicCmd, TicHistory, MAXPLAYERS};

// ============================================================================
// NETWORK
// ============================================================================

/// Network synchronization layer.
///
/// Tic numbers here are logical tics (`gametic / ticdup`).
pub trait NetSync {
    /// Next local tic to build.
    fn maketic(&self) -> i32;

    /// Stores the local command for [`NetSync::maketic`], sends it to
    /// peers, and advances `maketic`.
    fn submit_local(&mut self, cmd: TicCmd);

    /// Receives whatever peers have sent.
    fn poll(&mut self);

    /// Tics received so far from `player`.
    fn nettics(&self, player: usize) -> i32;

    /// Returns true if `player` is in the game.
    fn player_in_game(&self, player: usize) -> bool;

    /// Index of the local player.
    fn console_player(&self) -> usize;

    /// Returns true if peers are connected.
    fn is_netgame(&self) -> bool;

    /// Command history for every player.
    fn history(&self) -> &TicHistory;

    /// Highest tic (exclusive) every in-game player has supplied.
    ///
    /// With nobody in game this is `maketic`.
    fn low_tic(&self) -> i32 {
        (0..MAXPLAYERS)
            .filter(|&p| self.player_in_game(p))
            .map(|p| self.nettics(p))
            .min()
            .unwrap_or_else(|| self.maketic())
    }

    /// Returns true if anyone is in the game.
    fn players_in_game(&self) -> bool {
        (0..MAXPLAYERS).any(|p| self.player_in_game(p))
    }

    /// The player whose pace everyone else follows: the first in game.
    fn key_player(&self) -> Option<usize> {
        (0..MAXPLAYERS).find(|&p| self.player_in_game(p))
    }
}

// ============================================================================
// PRESENTATION
// ============================================================================

/// Packs an RGBA color.
#[inline]
#[must_use]
pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (r as u32) | ((g as u32) << 8) | ((b as u32) << 16) | ((a as u32) << 24)
}

/// Opaque white.
pub const WHITE: u32 = rgba(255, 255, 255, 255);

/// Opaque black.
pub const BLACK: u32 = rgba(0, 0, 0, 255);

/// Camera position and orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewPoint {
    /// Map x.
    pub x: Fixed,
    /// Map y.
    pub y: Fixed,
    /// Eye height.
    pub z: Fixed,
    /// Facing.
    pub angle: Angle,
    /// Look up/down.
    pub pitch: Angle,
}

/// Renderer, sound mixer and display surface.
pub trait Presenter {
    /// Begins a frame. Returning false skips it (interpolation only).
    fn start_display(&mut self) -> bool {
        true
    }

    /// Fills the frame with `color`.
    fn clear(&mut self, color: u32);

    /// Draws a named picture.
    fn draw_gfx(&mut self, x: i32, y: i32, name: &str, color: u32);

    /// Draws a line of text. `x == -1` centers it.
    fn draw_text(&mut self, x: i32, y: i32, color: u32, text: &str);

    /// Renders the 3D view. `visible` lists leaves nearest first.
    fn render_view(&mut self, view: &ViewPoint, leaf: u16, visible: &[u16]);

    /// Menu, console, developer overlay and pause text.
    fn draw_interface(&mut self, flags: &SessionFlags);

    /// Presents the finished frame.
    fn finish_update(&mut self);

    /// Ends an interpolated frame.
    fn end_display(&mut self) {}

    /// Updates positional sound.
    fn update_sounds(&mut self) {}
}

// ============================================================================
// SIMULATION
// ============================================================================

/// Text and art shown between maps of one cluster.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cluster {
    /// Intermission text, lines separated by `\n`.
    pub text: String,
    /// Background picture.
    pub pic: String,
    /// Background picture position.
    pub pic_x: i32,
    /// Background picture position.
    pub pic_y: i32,
    /// Scroll the text away and fade the background at the end.
    pub scroll_text_end: bool,
    /// Shown only on entering the cluster; no finale follows.
    pub enter_only: bool,
}

/// The game world.
pub trait Simulation {
    /// Advances the world by one tic using each player's command.
    fn advance_one_tic(&mut self, state: &mut LoopState, cmds: &[TicCmd; MAXPLAYERS]);

    /// Where the local player's camera is.
    fn view_point(&self) -> ViewPoint;

    /// Partition of the loaded map, if one is loaded.
    fn level(&self) -> Option<&BspTree>;

    /// Loads `map`, replacing the current level.
    ///
    /// # Errors
    ///
    /// Returns a [`BspError`] if the map's partition is corrupt.
    fn load_level(&mut self, map: u32) -> Result<(), BspError>;

    /// Intermission data for `map`, if it has any.
    fn cluster(&self, map: u32) -> Option<Cluster>;
}

// ============================================================================
// INPUT
// ============================================================================

/// Gameplay input: the last link of the responder chain and the builder of
/// local tic commands.
pub trait GameInput {
    /// Handles an event no earlier responder claimed.
    fn respond(&mut self, event: &Event, state: &mut LoopState) -> bool;

    /// Builds the local command for the next tic from current input state.
    fn build_ticcmd(&mut self, state: &LoopState) -> TicCmd;
}
