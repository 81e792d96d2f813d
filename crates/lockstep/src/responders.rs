//! # Default Responders
//!
//! - [`MainMenu`]: the title menu link of the responder chain
//! - [`KeyboardInput`]: gameplay keys and the local tic command builder
//!
//! Key codes follow the classic layout: ASCII for printable keys, `0x80+`
//! for the rest.

use lockstep_core::ticcmd::{BTS_PAUSE, BT_ATTACK, BT_SPECIAL, BT_USE};
use lockstep_core::{
    Event, EventKind, GameAction, GameInput, GameState, LoopState, Responder, TicCmd,
};

/// Enter.
pub const KEY_ENTER: i32 = 13;
/// Escape.
pub const KEY_ESCAPE: i32 = 27;
/// Space bar.
pub const KEY_SPACE: i32 = 32;
/// Comma (strafe left).
pub const KEY_COMMA: i32 = b',' as i32;
/// Period (strafe right).
pub const KEY_PERIOD: i32 = b'.' as i32;
/// Right control.
pub const KEY_RCTRL: i32 = 0x80 + 0x1d;
/// Right shift.
pub const KEY_RSHIFT: i32 = 0x80 + 0x36;
/// Left arrow.
pub const KEY_LEFTARROW: i32 = 0xac;
/// Up arrow.
pub const KEY_UPARROW: i32 = 0xad;
/// Right arrow.
pub const KEY_RIGHTARROW: i32 = 0xae;
/// Down arrow.
pub const KEY_DOWNARROW: i32 = 0xaf;
/// Pause.
pub const KEY_PAUSE: i32 = 0xff;

/// Walk and run speeds.
const FORWARD_MOVE: [i8; 2] = [0x19, 0x32];
const SIDE_MOVE: [i8; 2] = [0x18, 0x28];
const ANGLE_TURN: [i16; 2] = [640, 1280];

// ============================================================================
// MAIN MENU
// ============================================================================

/// Title menu: Enter starts a new game, Escape closes or reopens the menu.
///
/// Claims every key press while the main menu is open.
#[derive(Debug, Clone, Copy, Default)]
pub struct MainMenu;

impl Responder for MainMenu {
    fn respond(&mut self, event: &Event, state: &mut LoopState) -> bool {
        if event.kind != EventKind::ButtonDown {
            return state.flags.main_menu_active;
        }

        let flags = &mut state.flags;
        if !flags.main_menu_active {
            if event.data == KEY_ESCAPE && flags.allow_menu && !flags.menu_active {
                flags.main_menu_active = true;
                flags.menu_active = true;
                return true;
            }
            return false;
        }

        match event.data {
            KEY_ENTER => {
                tracing::info!("new game selected");
                state.action = GameAction::NewGame;
            }
            KEY_ESCAPE => {
                flags.main_menu_active = false;
                flags.menu_active = false;
            }
            _ => {}
        }
        true
    }
}

// ============================================================================
// KEYBOARD INPUT
// ============================================================================

/// Tracks held keys and turns them into tic commands.
///
/// On skippable pages and during demos any key press returns to the title.
#[derive(Debug, Clone, Default)]
pub struct KeyboardInput {
    held: Vec<i32>,
    pause_pending: bool,
}

impl KeyboardInput {
    /// Creates an input with no keys held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `key` is held.
    #[must_use]
    pub fn is_held(&self, key: i32) -> bool {
        self.held.contains(&key)
    }

    fn axis(&self, positive: i32, negative: i32) -> i32 {
        i32::from(self.is_held(positive)) - i32::from(self.is_held(negative))
    }
}

impl GameInput for KeyboardInput {
    fn respond(&mut self, event: &Event, state: &mut LoopState) -> bool {
        let skippable = state.game_state == GameState::Skippable || state.flags.demoplayback;
        if skippable && event.kind == EventKind::ButtonDown {
            if state.action.is_nothing() {
                state.action = GameAction::Title;
            }
            return true;
        }

        match event.kind {
            EventKind::ButtonDown => {
                if event.data == KEY_PAUSE {
                    self.pause_pending = true;
                } else if !self.is_held(event.data) {
                    self.held.push(event.data);
                }
                true
            }
            EventKind::ButtonUp => {
                self.held.retain(|&key| key != event.data);
                true
            }
            EventKind::ButtonHeld => false,
        }
    }

    fn build_ticcmd(&mut self, _state: &LoopState) -> TicCmd {
        let mut cmd = TicCmd::default();

        if std::mem::take(&mut self.pause_pending) {
            cmd.buttons = BT_SPECIAL | BTS_PAUSE;
            return cmd;
        }

        let speed = usize::from(self.is_held(KEY_RSHIFT));
        cmd.forward = FORWARD_MOVE[speed] * self.axis(KEY_UPARROW, KEY_DOWNARROW) as i8;
        cmd.side = SIDE_MOVE[speed] * self.axis(KEY_PERIOD, KEY_COMMA) as i8;
        cmd.angle_turn = ANGLE_TURN[speed] * self.axis(KEY_LEFTARROW, KEY_RIGHTARROW) as i16;

        if self.is_held(KEY_RCTRL) {
            cmd.buttons |= BT_ATTACK;
        }
        if self.is_held(KEY_SPACE) {
            cmd.buttons |= BT_USE;
        }
        cmd
    }
}
