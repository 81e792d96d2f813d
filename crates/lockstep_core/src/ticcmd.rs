//! # Tic Commands
//!
//! One command per player per logical tic, kept in a circular history of
//! [`BACKUPTICS`] slots indexed by `tic % BACKUPTICS`.
//!
//! ## Slot Ownership
//!
//! ```text
//! maketic ──► local input writes slot
//! nettics ──► network receive writes peer slots
//! gametic ──► simulation reads slot
//! ```
//!
//! The scheduler never lets `maketic` run more than `BACKUPTICS / 2 - 1`
//! tics ahead of the simulation, so a slot is never rewritten while the
//! simulation still needs it.

/// Number of history slots per player.
pub const BACKUPTICS: usize = 128;

/// Maximum number of players in a session.
pub const MAXPLAYERS: usize = 4;

/// Fire weapon.
pub const BT_ATTACK: u8 = 0x01;
/// Use / open.
pub const BT_USE: u8 = 0x02;
/// Weapon change requested; the new weapon is in [`BT_WEAPONMASK`].
pub const BT_CHANGE: u8 = 0x04;
/// Weapon number bits.
pub const BT_WEAPONMASK: u8 = 0x08 | 0x10 | 0x20 | 0x40;
/// Shift for the weapon number.
pub const BT_WEAPONSHIFT: u8 = 3;
/// Reserved game action; the low bits hold a special code.
pub const BT_SPECIAL: u8 = 0x80;
/// Special code mask.
pub const BTS_SPECIALMASK: u8 = 0x03;
/// Special code: toggle pause.
pub const BTS_PAUSE: u8 = 0x01;

/// Player input for one tic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TicCmd {
    /// Forward movement, negative is backward.
    pub forward: i8,
    /// Strafe movement, negative is left.
    pub side: i8,
    /// Turn delta in the upper 16 bits of an angle.
    pub angle_turn: i16,
    /// Look delta.
    pub pitch: i16,
    /// `BT_*` flags.
    pub buttons: u8,
    /// Secondary buttons (jump, crouch, ...).
    pub buttons2: u8,
    /// Chat character typed this tic, 0 for none.
    pub chat_char: u8,
    /// Consistency check value.
    pub consistency: i16,
}

impl TicCmd {
    /// Returns true if the buttons carry a special code instead of flags.
    #[inline]
    #[must_use]
    pub const fn is_special(&self) -> bool {
        self.buttons & BT_SPECIAL != 0
    }

    /// The command as seen by every duplicate of a tic except the last.
    ///
    /// Chat and special actions fire once per logical tic, so the earlier
    /// replays see them cleared.
    #[must_use]
    pub const fn for_duplicate(self) -> Self {
        let mut cmd = self;
        cmd.chat_char = 0;
        if cmd.is_special() {
            cmd.buttons = 0;
        }
        cmd
    }
}

/// History slot for a logical tic.
#[inline]
#[must_use]
pub const fn slot(tic: i32) -> usize {
    tic.rem_euclid(BACKUPTICS as i32) as usize
}

/// Circular per-player command history.
#[derive(Clone)]
pub struct TicHistory {
    cmds: Box<[[TicCmd; BACKUPTICS]; MAXPLAYERS]>,
}

impl TicHistory {
    /// Creates a history of empty commands.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cmds: Box::new([[TicCmd::default(); BACKUPTICS]; MAXPLAYERS]),
        }
    }

    /// Command for `player` at logical tic `tic`.
    ///
    /// Players outside `0..MAXPLAYERS` read an empty command.
    #[inline]
    #[must_use]
    pub fn get(&self, player: usize, tic: i32) -> TicCmd {
        self.cmds
            .get(player)
            .map_or_else(TicCmd::default, |row| row[slot(tic)])
    }

    /// Stores the command for `player` at logical tic `tic`.
    ///
    /// Writes for players outside `0..MAXPLAYERS` are ignored.
    #[inline]
    pub fn set(&mut self, player: usize, tic: i32, cmd: TicCmd) {
        if let Some(row) = self.cmds.get_mut(player) {
            row[slot(tic)] = cmd;
        }
    }
}

impl Default for TicHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TicHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicHistory")
            .field("players", &MAXPLAYERS)
            .field("slots", &BACKUPTICS)
            .finish()
    }
}
