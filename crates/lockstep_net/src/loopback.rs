//! # Loopback Mesh
//!
//! Every node owns one inbox; every other node holds a sender to it.
//!
//! ```text
//! node 0 ──TicPacket──► inbox 1
//!    ▲                     │
//!    └──── inbox 0 ◄───────┘ node 1
//! ```
//!
//! Channels deliver in order, so a gap in a peer's tic numbers means a
//! packet was lost to a full inbox. The receiver logs it and keeps waiting
//! for the missing tic; the scheduler's bounded wait keeps drawing
//! meanwhile.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use lockstep_core::{NetSync, TicCmd, TicHistory, BACKUPTICS, MAXPLAYERS};

/// Packets an inbox can hold before sends start failing.
pub const INBOX_CAPACITY: usize = BACKUPTICS * MAXPLAYERS;

/// One player's command for one logical tic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicPacket {
    /// Sending player.
    pub player: u8,
    /// Logical tic the command belongs to.
    pub tic: i32,
    /// The command.
    pub cmd: TicCmd,
}

/// Sender to one peer's inbox.
#[derive(Debug)]
struct Peer {
    player: usize,
    outbox: Sender<TicPacket>,
}

/// Mesh counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshStats {
    /// Packets sent to peers.
    pub sent: u64,
    /// Packets accepted from peers.
    pub received: u64,
    /// Packets lost to a full inbox.
    pub dropped: u64,
    /// Packets ignored as duplicates or out of order.
    pub rejected: u64,
}

/// One node of an in-process lockstep session.
#[derive(Debug)]
pub struct LoopbackNet {
    console: usize,
    in_game: [bool; MAXPLAYERS],
    nettics: [i32; MAXPLAYERS],
    history: TicHistory,
    peers: Vec<Peer>,
    inbox: Receiver<TicPacket>,
    stats: MeshStats,
}

impl LoopbackNet {
    /// Connects `players` nodes to each other. Node `i` is player `i`.
    ///
    /// The count is clamped to `1..=MAXPLAYERS`.
    #[must_use]
    pub fn mesh(players: usize) -> Vec<Self> {
        let players = players.clamp(1, MAXPLAYERS);
        let (senders, inboxes): (Vec<_>, Vec<_>) =
            (0..players).map(|_| bounded::<TicPacket>(INBOX_CAPACITY)).unzip();

        let mut in_game = [false; MAXPLAYERS];
        in_game[..players].fill(true);

        let nodes: Vec<Self> = inboxes
            .into_iter()
            .enumerate()
            .map(|(console, inbox)| Self {
                console,
                in_game,
                nettics: [0; MAXPLAYERS],
                history: TicHistory::new(),
                peers: senders
                    .iter()
                    .enumerate()
                    .filter(|&(player, _)| player != console)
                    .map(|(player, outbox)| Peer {
                        player,
                        outbox: outbox.clone(),
                    })
                    .collect(),
                inbox,
                stats: MeshStats::default(),
            })
            .collect();

        tracing::info!(players, "loopback mesh connected");
        nodes
    }

    /// Mesh counters for this node.
    #[must_use]
    pub const fn stats(&self) -> &MeshStats {
        &self.stats
    }

    fn accept(&mut self, packet: TicPacket) {
        let player = usize::from(packet.player);
        if player >= MAXPLAYERS || player == self.console || !self.in_game[player] {
            self.stats.rejected += 1;
            return;
        }

        let expected = self.nettics[player];
        if packet.tic != expected {
            self.stats.rejected += 1;
            if packet.tic > expected {
                tracing::warn!(player, tic = packet.tic, expected, "tic gap from peer");
            }
            return;
        }

        self.history.set(player, packet.tic, packet.cmd);
        self.nettics[player] = expected + 1;
        self.stats.received += 1;
    }

    fn drop_player(&mut self, player: usize) {
        if self.in_game[player] {
            self.in_game[player] = false;
            tracing::info!(player, console = self.console, "peer left the game");
        }
    }
}

impl NetSync for LoopbackNet {
    fn maketic(&self) -> i32 {
        self.nettics[self.console]
    }

    fn submit_local(&mut self, cmd: TicCmd) {
        let tic = self.nettics[self.console];
        self.history.set(self.console, tic, cmd);
        self.nettics[self.console] = tic + 1;

        let packet = TicPacket {
            player: self.console as u8,
            tic,
            cmd,
        };

        let mut gone = Vec::new();
        for peer in &self.peers {
            match peer.outbox.try_send(packet) {
                Ok(()) => self.stats.sent += 1,
                Err(TrySendError::Full(_)) => {
                    self.stats.dropped += 1;
                    tracing::warn!(peer = peer.player, tic, "peer inbox full, tic dropped");
                }
                Err(TrySendError::Disconnected(_)) => gone.push(peer.player),
            }
        }

        for player in gone {
            self.peers.retain(|peer| peer.player != player);
            self.drop_player(player);
        }
    }

    fn poll(&mut self) {
        while let Ok(packet) = self.inbox.try_recv() {
            self.accept(packet);
        }
    }

    fn nettics(&self, player: usize) -> i32 {
        self.nettics.get(player).copied().unwrap_or(0)
    }

    fn player_in_game(&self, player: usize) -> bool {
        self.in_game.get(player).copied().unwrap_or(false)
    }

    fn console_player(&self) -> usize {
        self.console
    }

    fn is_netgame(&self) -> bool {
        self.in_game.iter().filter(|&&p| p).count() > 1
    }

    fn history(&self) -> &TicHistory {
        &self.history
    }
}
