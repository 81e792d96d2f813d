//! # Test Doubles
//!
//! Headless stand-ins for the renderer, the game world and the input layer.
//! Used by the test suites and by the headless binary.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use lockstep_bsp::{BspError, BspTree};
use parking_lot::Mutex;

use crate::action::GameAction;
use crate::event::Event;
use crate::state::{LoopState, SessionFlags};
use crate::ticcmd::{TicCmd, MAXPLAYERS};
use crate::traits::{Cluster, GameInput, Presenter, Simulation, ViewPoint};

// ============================================================================
// PRESENTER
// ============================================================================

/// One recorded presenter call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCall {
    /// `clear(color)`.
    Clear(u32),
    /// `draw_gfx(x, y, name, color)`.
    Gfx {
        /// Left edge.
        x: i32,
        /// Top edge.
        y: i32,
        /// Picture name.
        name: String,
        /// Tint and alpha.
        color: u32,
    },
    /// `draw_text(x, y, color, text)`.
    Text {
        /// Left edge, `-1` for centered.
        x: i32,
        /// Top edge.
        y: i32,
        /// Tint and alpha.
        color: u32,
        /// The line.
        text: String,
    },
    /// `render_view(view, leaf, visible)`.
    View {
        /// Camera.
        view: ViewPoint,
        /// Leaf containing the camera.
        leaf: u16,
        /// Leaves nearest first.
        visible: Vec<u16>,
    },
}

/// Presenter that records what it was asked to draw.
///
/// Only the calls since the last `finish_update` are kept in
/// [`MockPresenter::current`]; the previous full frame is in
/// [`MockPresenter::last_frame`].
#[derive(Debug, Default)]
pub struct MockPresenter {
    current: Vec<DrawCall>,
    last_frame: Vec<DrawCall>,
    frames: u64,
    interface_draws: u64,
    sound_updates: u64,
    refuse_display: bool,
}

impl MockPresenter {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `start_display` return false.
    #[must_use]
    pub fn refusing_display(mut self) -> Self {
        self.refuse_display = true;
        self
    }

    /// Frames presented.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Interface overlay draws.
    #[must_use]
    pub const fn interface_draws(&self) -> u64 {
        self.interface_draws
    }

    /// Sound updates.
    #[must_use]
    pub const fn sound_updates(&self) -> u64 {
        self.sound_updates
    }

    /// Calls of the frame in progress.
    #[must_use]
    pub fn current(&self) -> &[DrawCall] {
        &self.current
    }

    /// Calls of the last presented frame.
    #[must_use]
    pub fn last_frame(&self) -> &[DrawCall] {
        &self.last_frame
    }

    /// Text lines of the last presented frame.
    #[must_use]
    pub fn last_texts(&self) -> Vec<(i32, u32, &str)> {
        self.last_frame
            .iter()
            .filter_map(|call| match call {
                DrawCall::Text { y, color, text, .. } => Some((*y, *color, text.as_str())),
                _ => None,
            })
            .collect()
    }
}

impl Presenter for MockPresenter {
    fn start_display(&mut self) -> bool {
        !self.refuse_display
    }

    fn clear(&mut self, color: u32) {
        self.current.push(DrawCall::Clear(color));
    }

    fn draw_gfx(&mut self, x: i32, y: i32, name: &str, color: u32) {
        self.current.push(DrawCall::Gfx {
            x,
            y,
            name: name.to_string(),
            color,
        });
    }

    fn draw_text(&mut self, x: i32, y: i32, color: u32, text: &str) {
        self.current.push(DrawCall::Text {
            x,
            y,
            color,
            text: text.to_string(),
        });
    }

    fn render_view(&mut self, view: &ViewPoint, leaf: u16, visible: &[u16]) {
        self.current.push(DrawCall::View {
            view: *view,
            leaf,
            visible: visible.to_vec(),
        });
    }

    fn draw_interface(&mut self, _flags: &SessionFlags) {
        self.interface_draws += 1;
    }

    fn finish_update(&mut self) {
        self.last_frame = std::mem::take(&mut self.current);
        self.frames += 1;
    }

    fn update_sounds(&mut self) {
        self.sound_updates += 1;
    }
}

// ============================================================================
// SIMULATION
// ============================================================================

/// Game world that records the commands it runs with.
#[derive(Debug, Default)]
pub struct MockSimulation {
    ran: Vec<[TicCmd; MAXPLAYERS]>,
    levels: HashMap<u32, Result<BspTree, BspError>>,
    loaded: Option<BspTree>,
    load_log: Vec<u32>,
    clusters: HashMap<u32, Cluster>,
    view: ViewPoint,
    scheduled: VecDeque<(i32, GameAction)>,
}

impl MockSimulation {
    /// Creates an empty world. Unknown maps load with no geometry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the partition loaded for `map`.
    #[must_use]
    pub fn with_level(mut self, map: u32, level: Result<BspTree, BspError>) -> Self {
        self.levels.insert(map, level);
        self
    }

    /// Registers intermission data for `map`.
    #[must_use]
    pub fn with_cluster(mut self, map: u32, cluster: Cluster) -> Self {
        self.clusters.insert(map, cluster);
        self
    }

    /// Places the camera.
    #[must_use]
    pub fn with_view(mut self, view: ViewPoint) -> Self {
        self.view = view;
        self
    }

    /// Requests `action` from inside the simulation step run at `gametic`.
    pub fn schedule(&mut self, gametic: i32, action: GameAction) {
        self.scheduled.push_back((gametic, action));
    }

    /// Every command set the world ran with, in order.
    #[must_use]
    pub fn ran(&self) -> &[[TicCmd; MAXPLAYERS]] {
        &self.ran
    }

    /// Maps loaded, in order.
    #[must_use]
    pub fn load_log(&self) -> &[u32] {
        &self.load_log
    }
}

impl Simulation for MockSimulation {
    fn advance_one_tic(&mut self, state: &mut LoopState, cmds: &[TicCmd; MAXPLAYERS]) {
        self.ran.push(*cmds);
        while let Some(&(tic, action)) = self.scheduled.front() {
            if tic > state.gametic {
                break;
            }
            self.scheduled.pop_front();
            if tic == state.gametic {
                state.action = action;
            }
        }
    }

    fn view_point(&self) -> ViewPoint {
        self.view
    }

    fn level(&self) -> Option<&BspTree> {
        self.loaded.as_ref()
    }

    fn load_level(&mut self, map: u32) -> Result<(), BspError> {
        self.load_log.push(map);
        self.loaded = match self.levels.get(&map) {
            Some(Ok(tree)) => Some(tree.clone()),
            Some(Err(err)) => return Err(err.clone()),
            None => None,
        };
        Ok(())
    }

    fn cluster(&self, map: u32) -> Option<Cluster> {
        self.clusters.get(&map).cloned()
    }
}

// ============================================================================
// INPUT
// ============================================================================

#[derive(Debug, Default)]
struct InputLog {
    pending: VecDeque<TicCmd>,
    events: Vec<Event>,
    built: u64,
}

/// Input layer fed from a script.
///
/// Clones share the same script and log, so a test can keep one handle
/// after boxing another into the scheduler.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    log: Arc<Mutex<InputLog>>,
}

impl ScriptedInput {
    /// Creates an input with nothing queued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues commands for upcoming tics. Once they run out, idle commands
    /// are built.
    pub fn queue(&self, cmds: impl IntoIterator<Item = TicCmd>) {
        self.log.lock().pending.extend(cmds);
    }

    /// Events that reached gameplay.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.log.lock().events.clone()
    }

    /// Local commands built so far.
    #[must_use]
    pub fn built(&self) -> u64 {
        self.log.lock().built
    }
}

impl GameInput for ScriptedInput {
    fn respond(&mut self, event: &Event, _state: &mut LoopState) -> bool {
        self.log.lock().events.push(*event);
        true
    }

    fn build_ticcmd(&mut self, _state: &LoopState) -> TicCmd {
        let mut log = self.log.lock();
        log.built += 1;
        log.pending.pop_front().unwrap_or_default()
    }
}
