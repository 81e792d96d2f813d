//! # Event Queue
//!
//! Bounded ring buffer between input backends and the per-tic responder
//! chain.
//!
//! ## Overflow
//!
//! The queue holds [`MAXEVENTS`] events. Posting into a full queue
//! overwrites the oldest unconsumed event, so input that arrives faster than
//! the loop drains it loses the stalest events first. Every overwrite is
//! logged and counted.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::state::LoopState;
use crate::traits::GameInput;

/// Queue capacity. Must be a power of two.
pub const MAXEVENTS: usize = 64;

const MASK: usize = MAXEVENTS - 1;

/// Kind of input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventKind {
    /// Key or button pressed.
    #[default]
    ButtonDown,
    /// Key or button released.
    ButtonUp,
    /// Key or button still held (auto-repeat).
    ButtonHeld,
}

/// One input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Event {
    /// What happened.
    pub kind: EventKind,
    /// Key or button code.
    pub data: i32,
}

impl Event {
    /// A press of `code`.
    #[must_use]
    pub const fn down(code: i32) -> Self {
        Self {
            kind: EventKind::ButtonDown,
            data: code,
        }
    }

    /// A release of `code`.
    #[must_use]
    pub const fn up(code: i32) -> Self {
        Self {
            kind: EventKind::ButtonUp,
            data: code,
        }
    }

    /// An auto-repeat of `code`.
    #[must_use]
    pub const fn held(code: i32) -> Self {
        Self {
            kind: EventKind::ButtonHeld,
            data: code,
        }
    }
}

/// Fixed-capacity FIFO of events.
#[derive(Debug, Clone)]
pub struct EventQueue {
    events: [Event; MAXEVENTS],
    head: usize,
    tail: usize,
    len: usize,
    overflows: u64,
}

impl EventQueue {
    /// Creates an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            events: [Event::down(0); MAXEVENTS],
            head: 0,
            tail: 0,
            len: 0,
            overflows: 0,
        }
    }

    /// Appends an event, dropping the oldest one if the queue is full.
    pub fn post(&mut self, event: Event) {
        if self.len == MAXEVENTS {
            let dropped = self.events[self.tail];
            self.tail = (self.tail + 1) & MASK;
            self.len -= 1;
            self.overflows += 1;
            tracing::warn!(
                ?dropped,
                overflows = self.overflows,
                "event queue full, dropping oldest event"
            );
        }
        self.events[self.head] = event;
        self.head = (self.head + 1) & MASK;
        self.len += 1;
    }

    /// Removes and returns the oldest event.
    pub fn pop(&mut self) -> Option<Event> {
        if self.len == 0 {
            return None;
        }
        let event = self.events[self.tail];
        self.tail = (self.tail + 1) & MASK;
        self.len -= 1;
        Some(event)
    }

    /// Consumes the events queued at call time, oldest first.
    ///
    /// Each event is removed as the iterator yields it. Dropping the
    /// iterator early leaves the rest queued.
    pub fn drain(&mut self) -> Drain<'_> {
        let remaining = self.len;
        Drain {
            queue: self,
            remaining,
        }
    }

    /// Number of queued events.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if nothing is queued.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of events lost to overflow since creation.
    #[inline]
    #[must_use]
    pub const fn overflow_count(&self) -> u64 {
        self.overflows
    }

    /// Raw ring slot, for inspecting overwrite behavior.
    #[inline]
    #[must_use]
    pub const fn slot(&self, index: usize) -> Event {
        self.events[index & MASK]
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator returned by [`EventQueue::drain`].
#[derive(Debug)]
pub struct Drain<'a> {
    queue: &'a mut EventQueue,
    remaining: usize,
}

impl Iterator for Drain<'_> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.queue.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

/// Event queue handle shared between input backends and the scheduler.
#[derive(Debug, Clone, Default)]
pub struct SharedEventQueue {
    inner: Arc<Mutex<EventQueue>>,
}

impl SharedEventQueue {
    /// Creates an empty shared queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Posts an event. Safe to call from any thread.
    pub fn post(&self, event: Event) {
        self.inner.lock().post(event);
    }

    /// Number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Number of events lost to overflow.
    #[must_use]
    pub fn overflow_count(&self) -> u64 {
        self.inner.lock().overflow_count()
    }

    /// Consumes the events queued at call time, oldest first.
    ///
    /// The lock is taken per event, not held across the iteration, so a
    /// responder may post new events while the drain runs. Those wait for
    /// the next drain.
    #[must_use]
    pub fn drain(&self) -> SharedDrain<'_> {
        let remaining = self.len();
        SharedDrain {
            queue: self,
            remaining,
        }
    }

    /// Runs `f` with the queue locked.
    pub fn with<R>(&self, f: impl FnOnce(&mut EventQueue) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

/// Iterator returned by [`SharedEventQueue::drain`].
#[derive(Debug)]
pub struct SharedDrain<'a> {
    queue: &'a SharedEventQueue,
    remaining: usize,
}

impl Iterator for SharedDrain<'_> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.queue.inner.lock().pop()
    }
}

// ============================================================================
// RESPONDER CHAIN
// ============================================================================

/// One link of the responder chain.
pub trait Responder {
    /// Handles `event`. Returns true if the event was consumed.
    fn respond(&mut self, event: &Event, state: &mut LoopState) -> bool;
}

/// Fixed-priority event routing: console, developer keys, menu, gameplay.
///
/// Developer keys only see events when `devparm` is set in a local game
/// the player started. Gameplay is the [`GameInput`] that also builds tic
/// commands.
#[derive(Default)]
pub struct ResponderChain {
    console: Option<Box<dyn Responder>>,
    dev_keys: Option<Box<dyn Responder>>,
    menu: Option<Box<dyn Responder>>,
}

impl ResponderChain {
    /// Creates a chain with no responders ahead of gameplay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the console responder.
    #[must_use]
    pub fn with_console(mut self, responder: Box<dyn Responder>) -> Self {
        self.console = Some(responder);
        self
    }

    /// Installs the developer key responder.
    #[must_use]
    pub fn with_dev_keys(mut self, responder: Box<dyn Responder>) -> Self {
        self.dev_keys = Some(responder);
        self
    }

    /// Installs the menu responder.
    #[must_use]
    pub fn with_menu(mut self, responder: Box<dyn Responder>) -> Self {
        self.menu = Some(responder);
        self
    }

    /// Routes one event. Returns true if any responder consumed it.
    pub fn dispatch(
        &mut self,
        event: &Event,
        state: &mut LoopState,
        game: &mut dyn GameInput,
    ) -> bool {
        if let Some(console) = self.console.as_mut() {
            if console.respond(event, state) {
                return true;
            }
        }

        let flags = &state.flags;
        if flags.devparm && !flags.netgame && flags.usergame {
            if let Some(dev) = self.dev_keys.as_mut() {
                if dev.respond(event, state) {
                    return true;
                }
            }
        }

        if let Some(menu) = self.menu.as_mut() {
            if menu.respond(event, state) {
                return true;
            }
        }

        game.respond(event, state)
    }
}
