//! Pointer/touch interpretation
//!
//! Mouse and touch input are normalized at the host boundary into
//! [`InputEvent`]s. A session runs from press to release and starts out as a
//! tap candidate; once the pointer travels more than the tap threshold
//! vertically it becomes a drag for the rest of the session.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Kind of pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    Press,
    Move,
    Release,
}

/// A normalized pointer/touch event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    /// Screen position in device-independent pixels (y grows downward)
    pub position: Vec2,
    /// Host timestamp in milliseconds
    pub timestamp_ms: f64,
    pub kind: InputKind,
    /// More than one simultaneous contact
    pub multi_touch: bool,
}

impl InputEvent {
    pub fn press(x: f32, y: f32, timestamp_ms: f64) -> Self {
        Self::new(InputKind::Press, x, y, timestamp_ms)
    }

    pub fn moved(x: f32, y: f32, timestamp_ms: f64) -> Self {
        Self::new(InputKind::Move, x, y, timestamp_ms)
    }

    pub fn release(x: f32, y: f32, timestamp_ms: f64) -> Self {
        Self::new(InputKind::Release, x, y, timestamp_ms)
    }

    fn new(kind: InputKind, x: f32, y: f32, timestamp_ms: f64) -> Self {
        Self {
            position: Vec2::new(x, y),
            timestamp_ms,
            kind,
            multi_touch: false,
        }
    }

    pub fn with_multi_touch(mut self, multi_touch: bool) -> Self {
        self.multi_touch = multi_touch;
        self
    }
}

/// Answers whether a screen point lands on the cup.
///
/// Implemented by the renderer (a raycast against the cup mesh); any
/// `Fn(Vec2) -> bool` works, which keeps tests renderer-free.
pub trait CupHitTest {
    fn hits_cup(&self, point: Vec2) -> bool;
}

impl<F: Fn(Vec2) -> bool> CupHitTest for F {
    fn hits_cup(&self, point: Vec2) -> bool {
        self(point)
    }
}

/// How a finished session was classified
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Short press without travel
    Tap { position: Vec2 },
    /// Press held too long without travel; does nothing
    Hold,
    /// The pointer travelled past the tap threshold
    Drag,
}

/// Tracks the press/move/release session
#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    interacting: bool,
    dragging: bool,
    start: Vec2,
    start_ms: f64,
}

impl GestureTracker {
    pub fn is_interacting(&self) -> bool {
        self.interacting
    }

    /// Begin a session. Multi-touch presses are ignored outright.
    pub fn press(&mut self, event: &InputEvent) -> bool {
        if event.multi_touch {
            return false;
        }
        self.interacting = true;
        self.dragging = false;
        self.start = event.position;
        self.start_ms = event.timestamp_ms;
        true
    }

    /// Feed a move event.
    ///
    /// Returns the unclamped progress offset `-Δy / full_distance` once the
    /// session is a drag, `None` while it is still a tap candidate.
    pub fn motion(&mut self, event: &InputEvent) -> Option<f32> {
        if !self.interacting {
            return None;
        }
        let dy = event.position.y - self.start.y;
        if !self.dragging && dy.abs() > TAP_THRESHOLD_PX {
            self.dragging = true;
        }
        self.dragging.then_some(-dy / DRAG_FULL_DISTANCE_PX)
    }

    /// End the session and classify it; `None` if no session was active
    pub fn release(&mut self, event: &InputEvent) -> Option<Gesture> {
        if !self.interacting {
            return None;
        }
        self.interacting = false;
        if self.dragging {
            self.dragging = false;
            return Some(Gesture::Drag);
        }
        if event.timestamp_ms - self.start_ms < TAP_MAX_MS {
            Some(Gesture::Tap {
                position: event.position,
            })
        } else {
            Some(Gesture::Hold)
        }
    }

    /// Drop any session in progress
    pub fn cancel(&mut self) {
        self.interacting = false;
        self.dragging = false;
    }
}

/// Map a drag offset onto Drag Progress for a session started at `base`
#[inline]
pub fn drag_progress(base: f32, offset: f32) -> f32 {
    (base + offset).clamp(0.0, 1.0)
}
