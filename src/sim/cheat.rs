//! Hidden activation gesture on the status label
//!
//! Ten taps, each within 1.5 s of the previous one, arm the cheat. The
//! counter resets when the window lapses.

use serde::{Deserialize, Serialize};

use crate::consts::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheatGesture {
    count: u32,
    deadline_ms: Option<f64>,
}

impl CheatGesture {
    /// Register a tap at `now_ms`. Returns true on the tap that arms the cheat.
    pub fn tap(&mut self, now_ms: f64) -> bool {
        self.expire(now_ms);
        self.count += 1;
        self.deadline_ms = Some(now_ms + CHEAT_WINDOW_MS);
        self.count == CHEAT_TAPS
    }

    /// Reset the counter if the window has lapsed
    pub fn expire(&mut self, now_ms: f64) {
        if self.deadline_ms.is_some_and(|deadline| now_ms >= deadline) {
            self.count = 0;
            self.deadline_ms = None;
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}
