//! Dice Cup - shake a cup of dice, drag it open, hope for a jackpot
//!
//! Core modules:
//! - `sim`: Deterministic game core (state machine, gestures, placement, outcomes)
//! - `settings`: Player preferences
//! - `audio`: Web Audio cue playback (wasm32 only)
//! - `web`: JavaScript bindings for the renderer/UI layer (wasm32 only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use settings::Settings;

use glam::{Vec2, Vec3};

/// Game configuration constants
pub mod consts {
    /// Largest frame delta fed into one step (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Dice limits
    pub const MIN_DICE: u8 = 1;
    pub const MAX_DICE: u8 = 8;
    pub const DEFAULT_DICE: u8 = 5;

    /// Die geometry (world units)
    pub const DIE_SIZE: f32 = 0.95;
    /// Minimum center-to-center distance between resting dice
    pub const MIN_DIE_SEPARATION: f32 = DIE_SIZE * 1.15;

    /// Cup mouth radius
    pub const CUP_RADIUS_OPEN: f32 = 3.4;
    /// Clearance kept between dice and the cup wall
    pub const CUP_WALL_MARGIN: f32 = 0.8;
    /// Radius of the floor disk dice may rest on
    pub const CUP_SAFE_RADIUS: f32 = CUP_RADIUS_OPEN - CUP_WALL_MARGIN;

    /// Placement attempt budgets
    pub const SINGLE_PLACEMENT_ATTEMPTS: u32 = 500;
    pub const ROUND_PLACEMENT_ATTEMPTS: u32 = 2000;

    /// Gesture thresholds
    pub const TAP_THRESHOLD_PX: f32 = 10.0;
    pub const TAP_MAX_MS: f64 = 500.0;
    pub const DRAG_FULL_DISTANCE_PX: f32 = 250.0;

    /// Release thresholds (asymmetric: past a third of the way, finish the gesture)
    pub const OPEN_RELEASE_THRESHOLD: f32 = 0.3;
    pub const CLOSE_RELEASE_THRESHOLD: f32 = 0.7;

    /// Shake timing (milliseconds of wall-clock time)
    pub const SHAKE_DURATION_MS: f32 = 800.0;
    pub const SHAKE_FADE_MS: f32 = 250.0;
    pub const SHAKE_CUE_INTERVAL_MS: f32 = 100.0;
    pub const SHAKE_CUE_MIN_DAMPING: f32 = 0.2;
    pub const SHAKE_CUE_CHANCE: f64 = 0.7;

    /// Snap animation step per tick
    pub const SNAP_OPEN_STEP: f32 = 0.06;
    pub const SNAP_CLOSE_STEP: f32 = 0.035;
    /// Close cue only fires when the snap started above this progress
    pub const CLOSE_CUE_MIN_PROGRESS: f32 = 0.1;
    /// Settings entry treats the cup as already open above this progress
    pub const SETTINGS_OPEN_PROGRESS: f32 = 0.99;

    /// Spawn/despawn scale change per tick
    pub const SPAWN_SCALE_STEP: f32 = 0.1;

    /// Hidden activation gesture
    pub const CHEAT_TAPS: u32 = 10;
    pub const CHEAT_WINDOW_MS: f64 = 1500.0;
}

/// Convert polar (r, theta) on the table to a world position at height `y`
#[inline]
pub fn polar_to_floor(r: f32, theta: f32, y: f32) -> Vec3 {
    Vec3::new(r * theta.cos(), y, r * theta.sin())
}

/// Horizontal (XZ) distance between two world positions
#[inline]
pub fn floor_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

/// Quadratic ease-out
#[inline]
pub fn ease_out_quad(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(2)
}

/// Cubic ease-out
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

/// Quadratic ease-in-out
#[inline]
pub fn ease_in_out_quad(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}
