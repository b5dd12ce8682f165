//! Game state and core simulation types
//!
//! The whole game lives in one [`GameState`] context object; handlers in
//! `tick` mutate it and queue [`GameEvent`]s for the host to act on.

use glam::{Quat, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::cheat::CheatGesture;
use super::gesture::GestureTracker;
use super::outcome::Face;
use super::pose::{CameraPose, CupPose};
use crate::consts::*;
use crate::settings::Settings;

/// Current phase of the cup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Cup resting closed (or being dragged/snapped from closed)
    Idle,
    /// Shake animation running
    Shaking,
    /// Cup lifted, dice visible
    Opened,
    /// Dice-count settings panel is up
    Settings,
}

/// Status line shown under the cup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusText {
    TapToShake,
    Shaking,
    SwipeUpToOpen,
    DragDownToClose,
}

impl StatusText {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusText::TapToShake => "Tap the cup to shake",
            StatusText::Shaking => "Shaking...",
            StatusText::SwipeUpToOpen => "Swipe up to open",
            StatusText::DragDownToClose => "Drag down to close",
        }
    }
}

/// Fire-and-forget audio cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    AddDie,
    RemoveDie,
    ShakeHit,
    CupClose,
    CupOpen,
}

/// Side effects for the host (renderer, audio, celebration) to act on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Cue(SoundCue),
    /// Trigger the jackpot celebration
    Jackpot,
    /// Create the visual for a die
    DieSpawned { id: u32 },
    /// Dispose of a die's visual
    DieDestroyed { id: u32 },
    PhaseChanged(GamePhase),
    RollResolved { values: Vec<Face> },
}

/// A die on the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Die {
    /// Handle shared with the renderer's visual
    pub id: u32,
    /// Face showing; `None` while tumbling in a shake
    pub value: Option<Face>,
    pub position: Vec3,
    pub rotation: Quat,
    /// Spawn/despawn tween (0 = invisible, 1 = full size)
    pub scale: f32,
}

/// The resolved outcome of the last shake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roll {
    /// One value per live die, in die order
    pub values: Vec<Face>,
    pub rigged: bool,
    /// Jackpot verdict; the celebration fires when the cup is first opened
    pub jackpot: bool,
}

/// Wall-clock driven shake
#[derive(Debug, Clone, Default)]
pub struct ShakeAnimation {
    pub elapsed_ms: f32,
    pub last_cue_ms: f32,
}

/// Which endpoint a snap animation heads for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CupTarget {
    Closed,
    Open,
}

impl CupTarget {
    pub fn progress(self) -> f32 {
        match self {
            CupTarget::Closed => 0.0,
            CupTarget::Open => 1.0,
        }
    }
}

/// Tick-stepped interpolation of Drag Progress to an endpoint
#[derive(Debug, Clone)]
pub struct SnapAnimation {
    pub target: CupTarget,
    pub start_progress: f32,
    /// 0..1 through the animation
    pub t: f32,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the RNG started from
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub status: StatusText,
    /// Cup open amount, 0 = closed, 1 = open
    pub drag_progress: f32,
    pub cup: CupPose,
    pub camera: CameraPose,
    /// Live dice, oldest first
    pub dice: Vec<Die>,
    /// Dice shrinking away after a count decrease
    pub despawning: Vec<Die>,
    pub roll: Option<Roll>,
    /// Armed by the hidden gesture, consumed by the next roll
    pub cheat_armed: bool,
    pub cheat: CheatGesture,
    /// Celebration already fired for the current shake
    pub jackpot_triggered: bool,
    pub gesture: GestureTracker,
    pub shake: Option<ShakeAnimation>,
    pub snap: Option<SnapAnimation>,
    /// Next value handed to a manually added die (cycles 1..=6)
    pub next_cyclic_value: Face,
    /// Engine clock (milliseconds of accumulated frame time)
    pub clock_ms: f64,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a new game with the given seed and the default dice count
    pub fn new(seed: u64) -> Self {
        Self::with_dice(seed, DEFAULT_DICE)
    }

    /// Create a new game from player settings
    pub fn from_settings(settings: &Settings, seed: u64) -> Self {
        Self::with_dice(settings.seed.unwrap_or(seed), settings.initial_dice_count)
    }

    pub fn with_dice(seed: u64, dice: u8) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Idle,
            status: StatusText::TapToShake,
            drag_progress: 0.0,
            cup: CupPose::CLOSED,
            camera: CameraPose::default(),
            dice: Vec::new(),
            despawning: Vec::new(),
            roll: None,
            cheat_armed: false,
            cheat: CheatGesture::default(),
            jackpot_triggered: false,
            gesture: GestureTracker::default(),
            shake: None,
            snap: None,
            next_cyclic_value: 1,
            clock_ms: 0.0,
            events: Vec::new(),
            next_id: 1,
        };

        state.reset_dice(dice);
        log::debug!("New game: seed={}, dice={}", seed, state.dice.len());

        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Pending events, oldest first
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn dice_count(&self) -> usize {
        self.dice.len()
    }

    pub fn is_cup_animating(&self) -> bool {
        self.snap.is_some()
    }

    /// Positions of the live dice
    pub fn occupied_positions(&self) -> Vec<Vec3> {
        self.dice.iter().map(|d| d.position).collect()
    }

    pub(crate) fn set_phase(&mut self, phase: GamePhase) {
        if self.phase != phase {
            log::debug!("Phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
            self.events.push(GameEvent::PhaseChanged(phase));
        }
    }

    /// Write Drag Progress and move cup/camera to match
    pub(crate) fn apply_progress(&mut self, progress: f32) {
        self.drag_progress = progress.clamp(0.0, 1.0);
        self.cup = CupPose::from_progress(self.drag_progress);
        self.camera = CameraPose::from_progress(self.drag_progress);
    }

    /// Everything the renderer and UI need for one frame
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            phase: self.phase,
            status: self.status.as_str(),
            dice_count: self.dice.len(),
            cheat_armed: self.cheat_armed,
            drag_progress: self.drag_progress,
            cup: self.cup,
            camera: self.camera,
            dice: self.dice.iter().chain(&self.despawning).cloned().collect(),
        }
    }
}

/// Read-only view for the renderer/UI layer
#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub phase: GamePhase,
    pub status: &'static str,
    pub dice_count: usize,
    pub cheat_armed: bool,
    pub drag_progress: f32,
    pub cup: CupPose,
    pub camera: CameraPose,
    /// Live dice followed by despawning ones
    pub dice: Vec<Die>,
}
