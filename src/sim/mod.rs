//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through `tick`/`advance`
//! - Seeded RNG only
//! - Dice kept in spawn order
//! - No rendering, audio or platform dependencies

pub mod cheat;
pub mod dice;
pub mod gesture;
pub mod jackpot;
pub mod outcome;
pub mod placement;
pub mod pose;
pub mod state;
pub mod tick;

pub use cheat::CheatGesture;
pub use gesture::{CupHitTest, Gesture, GestureTracker, InputEvent, InputKind};
pub use outcome::{FACES, Face};
pub use placement::{Placement, PlacementArea};
pub use pose::{CameraPose, CupPose};
pub use state::{
    CupTarget, Die, GameEvent, GamePhase, GameState, RenderSnapshot, Roll, SoundCue, StatusText,
};
pub use tick::{
    TickInput, adjust_dice_count, advance, cheat_tap, confirm_settings, enter_settings,
    handle_pointer, request_snap, start_shake, tick,
};
