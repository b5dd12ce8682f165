//! Cup, camera and die transforms the renderer reads
//!
//! Everything here is a pure function of Drag Progress (or of a face value),
//! so the renderer never owns any game state.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::outcome::Face;
use crate::consts::*;
use crate::{ease_in_out_quad, ease_out_cubic};

/// Cup lift/tilt when fully open
const CUP_OPEN_Y: f32 = 12.0;
const CUP_OPEN_Z: f32 = -4.0;
const CUP_OPEN_TILT: f32 = -FRAC_PI_4;

const CAM_POS_FAR: Vec3 = Vec3::new(0.0, 14.0, 20.0);
const CAM_POS_CLOSE: Vec3 = Vec3::new(0.0, 12.0, 4.0);
const LOOK_AT_FAR: Vec3 = Vec3::new(0.0, 3.0, 0.0);
const LOOK_AT_CLOSE: Vec3 = Vec3::new(0.0, 0.5, 0.0);

/// Cup group transform (rotation as XYZ Euler angles, radians)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CupPose {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl CupPose {
    /// Resting on the table over the dice
    pub const CLOSED: CupPose = CupPose {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
    };

    /// Pose for a given Drag Progress.
    ///
    /// Tilt runs ahead of the lift (it completes at two thirds progress) and
    /// the cup is raised by the tilt's sink so its rim never dips into the
    /// table.
    pub fn from_progress(progress: f32) -> Self {
        let p = progress.clamp(0.0, 1.0);
        let ease = ease_in_out_quad(p);
        let rot_ease = ease_out_cubic((p * 1.5).min(1.0));

        let tilt = CUP_OPEN_TILT * rot_ease;
        let sink_correction = tilt.abs().sin() * (CUP_RADIUS_OPEN * 0.9);

        Self {
            position: Vec3::new(0.0, CUP_OPEN_Y * ease + sink_correction, CUP_OPEN_Z * ease),
            rotation: Vec3::new(tilt, 0.0, 0.0),
        }
    }
}

/// Camera placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::from_progress(0.0)
    }
}

impl CameraPose {
    /// Camera dollies in over the table as the cup opens
    pub fn from_progress(progress: f32) -> Self {
        let ease = ease_in_out_quad(progress.clamp(0.0, 1.0));
        Self {
            position: CAM_POS_FAR.lerp(CAM_POS_CLOSE, ease),
            look_at: LOOK_AT_FAR.lerp(LOOK_AT_CLOSE, ease),
        }
    }
}

/// Orientation that shows `face` on top, before any yaw.
///
/// Matches the face layout of the die mesh: +X shows 1, -X shows 6, +Y shows 2,
/// -Y shows 5, +Z shows 3, -Z shows 4.
pub fn face_up_rotation(face: Face) -> Quat {
    match face {
        1 => Quat::from_rotation_z(FRAC_PI_2),
        6 => Quat::from_rotation_z(-FRAC_PI_2),
        5 => Quat::from_rotation_x(PI),
        3 => Quat::from_rotation_x(-FRAC_PI_2),
        4 => Quat::from_rotation_x(FRAC_PI_2),
        _ => Quat::IDENTITY,
    }
}

/// Face-up orientation spun by `yaw` about the world vertical
pub fn resting_rotation(face: Face, yaw: f32) -> Quat {
    Quat::from_rotation_y(yaw) * face_up_rotation(face)
}

/// Center height of a die resting on the table
pub const REST_HEIGHT: f32 = DIE_SIZE / 2.0;
