//! Dice count management
//!
//! Reconciles the live dice with a requested count. Added dice take values
//! from a 1→6 cycle instead of a random draw. Removed dice shrink away before
//! their visual is destroyed.

use rand::Rng;
use std::f32::consts::TAU;

use super::outcome::{Face, FACES, roll_face};
use super::placement;
use super::pose::resting_rotation;
use super::state::{Die, GameEvent, GameState};
use crate::consts::*;

/// Repeated 0.1 steps drift in f32; treat scales this close to an end as there
const SCALE_EPSILON: f32 = 1e-4;

/// Clamp a requested count into the playable range
#[inline]
pub fn clamp_count(count: i32) -> u8 {
    count.clamp(MIN_DICE as i32, MAX_DICE as i32) as u8
}

impl GameState {
    /// Drop every die immediately and lay out `count` fresh ones at full size
    pub fn reset_dice(&mut self, count: u8) {
        let count = clamp_count(count as i32);
        let removed: Vec<u32> = self
            .dice
            .drain(..)
            .chain(self.despawning.drain(..))
            .map(|die| die.id)
            .collect();
        for id in removed {
            self.push_event(GameEvent::DieDestroyed { id });
        }
        self.roll = None;

        for _ in 0..count {
            let value = roll_face(&mut self.rng);
            self.spawn_die(value, 1.0);
        }
    }

    /// Grow or shrink the live set to `target` dice (clamped to 1..=8)
    pub fn set_count(&mut self, target: u8) {
        let target = clamp_count(target as i32) as usize;
        let current = self.dice.len();
        if target == current {
            return;
        }

        // The last roll no longer describes the dice on the table
        self.roll = None;

        if target > current {
            for _ in current..target {
                let value = self.next_cyclic_value;
                self.next_cyclic_value = value % FACES + 1;
                self.spawn_die(value, 0.0);
            }
        } else {
            for _ in target..current {
                if let Some(die) = self.dice.pop() {
                    self.despawning.push(die);
                }
            }
        }
        log::debug!("Dice count {} -> {}", current, target);
    }

    /// Insert one die against the live dice, starting at `scale`
    fn spawn_die(&mut self, value: Face, scale: f32) {
        let occupied = self.occupied_positions();
        let placement = placement::place_one(&occupied, &mut self.rng);
        let yaw = self.rng.random::<f32>() * TAU;
        let id = self.next_entity_id();
        self.dice.push(Die {
            id,
            value: Some(value),
            position: placement.position,
            rotation: resting_rotation(value, yaw),
            scale,
        });
        self.push_event(GameEvent::DieSpawned { id });
    }

    /// One tick of spawn growth and despawn shrink
    pub(crate) fn step_dice_tweens(&mut self) {
        for die in &mut self.dice {
            if die.scale < 1.0 {
                die.scale += SPAWN_SCALE_STEP;
                if die.scale >= 1.0 - SCALE_EPSILON {
                    die.scale = 1.0;
                }
            }
        }

        let mut gone = Vec::new();
        self.despawning.retain_mut(|die| {
            die.scale -= SPAWN_SCALE_STEP;
            if die.scale <= SCALE_EPSILON {
                gone.push(die.id);
                false
            } else {
                true
            }
        });
        for id in gone {
            self.push_event(GameEvent::DieDestroyed { id });
        }
    }
}
