//! Rejection-sampled placement of dice on the cup floor
//!
//! Candidates are drawn area-uniformly over a disk and rejected while they sit
//! closer than the minimum separation to an already placed die. When the
//! attempt budget runs out the last candidate is used anyway, so every die
//! always gets a position.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use crate::consts::*;
use crate::{floor_distance, polar_to_floor};

/// Result of placing a single die
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    /// Candidates drawn (including the accepted one)
    pub attempts: u32,
    /// Budget ran out and `position` may overlap another die
    pub exhausted: bool,
}

/// Floor disk and spacing rules for a placement search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementArea {
    pub safe_radius: f32,
    pub min_separation: f32,
    /// Resting height of a die's center
    pub rest_height: f32,
}

impl Default for PlacementArea {
    fn default() -> Self {
        Self {
            safe_radius: CUP_SAFE_RADIUS,
            min_separation: MIN_DIE_SEPARATION,
            rest_height: DIE_SIZE / 2.0,
        }
    }
}

impl PlacementArea {
    /// Draw one candidate uniformly over the disk area
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let angle = rng.random::<f32>() * TAU;
        // sqrt: uniform per unit area
        let r = rng.random::<f32>().sqrt() * self.safe_radius;
        polar_to_floor(r, angle, self.rest_height)
    }

    /// True if `candidate` keeps its distance from every occupied position
    pub fn is_clear(&self, candidate: Vec3, occupied: &[Vec3]) -> bool {
        occupied
            .iter()
            .all(|&other| floor_distance(candidate, other) >= self.min_separation)
    }

    /// Find a free spot for one die among `occupied`
    pub fn place_one<R: Rng + ?Sized>(
        &self,
        occupied: &[Vec3],
        max_attempts: u32,
        rng: &mut R,
    ) -> Placement {
        let max_attempts = max_attempts.max(1);
        let mut position = self.sample(rng);
        let mut attempts = 1;

        while !self.is_clear(position, occupied) {
            if attempts >= max_attempts {
                log::warn!(
                    "Placement budget exhausted after {} attempts ({} dice placed)",
                    attempts,
                    occupied.len()
                );
                return Placement {
                    position,
                    attempts,
                    exhausted: true,
                };
            }
            position = self.sample(rng);
            attempts += 1;
        }

        Placement {
            position,
            attempts,
            exhausted: false,
        }
    }

    /// Lay out a full round of `count` dice from scratch.
    ///
    /// Prior positions are discarded; dice are placed in roll order, each one
    /// against the dice already placed in this round.
    pub fn place_round<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<Placement> {
        let mut placed: Vec<Vec3> = Vec::with_capacity(count);
        let mut results = Vec::with_capacity(count);
        for _ in 0..count {
            let placement = self.place_one(&placed, ROUND_PLACEMENT_ATTEMPTS, rng);
            placed.push(placement.position);
            results.push(placement);
        }
        results
    }
}

/// Single-die insertion against the live dice (500 attempt budget)
pub fn place_one<R: Rng + ?Sized>(occupied: &[Vec3], rng: &mut R) -> Placement {
    PlacementArea::default().place_one(occupied, SINGLE_PLACEMENT_ATTEMPTS, rng)
}

/// Full-round placement for `count` dice (2000 attempt budget per die)
pub fn place_round<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Placement> {
    PlacementArea::default().place_round(count, rng)
}
