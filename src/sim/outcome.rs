//! Face values for a roll
//!
//! A fair roll draws every die independently. A rigged roll hands all but one
//! die the same "majority" value and the last die a different "minority"
//! value, then shuffles so the odd one out lands on a random die.

use rand::Rng;
use rand::seq::SliceRandom;

/// A single face value (1..=6)
pub type Face = u8;

pub const FACES: Face = 6;

/// One uniform face draw
#[inline]
pub fn roll_face<R: Rng + ?Sized>(rng: &mut R) -> Face {
    rng.random_range(1..=FACES)
}

/// Produce one face value per die.
///
/// `rigged` only takes effect with more than one die; a single die always
/// rolls fair.
pub fn roll_all<R: Rng + ?Sized>(die_count: usize, rigged: bool, rng: &mut R) -> Vec<Face> {
    if rigged && die_count > 1 {
        rigged_roll(die_count, rng)
    } else {
        (0..die_count).map(|_| roll_face(rng)).collect()
    }
}

fn rigged_roll<R: Rng + ?Sized>(die_count: usize, rng: &mut R) -> Vec<Face> {
    let majority = roll_face(rng);
    // Pick from the five remaining faces without retrying
    let minority = match rng.random_range(1..FACES) {
        v if v >= majority => v + 1,
        v => v,
    };

    let mut values = vec![majority; die_count - 1];
    values.push(minority);
    values.shuffle(rng);
    values
}

/// Count of each face, indexed by face value (index 0 unused)
pub fn face_counts(values: &[Face]) -> [usize; FACES as usize + 1] {
    let mut counts = [0; FACES as usize + 1];
    for &v in values {
        if (1..=FACES).contains(&v) {
            counts[v as usize] += 1;
        }
    }
    counts
}
