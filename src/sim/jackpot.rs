//! Jackpot rule: enough dice showing the same face
//!
//! | dice      | 4 | 5 | 6 | 7 | 8 |
//! |-----------|---|---|---|---|---|
//! | threshold | 3 | 3 | 4 | 4 | 5 |
//!
//! Three or fewer dice never qualify.

use super::outcome::{Face, face_counts};

/// Minimum count of a single face needed for `die_count` dice
pub fn threshold(die_count: usize) -> Option<usize> {
    match die_count {
        4 | 5 => Some(3),
        6 | 7 => Some(4),
        8 => Some(5),
        _ => None,
    }
}

/// Decide whether `roll` (made with `die_count` dice) earns the celebration
pub fn evaluate(roll: &[Face], die_count: usize) -> bool {
    let Some(needed) = threshold(die_count) else {
        return false;
    };
    face_counts(roll).iter().any(|&count| count >= needed)
}
