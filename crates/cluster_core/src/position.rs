//! Lattice positions and course stepping.
//!
//! Ships and planets live on an integer lattice. Movement is one
//! axis-aligned step per tick: the step that most reduces Euclidean
//! distance to the target wins, with ties resolved by axis priority
//! x, then y, then z.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Lower generation bound (inclusive) per axis.
pub const COORD_MIN: i64 = -50;

/// Upper generation bound (inclusive) per axis.
pub const COORD_MAX: i64 = 50;

/// A point on the world lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate.
    pub x: i64,
    /// Y coordinate.
    pub y: i64,
    /// Z coordinate.
    pub z: i64,
}

impl Position {
    /// Create a position from coordinates.
    #[must_use]
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// Sample a uniformly random position inside the generation bounds.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            x: rng.gen_range(COORD_MIN..=COORD_MAX),
            y: rng.gen_range(COORD_MIN..=COORD_MAX),
            z: rng.gen_range(COORD_MIN..=COORD_MAX),
        }
    }

    /// Euclidean distance to another position.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        let dz = (self.z - other.z) as f64;
        dx.mul_add(dx, dy.mul_add(dy, dz * dz)).sqrt()
    }

    /// One course step toward `target`.
    ///
    /// Evaluates the three axis-aligned candidate moves (each axis stepped by
    /// the sign of its remaining delta) and returns the candidate with the
    /// smallest resulting distance. Ties resolve to the earlier axis in
    /// x, y, z order. Stepping toward the current position is a no-op;
    /// callers decide what "arrived" means.
    #[must_use]
    pub fn step_towards(self, target: Self) -> Self {
        let candidates = [
            Self::new(self.x + (target.x - self.x).signum(), self.y, self.z),
            Self::new(self.x, self.y + (target.y - self.y).signum(), self.z),
            Self::new(self.x, self.y, self.z + (target.z - self.z).signum()),
        ];

        let mut best = candidates[0];
        let mut best_distance = best.distance(target);
        for candidate in &candidates[1..] {
            let distance = candidate.distance(target);
            if distance < best_distance {
                best = *candidate;
                best_distance = distance;
            }
        }
        best
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_within_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let p = Position::random(&mut rng);
            assert!((COORD_MIN..=COORD_MAX).contains(&p.x));
            assert!((COORD_MIN..=COORD_MAX).contains(&p.y));
            assert!((COORD_MIN..=COORD_MAX).contains(&p.z));
        }
    }

    #[test]
    fn test_distance() {
        let a = Position::new(0, 0, 0);
        let b = Position::new(3, 4, 0);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
        assert!((a.distance(a)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_step_moves_along_single_axis() {
        let from = Position::new(0, 0, 0);
        let to = Position::new(3, 0, 0);

        let stepped = from.step_towards(to);
        assert_eq!(stepped, Position::new(1, 0, 0));
    }

    #[test]
    fn test_step_tie_breaks_x_before_y_before_z() {
        // Equal improvement on x and y: x wins.
        let stepped = Position::new(0, 0, 0).step_towards(Position::new(1, 1, 0));
        assert_eq!(stepped, Position::new(1, 0, 0));

        // Equal improvement on y and z: y wins.
        let stepped = Position::new(0, 0, 0).step_towards(Position::new(0, 1, 1));
        assert_eq!(stepped, Position::new(0, 1, 0));
    }

    #[test]
    fn test_step_handles_negative_deltas() {
        let stepped = Position::new(0, 0, 0).step_towards(Position::new(0, -5, -1));
        assert_eq!(stepped, Position::new(0, -1, 0));
    }

    #[test]
    fn test_step_at_target_is_noop() {
        let here = Position::new(2, -3, 7);
        assert_eq!(here.step_towards(here), here);
    }

    #[test]
    fn test_display_is_underscore_keyed() {
        assert_eq!(Position::new(1, -2, 3).to_string(), "1_-2_3");
    }
}
