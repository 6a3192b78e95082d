use std::time::Instant;

use anyhow::{bail, Result};

/// Represents a single 3D point in frame coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct Point3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3D {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dist(&self, other: &Point3D) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Number of tracked points per hand (MediaPipe hand topology).
pub const LANDMARK_COUNT: usize = 21;

// Landmark indices. 0 is the wrist; each finger runs base-to-tip:
// thumb 1-4, index 5-8, middle 9-12, ring 13-16, pinky 17-20.
pub const WRIST: usize = 0;
pub const THUMB_MCP: usize = 2;
pub const THUMB_TIP: usize = 4;
pub const FINGER_PIPS: [usize; 4] = [6, 10, 14, 18];
pub const FINGER_TIPS: [usize; 4] = [8, 12, 16, 20];
pub const PALM_RING: [usize; 5] = [0, 5, 9, 13, 17];

/// One validated snapshot of 21 tracked hand points for a single camera frame.
#[derive(Debug, Clone)]
pub struct HandLandmarks {
    points: Vec<Point3D>,
}

impl HandLandmarks {
    /// Build a landmark frame, rejecting anything that is not exactly 21
    /// points. A wrong count means the upstream model wrapper broke its
    /// contract; we refuse to guess geometry.
    pub fn from_points(points: Vec<Point3D>) -> Result<Self> {
        if points.len() != LANDMARK_COUNT {
            bail!(
                "hand landmark frame must have {} points, got {}",
                LANDMARK_COUNT,
                points.len()
            );
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point3D] {
        &self.points
    }

    pub fn point(&self, idx: usize) -> Point3D {
        self.points[idx]
    }
}

/// The three playable symbols plus Unknown ("no hand or inconclusive
/// geometry"). Unknown is a normal value, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Rock,
    Paper,
    Scissors,
    Unknown,
}

impl Symbol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rock => "ROCK",
            Self::Paper => "PAPER",
            Self::Scissors => "SCISSORS",
            Self::Unknown => "?",
        }
    }
}

/// Per-frame classifier output.
#[derive(Debug, Clone, Copy)]
pub struct Classification {
    pub symbol: Symbol,
    pub extended_fingers: u8,
    /// False for the "no landmarks at all" sentinel. Gameplay treats a
    /// missing hand and inconclusive geometry identically; the HUD does not.
    pub hand_present: bool,
    pub at: Instant,
}

impl Classification {
    pub fn no_hand(at: Instant) -> Self {
        Self {
            symbol: Symbol::Unknown,
            extended_fingers: 0,
            hand_present: false,
            at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_point_count() {
        assert!(HandLandmarks::from_points(vec![Point3D::default(); 20]).is_err());
        assert!(HandLandmarks::from_points(vec![Point3D::default(); 22]).is_err());
        assert!(HandLandmarks::from_points(vec![Point3D::default(); 21]).is_ok());
    }

    #[test]
    fn no_hand_sentinel_is_unknown() {
        let c = Classification::no_hand(Instant::now());
        assert_eq!(c.symbol, Symbol::Unknown);
        assert!(!c.hand_present);
    }
}
