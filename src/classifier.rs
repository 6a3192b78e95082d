//! Geometric gesture classification over a single landmark frame.
//!
//! Pure function of the 21 points, no history, so it is testable with
//! synthetic hands and never needs a camera.

use std::time::Instant;

use crate::types::{
    Classification, HandLandmarks, Point3D, Symbol, FINGER_PIPS, FINGER_TIPS, PALM_RING, THUMB_MCP,
    THUMB_TIP, WRIST,
};

/// Classify one landmark frame into a symbol plus its extended-finger count.
pub fn classify(hand: &HandLandmarks, at: Instant) -> Classification {
    let extended = extended_fingers(hand);
    let count = extended.iter().filter(|&&e| e).count() as u8;

    // Fixed rule, matched by the unit tests below:
    //   0-1 fingers      -> Rock
    //   index+middle only-> Scissors
    //   4-5 fingers      -> Paper
    //   anything else    -> Unknown
    let symbol = if count <= 1 {
        Symbol::Rock
    } else if count == 2 && extended[1] && extended[2] {
        Symbol::Scissors
    } else if count >= 4 {
        Symbol::Paper
    } else {
        Symbol::Unknown
    };

    Classification {
        symbol,
        extended_fingers: count,
        hand_present: true,
        at,
    }
}

/// Which of [thumb, index, middle, ring, pinky] are extended.
///
/// Non-thumb fingers use an axial test: the tip must sit farther from the
/// wrist than the finger's middle (PIP) joint does. That holds whichever way
/// the hand is rotated, unlike a raw y comparison. The thumb extends sideways
/// rather than along the palm axis, so it gets a lateral test against the
/// palm center instead.
pub fn extended_fingers(hand: &HandLandmarks) -> [bool; 5] {
    let wrist = hand.point(WRIST);
    let palm = palm_center(hand);

    let mut out = [false; 5];
    out[0] = hand.point(THUMB_TIP).dist(&palm) > hand.point(THUMB_MCP).dist(&palm);
    for i in 0..4 {
        let tip = hand.point(FINGER_TIPS[i]);
        let pip = hand.point(FINGER_PIPS[i]);
        out[i + 1] = tip.dist(&wrist) > pip.dist(&wrist);
    }
    out
}

fn palm_center(hand: &HandLandmarks) -> Point3D {
    let mut x = 0.0;
    let mut y = 0.0;
    for &i in &PALM_RING {
        x += hand.point(i).x;
        y += hand.point(i).y;
    }
    let n = PALM_RING.len() as f32;
    Point3D::new(x / n, y / n, 0.0)
}
