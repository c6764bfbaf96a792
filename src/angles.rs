// src/angles.rs
// Reporting view of joint angles. Internal state keeps unbounded radians; reports show degrees
// shifted by -270° and wrapped into [0, 360).

use crate::model::JOINTS;
use std::f64::consts::TAU;

/// Offset applied before wrapping, in degrees.
const REFERENCE_OFFSET_DEG: f64 = 270.0;

/// Maps an accumulated angle in radians to reporting degrees in `[0, 360)`.
///
/// Non-finite input yields NaN.
pub fn normalize(angle_radians: f64) -> f64 {
    // wrap in radians first so huge inputs cannot overflow the degree conversion
    let turn = angle_radians.rem_euclid(TAU).to_degrees();
    let wrapped = (turn - REFERENCE_OFFSET_DEG).rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Normalizes every joint angle of a state.
pub fn normalize_all(angles: &[f64; JOINTS]) -> [f64; JOINTS] {
    angles.map(normalize)
}
