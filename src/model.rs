// src/model.rs
// Physical configuration and mutable kinematic state of the four-link chain.
// Joint 0 hangs from the fixed pivot, joint 3 is the free end. Angles are radians from the
// downward vertical, positive towards +x, and accumulate without wraparound.
// LinkParameters are validated once at construction and never change afterwards.
// KinematicState keeps angles and velocities as fixed arrays so the "exactly four joints,
// in lock-step" rule is carried by the types rather than checked at runtime.

use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};

/// Number of links (and joints) in the chain.
pub const JOINTS: usize = 4;

/// Standard gravitational acceleration in m/s².
pub const EARTH_GRAVITY: f64 = 9.81;

/// Lengths and masses of the links, joint 0 nearest the pivot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinkParameters {
    lengths: [f64; JOINTS],
    masses: [f64; JOINTS],
}

impl LinkParameters {
    /// Validates that every length and mass is finite and strictly positive.
    pub fn new(lengths: [f64; JOINTS], masses: [f64; JOINTS]) -> Result<Self> {
        check_positive("length", &lengths)?;
        check_positive("mass", &masses)?;
        Ok(Self { lengths, masses })
    }

    /// Every link with the same length and mass.
    pub fn uniform(length: f64, mass: f64) -> Result<Self> {
        Self::new([length; JOINTS], [mass; JOINTS])
    }

    pub fn lengths(&self) -> &[f64; JOINTS] {
        &self.lengths
    }

    pub fn masses(&self) -> &[f64; JOINTS] {
        &self.masses
    }

    /// Total reach of the chain when fully extended.
    pub fn total_length(&self) -> f64 {
        self.lengths.iter().sum()
    }
}

fn check_positive(what: &str, values: &[f64; JOINTS]) -> Result<()> {
    for (i, &v) in values.iter().enumerate() {
        if !v.is_finite() || v <= 0.0 {
            return Err(SimError::InvalidInput(format!(
                "link {} {what} must be positive and finite, got {v}",
                i + 1
            )));
        }
    }
    Ok(())
}

/// Constants of the environment the chain swings in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    /// Gravitational acceleration (m/s²), acting along the downward vertical.
    pub gravity: f64,
}

impl PhysicalConstants {
    pub fn new(gravity: f64) -> Result<Self> {
        if !gravity.is_finite() {
            return Err(SimError::InvalidInput(format!(
                "gravity must be finite, got {gravity}"
            )));
        }
        Ok(Self { gravity })
    }
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            gravity: EARTH_GRAVITY,
        }
    }
}

/// Joint angles (rad) and angular velocities (rad/s); index i pairs angle and velocity of joint i.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KinematicState {
    pub angles: [f64; JOINTS],
    pub velocities: [f64; JOINTS],
}

impl KinematicState {
    pub fn new(angles: [f64; JOINTS], velocities: [f64; JOINTS]) -> Self {
        Self { angles, velocities }
    }

    /// Chain at rest with the given angles.
    pub fn at_rest(angles: [f64; JOINTS]) -> Self {
        Self::new(angles, [0.0; JOINTS])
    }

    /// Fails with `InvalidInput` if any angle or velocity is NaN or infinite.
    pub fn validate(&self) -> Result<()> {
        check_finite("angle", &self.angles)?;
        check_finite("angular velocity", &self.velocities)
    }
}

fn check_finite(what: &str, values: &[f64; JOINTS]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(SimError::InvalidInput(format!(
            "joint {} {what} is not finite ({})",
            i + 1,
            values[i]
        ))),
        None => Ok(()),
    }
}

/// Owner of the chain's configuration and its evolving state.
///
/// Readers get shared access through the getters. The only way to change the state is
/// [`StateModel::commit`], which the integrator calls once per successful step.
#[derive(Debug, Clone)]
pub struct StateModel {
    params: LinkParameters,
    constants: PhysicalConstants,
    state: KinematicState,
    elapsed: f64,
    steps: u64,
}

impl StateModel {
    pub fn new(
        params: LinkParameters,
        constants: PhysicalConstants,
        initial: KinematicState,
    ) -> Result<Self> {
        initial.validate()?;
        Ok(Self {
            params,
            constants,
            state: initial,
            elapsed: 0.0,
            steps: 0,
        })
    }

    pub fn params(&self) -> &LinkParameters {
        &self.params
    }

    pub fn constants(&self) -> &PhysicalConstants {
        &self.constants
    }

    pub fn state(&self) -> &KinematicState {
        &self.state
    }

    /// Simulated seconds accumulated over all committed steps.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Number of committed steps.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub(crate) fn commit(&mut self, next: KinematicState, dt: f64) {
        self.state = next;
        self.elapsed += dt;
        self.steps += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_links() {
        assert!(LinkParameters::new([1.0, 1.0, 0.0, 1.0], [1.0; JOINTS]).is_err());
        assert!(LinkParameters::new([1.0; JOINTS], [1.0, -2.0, 1.0, 1.0]).is_err());
        assert!(LinkParameters::new([1.0, f64::INFINITY, 1.0, 1.0], [1.0; JOINTS]).is_err());
        assert!(LinkParameters::uniform(100.0, 1.0).is_ok());
    }

    #[test]
    fn rejects_nan_state() {
        let state = KinematicState::at_rest([0.0, f64::NAN, 0.0, 0.0]);
        let err = state.validate().unwrap_err();
        assert!(matches!(err, SimError::InvalidInput(ref msg) if msg.contains("joint 2")));

        let params = LinkParameters::uniform(1.0, 1.0).unwrap();
        assert!(StateModel::new(params, PhysicalConstants::default(), state).is_err());
    }

    #[test]
    fn commit_advances_clock() {
        let params = LinkParameters::uniform(1.0, 1.0).unwrap();
        let mut model = StateModel::new(
            params,
            PhysicalConstants::default(),
            KinematicState::at_rest([0.1; JOINTS]),
        )
        .unwrap();

        model.commit(KinematicState::at_rest([0.2; JOINTS]), 0.5);
        model.commit(KinematicState::at_rest([0.3; JOINTS]), 0.5);

        assert_eq!(model.steps(), 2);
        assert_eq!(model.elapsed(), 1.0);
        assert_eq!(model.state().angles, [0.3; JOINTS]);
    }

    #[test]
    fn gravity_must_be_finite() {
        assert!(PhysicalConstants::new(f64::NAN).is_err());
        assert_eq!(PhysicalConstants::default().gravity, EARTH_GRAVITY);
    }
}
