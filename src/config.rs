// src/config.rs
// Simulation configuration.
// Defaults reproduce the batch reference run: four 100-unit links of unit mass released
// from horizontal (90°) at rest, stepped at 0.025 s for 10 000 steps. Any field can be
// overridden from a JSON file; missing fields keep their defaults.

use crate::error::Result;
use crate::logic::Integrator;
use crate::model::{
    KinematicState, LinkParameters, PhysicalConstants, StateModel, EARTH_GRAVITY, JOINTS,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub lengths: [f64; JOINTS],
    pub masses: [f64; JOINTS],
    /// Initial joint angles in degrees.
    pub initial_angles_deg: [f64; JOINTS],
    /// Initial angular velocities in rad/s.
    pub initial_velocities: [f64; JOINTS],
    pub gravity: f64,
    /// Batch timestep in seconds.
    pub dt: f64,
    /// Number of batch steps.
    pub steps: usize,
    /// Frame rate of the interactive driver; its timestep is `1 / step_rate_hz`.
    pub step_rate_hz: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            lengths: [100.0; JOINTS],
            masses: [1.0; JOINTS],
            initial_angles_deg: [90.0; JOINTS],
            initial_velocities: [0.0; JOINTS],
            gravity: EARTH_GRAVITY,
            dt: 0.025,
            steps: 10_000,
            step_rate_hz: 40.0,
        }
    }
}

impl SimConfig {
    /// Preset of the interactive window: all joints start at 45°.
    pub fn interactive() -> Self {
        Self {
            initial_angles_deg: [45.0; JOINTS],
            ..Self::default()
        }
    }

    /// Reads a JSON configuration file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn initial_state(&self) -> KinematicState {
        KinematicState::new(
            self.initial_angles_deg.map(f64::to_radians),
            self.initial_velocities,
        )
    }

    /// Validates parameters and builds a fresh model at the initial state.
    pub fn build_model(&self) -> Result<StateModel> {
        StateModel::new(
            LinkParameters::new(self.lengths, self.masses)?,
            PhysicalConstants::new(self.gravity)?,
            self.initial_state(),
        )
    }

    pub fn batch_integrator(&self) -> Result<Integrator> {
        Integrator::new(self.dt)
    }

    /// Integrator running at the interactive frame rate.
    pub fn interactive_integrator(&self) -> Result<Integrator> {
        Integrator::new(1.0 / self.step_rate_hz)
    }
}
