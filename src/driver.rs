// src/driver.rs
// Interactive stepping: a renderer calls `tick` once per frame and reads `snapshot` to draw.
// The chain only moves while the simulate flag is on; every tick then advances exactly one fixed
// step of 1 / step_rate seconds.

use crate::angles::normalize_all;
use crate::config::SimConfig;
use crate::error::Result;
use crate::logic::Integrator;
use crate::model::{StateModel, JOINTS};
use serde::Serialize;

/// What a frame needs to display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DriverSnapshot {
    pub simulate: bool,
    pub time: f64,
    pub steps: u64,
    pub angles: [f64; JOINTS],
    pub velocities: [f64; JOINTS],
    pub angles_degrees: [f64; JOINTS],
}

pub struct InteractiveDriver {
    config: SimConfig,
    model: StateModel,
    integrator: Integrator,
    simulate: bool,
}

impl InteractiveDriver {
    pub fn new(config: SimConfig) -> Result<Self> {
        let model = config.build_model()?;
        let integrator = config.interactive_integrator()?;
        Ok(Self {
            config,
            model,
            integrator,
            simulate: false,
        })
    }

    pub fn is_simulating(&self) -> bool {
        self.simulate
    }

    /// Flips the simulate flag and returns its new value.
    pub fn toggle(&mut self) -> bool {
        self.simulate = !self.simulate;
        tracing::info!(simulate = self.simulate, "simulation toggled");
        self.simulate
    }

    pub fn set_simulating(&mut self, simulate: bool) {
        self.simulate = simulate;
    }

    /// Advances one step if simulating. Returns whether the chain moved.
    pub fn tick(&mut self) -> Result<bool> {
        if !self.simulate {
            return Ok(false);
        }
        self.integrator.advance(&mut self.model)?;
        Ok(true)
    }

    /// Runs `frames` ticks and returns how many of them stepped.
    pub fn advance(&mut self, frames: usize) -> Result<usize> {
        let mut stepped = 0;
        for _ in 0..frames {
            if self.tick()? {
                stepped += 1;
            }
        }
        Ok(stepped)
    }

    /// Rebuilds the model at the configured initial state and stops simulating.
    pub fn reset(&mut self) -> Result<()> {
        self.model = self.config.build_model()?;
        self.simulate = false;
        Ok(())
    }

    pub fn model(&self) -> &StateModel {
        &self.model
    }

    pub fn snapshot(&self) -> DriverSnapshot {
        let state = self.model.state();
        DriverSnapshot {
            simulate: self.simulate,
            time: self.model.elapsed(),
            steps: self.model.steps(),
            angles: state.angles,
            velocities: state.velocities,
            angles_degrees: normalize_all(&state.angles),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ticks_only_move_while_simulating() {
        let mut driver = InteractiveDriver::new(SimConfig::interactive()).unwrap();
        let start = driver.snapshot();

        assert!(!driver.tick().unwrap());
        assert_eq!(driver.snapshot(), start);

        assert!(driver.toggle());
        assert_eq!(driver.advance(3).unwrap(), 3);
        let moved = driver.snapshot();
        assert_eq!(moved.steps, 3);
        assert_eq!(driver.model().steps(), 3);
        assert_eq!(driver.model().state().angles, moved.angles);
        assert_relative_eq!(moved.time, 3.0 / 40.0, epsilon = 1e-12);
        assert_ne!(moved.angles, start.angles);

        assert!(!driver.toggle());
        assert_eq!(driver.advance(5).unwrap(), 0);
        assert_eq!(driver.snapshot().steps, 3);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut driver = InteractiveDriver::new(SimConfig::interactive()).unwrap();
        let start = driver.snapshot();
        driver.set_simulating(true);
        driver.advance(10).unwrap();
        driver.reset().unwrap();
        assert_eq!(driver.snapshot(), start);
        assert!(!driver.is_simulating());
    }

    #[test]
    fn rejects_invalid_step_rate() {
        let config = SimConfig {
            step_rate_hz: 0.0,
            ..SimConfig::interactive()
        };
        assert!(InteractiveDriver::new(config).is_err());
    }
}
