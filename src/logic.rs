// src/logic.rs
// Time stepping for the chain: semi-implicit Euler on top of the accelerations from math.rs.
// Each joint updates ω += α dt first, then θ += ω dt with the updated ω.
// The step is fixed; there is no sub-stepping, stability check or energy correction, so the
// caller picks dt (1/40 s for interactive stepping, 0.025 s for batch logging).
// A step either commits both angles and velocities or leaves the model untouched.

use crate::error::{Result, SimError};
use crate::math::compute_accelerations;
use crate::model::{KinematicState, StateModel, JOINTS};
use serde::Serialize;

/// Fails with `InvalidTimestep` unless dt is positive and finite.
pub fn validate_timestep(dt: f64) -> Result<()> {
    if dt.is_finite() && dt > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidTimestep(dt))
    }
}

/// One semi-implicit Euler step of a kinematic state.
pub fn step(
    state: &KinematicState,
    accelerations: &[f64; JOINTS],
    dt: f64,
) -> Result<KinematicState> {
    validate_timestep(dt)?;
    state.validate()?;
    if let Some(i) = accelerations.iter().position(|a| !a.is_finite()) {
        return Err(SimError::InvalidInput(format!(
            "joint {} acceleration is not finite ({})",
            i + 1,
            accelerations[i]
        )));
    }
    let mut next = *state;
    for i in 0..JOINTS {
        next.velocities[i] += accelerations[i] * dt;
        next.angles[i] += next.velocities[i] * dt;
    }
    next.validate()?;
    Ok(next)
}

/// Fixed-step integrator bound to one timestep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Integrator {
    dt: f64,
}

impl Integrator {
    pub fn new(dt: f64) -> Result<Self> {
        validate_timestep(dt)?;
        Ok(Self { dt })
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Solves for accelerations at the model's current state and commits one step.
    /// Returns the accelerations that were applied.
    pub fn advance(&self, model: &mut StateModel) -> Result<[f64; JOINTS]> {
        let alpha = compute_accelerations(model.params(), model.constants().gravity, model.state())?;
        let next = step(model.state(), &alpha, self.dt)?;
        model.commit(next, self.dt);
        Ok(alpha)
    }
}

/// State after one batch step, stamped with the reporting time `step * dt`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepRecord {
    pub step: usize,
    pub time: f64,
    pub state: KinematicState,
}

/// Advances the model `steps` times and records the state after each step.
///
/// The loop is bounded and cannot be cancelled. On failure the error is returned and the
/// model keeps the state of the last successful step.
pub fn run_batch(
    model: &mut StateModel,
    integrator: &Integrator,
    steps: usize,
) -> Result<Vec<StepRecord>> {
    tracing::debug!(steps, dt = integrator.dt(), "starting batch run");
    let mut records = Vec::with_capacity(steps);
    for step in 0..steps {
        integrator.advance(model)?;
        records.push(StepRecord {
            step,
            time: step as f64 * integrator.dt(),
            state: *model.state(),
        });
        if (step + 1) % 1000 == 0 {
            tracing::debug!(completed = step + 1, "batch progress");
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LinkParameters, PhysicalConstants};
    use approx::assert_relative_eq;

    #[test]
    fn uses_updated_velocity_for_position() {
        let state = KinematicState::new([1.0, 0.0, -1.0, 0.5], [0.5, 0.0, 1.0, -2.0]);
        let next = step(&state, &[2.0, 1.0, 0.0, 4.0], 0.5).unwrap();
        assert_eq!(next.velocities, [1.5, 0.5, 1.0, 0.0]);
        assert_eq!(next.angles, [1.75, 0.25, -0.5, 0.5]);
    }

    #[test]
    fn bad_timesteps_are_rejected() {
        let state = KinematicState::at_rest([0.0; JOINTS]);
        for dt in [0.0, -0.01, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                step(&state, &[0.0; JOINTS], dt),
                Err(SimError::InvalidTimestep(_))
            ));
            assert!(Integrator::new(dt).is_err());
        }
    }

    #[test]
    fn overflowing_step_is_rejected() {
        let state = KinematicState::new([0.0; JOINTS], [1e300, 0.0, 0.0, 0.0]);
        assert!(matches!(
            step(&state, &[0.0; JOINTS], 1e10),
            Err(SimError::InvalidInput(ref msg)) if msg.contains("joint 1 angle")
        ));
    }

    #[test]
    fn non_finite_acceleration_is_rejected() {
        let state = KinematicState::at_rest([0.0; JOINTS]);
        assert!(matches!(
            step(&state, &[0.0, f64::NAN, 0.0, 0.0], 0.01),
            Err(SimError::InvalidInput(_))
        ));
    }

    #[test]
    fn batch_times_follow_step_index() {
        let params = LinkParameters::uniform(1.0, 1.0).unwrap();
        let mut model = StateModel::new(
            params,
            PhysicalConstants::default(),
            KinematicState::at_rest([0.2; JOINTS]),
        )
        .unwrap();
        let integrator = Integrator::new(0.025).unwrap();

        let records = run_batch(&mut model, &integrator, 5).unwrap();

        assert_eq!(records.len(), 5);
        assert_eq!(records[0].time, 0.0);
        assert_relative_eq!(records[4].time, 0.1, epsilon = 1e-12);
        assert_eq!(records[4].state, *model.state());
        assert_eq!(model.steps(), 5);
        assert_ne!(records[0].state.angles, [0.2; JOINTS]);
    }
}
