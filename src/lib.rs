// src/lib.rs
// Four-link pendulum simulator.
// The physics core is math.rs (M α = C and its solve), logic.rs (semi-implicit Euler stepping)
// and model.rs (parameters and state). angles.rs, report.rs, config.rs, driver.rs and ui.rs
// are the collaborators that configure the core, step it and present its state.

pub mod angles;
pub mod config;
pub mod driver;
pub mod error;
pub mod logic;
pub mod math;
pub mod model;
pub mod report;
pub mod ui;

pub use angles::normalize;
pub use error::{Result, SimError};
pub use logic::{run_batch, step, Integrator, StepRecord};
pub use math::{compute_accelerations, compute_accelerations_raw, total_energy};
pub use model::{KinematicState, LinkParameters, PhysicalConstants, StateModel, JOINTS};
