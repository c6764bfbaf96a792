// src/math.rs
// Equations of motion for the four-link chain, written as M α = C and solved for α every step.
// M is the symmetric mass matrix: M_ij = l_i l_j μ_max(i,j) cos(θ_i - θ_j), with μ_k the mass carried
// at and beyond joint k. C combines the gravity torque with two velocity sums per joint pair:
// a direct Coriolis term and a relative-velocity correction. Together they collapse to the
// centripetal term -Σ_k μ_max(i,k) l_k sin(θ_i - θ_k) ω_k² of the Lagrangian derivation.
// Everything here is a pure function of (state, parameters, g); nothing is cached between calls.

use crate::error::{Result, SimError};
use crate::model::{KinematicState, LinkParameters, JOINTS};
use nalgebra::{Matrix4, Vector4};

/// Pivots smaller than this fraction of the largest matrix entry are treated as zero.
const PIVOT_TOLERANCE: f64 = 1e-12;

/// Cumulative suffix sums of the masses: entry k is the mass at and beyond joint k.
pub fn distal_mass_sums(masses: &[f64; JOINTS]) -> [f64; JOINTS] {
    let mut sums = [0.0; JOINTS];
    let mut carried = 0.0;
    for k in (0..JOINTS).rev() {
        carried += masses[k];
        sums[k] = carried;
    }
    sums
}

/// Snapshot of the chain at one instant, with pairwise trig terms precomputed.
pub struct ChainDynamics<'a> {
    params: &'a LinkParameters,
    state: &'a KinematicState,
    gravity: f64,
    distal: [f64; JOINTS],
    cos: [[f64; JOINTS]; JOINTS], // cos(θ_i - θ_j), symmetric
    sin: [[f64; JOINTS]; JOINTS], // sin(θ_i - θ_j), antisymmetric
}

impl<'a> ChainDynamics<'a> {
    pub fn new(params: &'a LinkParameters, gravity: f64, state: &'a KinematicState) -> Self {
        let theta = &state.angles;
        let mut cos = [[1.0; JOINTS]; JOINTS];
        let mut sin = [[0.0; JOINTS]; JOINTS];
        for i in 0..JOINTS {
            for j in (i + 1)..JOINTS {
                let (s, c) = (theta[i] - theta[j]).sin_cos();
                cos[i][j] = c;
                cos[j][i] = c;
                sin[i][j] = s;
                sin[j][i] = -s;
            }
        }
        Self {
            params,
            state,
            gravity,
            distal: distal_mass_sums(params.masses()),
            cos,
            sin,
        }
    }

    /// Mass carried beyond the more distal of joints i and j.
    fn coupled_mass(&self, i: usize, j: usize) -> f64 {
        self.distal[i.max(j)]
    }

    /// Symmetric 4×4 mass matrix.
    pub fn mass_matrix(&self) -> Matrix4<f64> {
        let l = self.params.lengths();
        let mut m = Matrix4::zeros();
        for i in 0..JOINTS {
            m[(i, i)] = l[i] * l[i] * self.distal[i];
            for j in (i + 1)..JOINTS {
                let term = l[i] * l[j] * self.coupled_mass(i, j) * self.cos[i][j];
                m[(i, j)] = term;
                m[(j, i)] = term;
            }
        }
        m
    }

    /// Forcing vector: gravity torque plus the velocity coupling sums.
    pub fn forcing_vector(&self) -> Vector4<f64> {
        let l = self.params.lengths();
        let theta = &self.state.angles;
        let omega = &self.state.velocities;
        let mut c = Vector4::zeros();
        for i in 0..JOINTS {
            let mut f = -self.gravity * theta[i].sin() * self.distal[i];
            // direct Coriolis sum
            for k in (0..JOINTS).filter(|&k| k != i) {
                f -= l[k] * self.coupled_mass(i, k) * self.sin[i][k] * omega[k] * omega[i];
            }
            // relative-velocity correction
            for k in (0..JOINTS).filter(|&k| k != i) {
                f -= self.coupled_mass(i, k)
                    * l[k]
                    * self.sin[k][i]
                    * (omega[i] - omega[k])
                    * omega[k];
            }
            c[i] = l[i] * f;
        }
        c
    }

    /// Solves M α = C for the angular accelerations.
    pub fn accelerations(&self) -> Result<[f64; JOINTS]> {
        let c = self.forcing_vector();
        if c.iter().any(|v| !v.is_finite()) {
            return Err(SimError::InvalidInput(
                "forcing vector overflowed; velocities too large".into(),
            ));
        }
        let alpha = solve_dense(self.mass_matrix(), c)?;
        let mut out = [0.0; JOINTS];
        out.copy_from_slice(alpha.as_slice());
        Ok(out)
    }
}

/// LU with partial pivoting. M is symmetric but not assumed positive definite.
pub(crate) fn solve_dense(m: Matrix4<f64>, c: Vector4<f64>) -> Result<Vector4<f64>> {
    let scale = m.amax();
    if !scale.is_finite() || scale == 0.0 {
        return Err(SimError::SingularSystem { pivot: 0.0 });
    }
    let lu = m.lu();
    let pivot = lu
        .u()
        .diagonal()
        .iter()
        .fold(f64::INFINITY, |acc, d| acc.min(d.abs()));
    if pivot <= PIVOT_TOLERANCE * scale {
        return Err(SimError::SingularSystem { pivot });
    }
    lu.solve(&c).ok_or(SimError::SingularSystem { pivot })
}

/// Angular accelerations of the chain for the given state.
pub fn compute_accelerations(
    params: &LinkParameters,
    gravity: f64,
    state: &KinematicState,
) -> Result<[f64; JOINTS]> {
    state.validate()?;
    if !gravity.is_finite() {
        return Err(SimError::InvalidInput(format!(
            "gravity must be finite, got {gravity}"
        )));
    }
    let alpha = ChainDynamics::new(params, gravity, state).accelerations()?;
    if alpha.iter().any(|a| !a.is_finite()) {
        return Err(SimError::SingularSystem { pivot: 0.0 });
    }
    Ok(alpha)
}

/// Array form of [`compute_accelerations`] taking raw lengths and masses.
pub fn compute_accelerations_raw(
    angles: [f64; JOINTS],
    velocities: [f64; JOINTS],
    lengths: [f64; JOINTS],
    masses: [f64; JOINTS],
    gravity: f64,
) -> Result<[f64; JOINTS]> {
    let params = LinkParameters::new(lengths, masses)?;
    compute_accelerations(&params, gravity, &KinematicState::new(angles, velocities))
}

/// Cartesian joint positions with the pivot at the origin and y pointing up.
pub fn joint_positions(params: &LinkParameters, state: &KinematicState) -> [(f64, f64); JOINTS] {
    let mut out = [(0.0, 0.0); JOINTS];
    let (mut x, mut y) = (0.0, 0.0);
    for (k, (l, theta)) in params.lengths().iter().zip(&state.angles).enumerate() {
        x += l * theta.sin();
        y -= l * theta.cos();
        out[k] = (x, y);
    }
    out
}

/// Kinetic plus gravitational potential energy, zero potential at the pivot height.
pub fn total_energy(params: &LinkParameters, gravity: f64, state: &KinematicState) -> f64 {
    let (mut vx, mut vy) = (0.0, 0.0);
    let mut kinetic = 0.0;
    let mut potential = 0.0;
    let positions = joint_positions(params, state);
    for k in 0..JOINTS {
        let (l, theta, omega) = (
            params.lengths()[k],
            state.angles[k],
            state.velocities[k],
        );
        vx += l * theta.cos() * omega;
        vy += l * theta.sin() * omega;
        let m = params.masses()[k];
        kinetic += 0.5 * m * (vx * vx + vy * vy);
        potential += m * gravity * positions[k].1;
    }
    kinetic + potential
}
