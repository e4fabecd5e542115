//! Stochastic cellular simulation of a gas-sensing nanowire.
//!
//! The sensing surface is a grid of independent cells. Every iteration each
//! cell draws which gas species occupies it; a target-gas hit deactivates the
//! cell for good, while cells that are still active accrue the transit time of
//! a Maxwell–Boltzmann distributed molecule over a random distance. The final
//! per-cell times yield a current/time curve comparable to the empirical
//! response law `I = a (1 − e^(−t/b))`.
//!
//! ```no_run
//! use nanosense::core::{EnvironmentParameters, NanowireGeometry, Simulation};
//!
//! # fn main() -> nanosense::error::Result<()> {
//! let geometry = NanowireGeometry::new(5e-6, 5e-3, 100, 100, 1.0 / 34.1e-20)?;
//! let environment = EnvironmentParameters::new(0.01, 300.0, 101_325.0, 1e-6, 2.016e-3, 28.96e-3)?;
//! let mut sim = Simulation::new(geometry, environment, Some(7))?;
//! sim.run(0.05)?;
//! let curve = sim.current_vs_time()?;
//! println!("{} points, final current {:?}", curve.len(), curve.last());
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod error;

#[cfg(feature = "python")]
mod python;
