#![allow(missing_docs)]

//! Core simulation types for the nanowire gas sensor.
//!
//! Leaves first: physical constants and materials, the discretized
//! Maxwell–Boltzmann speed sampler, the nanowire geometry and gas
//! environment, then the engine and the current/time curve derived from it.

pub mod constants;
pub mod control;
pub mod curve;
pub mod distribution;
pub mod environment;
pub mod material;
pub mod nanowire;
pub mod setup;
pub mod sim;

pub use control::{
    CancelFlag, Deadline, IterationLimit, LogProgress, Never, NoProgress, ProgressObserver,
    StopCondition,
};
pub use curve::{CurrentCurve, ResponseFit};
pub use distribution::{sample_speed_distribution, SpeedDistribution};
pub use environment::EnvironmentParameters;
pub use material::Material;
pub use nanowire::NanowireGeometry;
pub use setup::SimulationSetup;
pub use sim::{RunOutcome, Simulation};
