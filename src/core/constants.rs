//! Physical constants used by the simulation (SI units).

/// Universal gas constant, J/(mol·K).
pub const GAS_CONSTANT: f64 = 8.314;

/// Avogadro's number, 1/mol.
pub const AVOGADRO: f64 = 6.0221409e23;

/// Boltzmann constant, J/K.
pub const BOLTZMANN: f64 = 1.380649e-23;

/// Elementary charge, C.
pub const ELECTRON_CHARGE: f64 = 1.6021e-19;
