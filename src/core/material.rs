use crate::core::constants::AVOGADRO;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A substance described by its solid-state density and molar mass.
///
/// Gases are described by their solid-state density too; only the packing of
/// molecules matters for the derived molecular diameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Display name.
    pub name: String,
    /// Solid-state density, kg/m³ (> 0).
    pub density: f64,
    /// Molar mass, kg/mol (> 0).
    pub molar_mass: f64,
}

impl Material {
    /// Create a new material after validating invariants.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `density` or `molar_mass` is non-positive or non-finite.
    pub fn new(name: impl Into<String>, density: f64, molar_mass: f64) -> Result<Self> {
        if !density.is_finite() || density <= 0.0 {
            return Err(Error::InvalidParam("density must be finite and > 0".into()));
        }
        if !molar_mass.is_finite() || molar_mass <= 0.0 {
            return Err(Error::InvalidParam(
                "molar_mass must be finite and > 0".into(),
            ));
        }
        Ok(Self {
            name: name.into(),
            density,
            molar_mass,
        })
    }

    /// Diameter of one molecule, assuming spheres filling the solid volume.
    pub fn molecular_diameter(&self) -> f64 {
        molecular_diameter(self.density, self.molar_mass)
    }

    /// Hydrogen (solid state).
    pub fn h2() -> Self {
        Self::preset("H2", 86.0, 2.01588e-3)
    }

    /// Titanium dioxide, rutile phase.
    pub fn tio2_rutile() -> Self {
        Self::preset("TiO2 Rutile", 4.23e3, 79.866e-3)
    }

    /// Titanium dioxide, anatase phase.
    pub fn tio2_anatase() -> Self {
        Self::preset("TiO2 Anatase", 3.78e3, 79.866e-3)
    }

    /// Nitrogen (solid state).
    pub fn n2() -> Self {
        Self::preset("N2", 1026.5, 28.0134e-3)
    }

    /// Oxygen (solid state).
    pub fn o2() -> Self {
        Self::preset("O2", 687.5, 32e-3)
    }

    /// Argon (solid state).
    pub fn ar() -> Self {
        Self::preset("Ar", 1616.0, 39.948e-3)
    }

    /// Dry air as a 78/21/1 mix of N2, O2 and Ar.
    pub fn air() -> Self {
        let (n2, o2, ar) = (Self::n2(), Self::o2(), Self::ar());
        Self::preset(
            "Air",
            0.78 * n2.density + 0.21 * o2.density + 0.01 * ar.density,
            0.78 * n2.molar_mass + 0.21 * o2.molar_mass + 0.01 * ar.molar_mass,
        )
    }

    fn preset(name: &str, density: f64, molar_mass: f64) -> Self {
        Self {
            name: name.to_string(),
            density,
            molar_mass,
        }
    }
}

/// Molecular diameter from solid-state density and molar mass:
/// `d = (6 V / π)^(1/3)` with `V = 1 / (ρ / M · N_A)` the volume per molecule.
pub fn molecular_diameter(density: f64, molar_mass: f64) -> f64 {
    let particles_per_m3 = density / molar_mass * AVOGADRO;
    let particle_volume = 1.0 / particles_per_m3;
    (6.0 * particle_volume / PI).cbrt()
}
