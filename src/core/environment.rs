use crate::core::constants::{AVOGADRO, GAS_CONSTANT};
use crate::core::material::Material;
use crate::error::{Error, Result};
use std::fmt;

/// Ambient binary gas mixture around the sensor.
///
/// The "active" gas is the target species that deactivates a cell on
/// arrival; the "passive" gas is the background carrier.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentParameters {
    concentration: f64,
    temperature: f64,
    pressure: f64,
    max_distance: f64,
    active_molar_mass: f64,
    passive_molar_mass: f64,
    container_volume: Option<f64>,
    active_gas: Option<Material>,
    passive_gas: Option<Material>,
}

impl EnvironmentParameters {
    /// Create environment parameters after validating invariants.
    ///
    /// Parameters
    /// - concentration: probability of the active gas occupying a cell, in [0, 1]
    /// - temperature: K (> 0)
    /// - pressure: Pa (> 0)
    /// - max_distance: upper bound of the per-step travel distance, m (> 0)
    /// - active_molar_mass, passive_molar_mass: kg/mol (> 0)
    ///
    /// Errors: `Error::InvalidParam` naming the first offending argument.
    pub fn new(
        concentration: f64,
        temperature: f64,
        pressure: f64,
        max_distance: f64,
        active_molar_mass: f64,
        passive_molar_mass: f64,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&concentration) {
            return Err(Error::InvalidParam(format!(
                "concentration must lie in [0, 1], got {concentration}"
            )));
        }
        require_positive("temperature", temperature)?;
        require_positive("pressure", pressure)?;
        require_positive("max_distance", max_distance)?;
        require_positive("active_molar_mass", active_molar_mass)?;
        require_positive("passive_molar_mass", passive_molar_mass)?;
        Ok(Self {
            concentration,
            temperature,
            pressure,
            max_distance,
            active_molar_mass,
            passive_molar_mass,
            container_volume: None,
            active_gas: None,
            passive_gas: None,
        })
    }

    /// Create environment parameters for two named gases held in a container
    /// of `container_volume` m³.
    pub fn from_gases(
        concentration: f64,
        temperature: f64,
        pressure: f64,
        max_distance: f64,
        container_volume: f64,
        active_gas: &Material,
        passive_gas: &Material,
    ) -> Result<Self> {
        let mut env = Self::new(
            concentration,
            temperature,
            pressure,
            max_distance,
            active_gas.molar_mass,
            passive_gas.molar_mass,
        )?
        .with_container_volume(container_volume)?;
        env.active_gas = Some(active_gas.clone());
        env.passive_gas = Some(passive_gas.clone());
        Ok(env)
    }

    /// Attach a container volume (m³, > 0), enabling the gas quantity estimates.
    pub fn with_container_volume(mut self, container_volume: f64) -> Result<Self> {
        require_positive("container_volume", container_volume)?;
        self.container_volume = Some(container_volume);
        Ok(self)
    }

    pub fn concentration(&self) -> f64 {
        self.concentration
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    pub fn active_molar_mass(&self) -> f64 {
        self.active_molar_mass
    }

    pub fn passive_molar_mass(&self) -> f64 {
        self.passive_molar_mass
    }

    pub fn container_volume(&self) -> Option<f64> {
        self.container_volume
    }

    pub fn active_gas(&self) -> Option<&Material> {
        self.active_gas.as_ref()
    }

    pub fn passive_gas(&self) -> Option<&Material> {
        self.passive_gas.as_ref()
    }

    /// Molecules in the container from the ideal gas law, `N_A·P·V / (R·T)`.
    pub fn passive_gas_quantity(&self) -> Option<f64> {
        self.container_volume
            .map(|v| AVOGADRO * self.pressure * v / (GAS_CONSTANT * self.temperature))
    }

    /// Target-gas molecules in the container.
    pub fn active_gas_quantity(&self) -> Option<f64> {
        self.passive_gas_quantity().map(|n| n * self.concentration)
    }
}

impl fmt::Display for EnvironmentParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(gas) = &self.active_gas {
            writeln!(f, "{:<30}{}", "Active Gas", gas.name)?;
        }
        if let Some(gas) = &self.passive_gas {
            writeln!(f, "{:<30}{}", "Passive Gas", gas.name)?;
        }
        writeln!(f, "{:<30}{}", "Active Gas Concentration", self.concentration)?;
        writeln!(f, "{:<30}{}", "Container Pressure [Pa]", self.pressure)?;
        writeln!(f, "{:<30}{}", "Container Temperature [K]", self.temperature)?;
        if let Some(v) = self.container_volume {
            writeln!(f, "{:<30}{:e}", "Container Volume [m^3]", v)?;
        }
        if let (Some(active), Some(passive)) = (&self.active_gas, &self.passive_gas) {
            writeln!(
                f,
                "{:<30}{:e}",
                "Active Gas Diameter [m]",
                active.molecular_diameter()
            )?;
            writeln!(
                f,
                "{:<30}{:e}",
                "Passive Gas Diameter [m]",
                passive.molecular_diameter()
            )?;
        }
        if let (Some(active), Some(passive)) =
            (self.active_gas_quantity(), self.passive_gas_quantity())
        {
            writeln!(f, "{:<30}{:e}", "Active Gas Quantity", active)?;
            writeln!(f, "{:<30}{:e}", "Passive Gas Quantity", passive)?;
        }
        write!(f, "{:<30}{:e}", "Max Distance [m]", self.max_distance)
    }
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidParam(format!(
            "{name} must be finite and > 0, got {value}"
        )));
    }
    Ok(())
}
