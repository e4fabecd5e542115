use crate::core::environment::EnvironmentParameters;
use crate::core::material::Material;
use crate::core::nanowire::NanowireGeometry;
use crate::core::sim::Simulation;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Every scalar needed to build a sensor simulation, as one flat record.
///
/// Deserializable from JSON so a parameter file can drive a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSetup {
    pub nanowire_width: f64,
    pub nanowire_length: f64,
    pub n_x: usize,
    pub n_y: usize,
    pub nanowire_material: Material,
    pub temperature: f64,
    pub pressure: f64,
    pub container_volume: f64,
    pub concentration: f64,
    pub max_distance: f64,
    pub active_gas: Material,
    pub passive_gas: Material,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SimulationSetup {
    /// Parse a setup from JSON.
    ///
    /// Errors: `Error::Config` on malformed JSON or missing fields.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn geometry(&self) -> Result<NanowireGeometry> {
        NanowireGeometry::from_material(
            self.nanowire_width,
            self.nanowire_length,
            self.n_x,
            self.n_y,
            &self.nanowire_material,
        )
    }

    pub fn environment(&self) -> Result<EnvironmentParameters> {
        EnvironmentParameters::from_gases(
            self.concentration,
            self.temperature,
            self.pressure,
            self.max_distance,
            self.container_volume,
            &self.active_gas,
            &self.passive_gas,
        )
    }

    /// Validate everything and build a ready-to-run simulation.
    pub fn build(&self) -> Result<Simulation> {
        Simulation::new(self.geometry()?, self.environment()?, self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const SETUP: &str = r#"{
        "nanowire_width": 5e-6,
        "nanowire_length": 5e-3,
        "n_x": 10,
        "n_y": 10,
        "nanowire_material": {"name": "TiO2 Rutile", "density": 4230.0, "molar_mass": 0.079866},
        "temperature": 300.0,
        "pressure": 101325.0,
        "container_volume": 1e-3,
        "concentration": 0.01,
        "max_distance": 1e-6,
        "active_gas": {"name": "H2", "density": 86.0, "molar_mass": 0.00201588},
        "passive_gas": {"name": "N2", "density": 1026.5, "molar_mass": 0.0280134},
        "seed": 42
    }"#;

    #[test]
    fn setup_from_json_builds() -> Result<()> {
        let setup = SimulationSetup::from_json(SETUP)?;
        assert_eq!(setup.seed, Some(42));
        assert_eq!(setup.nanowire_material, Material::tio2_rutile());
        let sim = setup.build()?;
        assert_eq!(sim.geometry().total_cells(), 100);
        assert_eq!(sim.geometry().material(), Some("TiO2 Rutile"));
        assert_eq!(sim.environment().active_gas(), Some(&Material::h2()));
        Ok(())
    }

    #[test]
    fn seed_is_optional() -> Result<()> {
        let mut value: serde_json::Value = serde_json::from_str(SETUP)?;
        if let Some(obj) = value.as_object_mut() {
            obj.remove("seed");
        }
        let setup: SimulationSetup = serde_json::from_value(value)?;
        assert_eq!(setup.seed, None);
        Ok(())
    }

    #[test]
    fn malformed_setup_is_config_error() {
        let err = SimulationSetup::from_json("{\"n_x\": 3}").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn invalid_values_fail_at_build() -> Result<()> {
        let mut setup = SimulationSetup::from_json(SETUP)?;
        setup.concentration = 2.0;
        let err = setup.build().unwrap_err();
        assert!(err.to_string().contains("concentration"));
        Ok(())
    }
}
