use crate::core::constants::ELECTRON_CHARGE;
use crate::core::material::Material;
use crate::error::{Error, Result};
use std::f64::consts::PI;
use std::fmt;

/// Sensing surface of the nanowire, discretized into an `n_x × n_y` grid.
///
/// Fields:
/// - `width`, `length`: physical dimensions of the sensing surface (m, > 0)
/// - `n_x`, `n_y`: grid resolution (≥ 1)
/// - `surface_carrier_density`: charge carriers per m² (> 0)
/// - `material`: sensing material name, when built from a `Material`
#[derive(Debug, Clone, PartialEq)]
pub struct NanowireGeometry {
    width: f64,
    length: f64,
    n_x: usize,
    n_y: usize,
    surface_carrier_density: f64,
    material: Option<String>,
}

impl NanowireGeometry {
    /// Create a geometry after validating invariants.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if a dimension or the density is non-positive or non-finite,
    ///   or either grid resolution is zero.
    pub fn new(
        width: f64,
        length: f64,
        n_x: usize,
        n_y: usize,
        surface_carrier_density: f64,
    ) -> Result<Self> {
        if !width.is_finite() || width <= 0.0 {
            return Err(Error::InvalidParam("width must be finite and > 0".into()));
        }
        if !length.is_finite() || length <= 0.0 {
            return Err(Error::InvalidParam("length must be finite and > 0".into()));
        }
        if n_x == 0 || n_y == 0 {
            return Err(Error::InvalidParam(format!(
                "grid resolution must be at least 1x1, got {n_x}x{n_y}"
            )));
        }
        if !surface_carrier_density.is_finite() || surface_carrier_density <= 0.0 {
            return Err(Error::InvalidParam(
                "surface_carrier_density must be finite and > 0".into(),
            ));
        }
        Ok(Self {
            width,
            length,
            n_x,
            n_y,
            surface_carrier_density,
            material: None,
        })
    }

    /// Create a geometry whose carrier density is one carrier per molecular
    /// cross-section of `material`.
    pub fn from_material(
        width: f64,
        length: f64,
        n_x: usize,
        n_y: usize,
        material: &Material,
    ) -> Result<Self> {
        let mut geometry = Self::new(
            width,
            length,
            n_x,
            n_y,
            surface_carrier_density(material),
        )?;
        geometry.material = Some(material.name.clone());
        Ok(geometry)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn n_x(&self) -> usize {
        self.n_x
    }

    pub fn n_y(&self) -> usize {
        self.n_y
    }

    pub fn surface_carrier_density(&self) -> f64 {
        self.surface_carrier_density
    }

    /// Sensing material name, if the geometry was built from a `Material`.
    pub fn material(&self) -> Option<&str> {
        self.material.as_deref()
    }

    /// Shape shared by every per-cell grid: `(n_x, n_y)`.
    pub fn grid_shape(&self) -> (usize, usize) {
        (self.n_x, self.n_y)
    }

    /// Total number of grid cells.
    pub fn total_cells(&self) -> usize {
        self.n_x * self.n_y
    }

    /// Number of charge carriers represented by one grid cell (floored).
    pub fn cell_carrier_count(&self) -> u64 {
        let carriers = self.surface_carrier_density * self.width * self.length;
        (carriers / self.total_cells() as f64).floor() as u64
    }

    /// Total number of carriers on the sensing surface (not floored).
    pub fn carriers_quantity(&self) -> f64 {
        self.width * self.length * self.surface_carrier_density
    }

    /// Current drawn when every carrier on the surface is released.
    pub fn maximum_current(&self) -> f64 {
        self.carriers_quantity() * ELECTRON_CHARGE
    }
}

impl fmt::Display for NanowireGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.material {
            writeln!(f, "{:<30}{}", "Sensing Material", name)?;
        }
        writeln!(f, "{:<30}{:e}", "Nanowire Width [m]", self.width)?;
        writeln!(f, "{:<30}{:e}", "Nanowire Length [m]", self.length)?;
        writeln!(f, "{:<30}{}", "Mesh number in Width", self.n_x)?;
        writeln!(f, "{:<30}{}", "Mesh number in Length", self.n_y)?;
        writeln!(
            f,
            "{:<30}{:e}",
            "Surface Carrier Density", self.surface_carrier_density
        )?;
        write!(f, "{:<30}{:e}", "Carriers Quantity", self.carriers_quantity())
    }
}

/// Carriers per m² for a surface tiled by molecules of `material`: `1 / (π d² / 4)`.
pub fn surface_carrier_density(material: &Material) -> f64 {
    let d = material.molecular_diameter();
    1.0 / (PI * d * d / 4.0)
}
