use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::core::{
    EnvironmentParameters, IterationLimit, NanowireGeometry, NoProgress, RunOutcome, Simulation,
    SimulationSetup,
};

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Python-facing wrapper around the nanowire sensor simulation.
///
/// API:
/// - __new__(width, length, n_x, n_y, surface_carrier_density, concentration,
///           temperature, pressure, max_distance, active_molar_mass,
///           passive_molar_mass, seed=None)
/// - from_json(setup) -> SensorSim
/// - run(target_active_ratio, max_iterations=None) -> bool (converged)
/// - step()
/// - get_state(), get_times() -> np.ndarray, shape (n_x, n_y)
/// - current_vs_time() -> np.ndarray, shape (2, M): [times, currents]
#[pyclass]
pub struct SensorSim {
    sim: Simulation,
}

#[pymethods]
impl SensorSim {
    /// Errors: raises ValueError on invalid parameters.
    #[new]
    #[pyo3(signature = (
        width, length, n_x, n_y, surface_carrier_density, concentration,
        temperature, pressure, max_distance, active_molar_mass, passive_molar_mass,
        seed=None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        width: f64,
        length: f64,
        n_x: usize,
        n_y: usize,
        surface_carrier_density: f64,
        concentration: f64,
        temperature: f64,
        pressure: f64,
        max_distance: f64,
        active_molar_mass: f64,
        passive_molar_mass: f64,
        seed: Option<u64>,
    ) -> PyResult<Self> {
        let geometry = NanowireGeometry::new(width, length, n_x, n_y, surface_carrier_density)
            .map_err(py_err)?;
        let environment = EnvironmentParameters::new(
            concentration,
            temperature,
            pressure,
            max_distance,
            active_molar_mass,
            passive_molar_mass,
        )
        .map_err(py_err)?;
        let sim = Simulation::new(geometry, environment, seed).map_err(py_err)?;
        Ok(Self { sim })
    }

    /// Build from a JSON setup document (materials, container, seed).
    #[staticmethod]
    fn from_json(setup: &str) -> PyResult<Self> {
        let sim = SimulationSetup::from_json(setup)
            .and_then(|s| s.build())
            .map_err(py_err)?;
        Ok(Self { sim })
    }

    /// Run until the active cell ratio drops below the target (releases the GIL).
    ///
    /// Returns False if `max_iterations` was reached first.
    #[pyo3(signature = (target_active_ratio, max_iterations=None))]
    fn run(
        &mut self,
        py: Python<'_>,
        target_active_ratio: f64,
        max_iterations: Option<u64>,
    ) -> PyResult<bool> {
        let sim = &mut self.sim;
        let limit = IterationLimit(max_iterations.unwrap_or(u64::MAX));
        let outcome: RunOutcome = py
            .detach(|| sim.run_with(target_active_ratio, &mut NoProgress, &limit))
            .map_err(py_err)?;
        Ok(outcome.is_converged())
    }

    /// Advance a single iteration.
    fn step(&mut self) {
        self.sim.step();
    }

    #[getter]
    fn iterations(&self) -> u64 {
        self.sim.iterations()
    }

    #[getter]
    fn active_cell_ratio(&self) -> f64 {
        self.sim.active_cell_ratio()
    }

    #[getter]
    fn simulation_time(&self) -> f64 {
        self.sim.simulation_time()
    }

    #[getter]
    fn maximum_current(&self) -> f64 {
        self.sim.maximum_current()
    }

    fn is_converged(&self, target_active_ratio: f64) -> bool {
        self.sim.is_converged(target_active_ratio)
    }

    /// Return the per-cell activity grid, dtype=bool.
    fn get_state<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray2<bool>>> {
        let pyarr = self.sim.state().clone().into_pyarray(py);
        Ok(pyarr.to_owned().into())
    }

    /// Return the per-cell accrued time grid, dtype=float64.
    fn get_times<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray2<f64>>> {
        let pyarr = self.sim.times().clone().into_pyarray(py);
        Ok(pyarr.to_owned().into())
    }

    /// Return a (2, M) array of [times, currents].
    fn current_vs_time<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray2<f64>>> {
        let curve = self.sim.current_vs_time().map_err(py_err)?;
        let m = curve.len();
        let mut arr = Array2::<f64>::zeros((2, m));
        for (i, (t, current)) in curve.iter().enumerate() {
            arr[[0, i]] = t;
            arr[[1, i]] = current;
        }
        Ok(arr.into_pyarray(py).to_owned().into())
    }

    /// Return (a, b) of the fitted response law I = a (1 - exp(-t/b)).
    fn response_fit(&self) -> PyResult<(f64, f64)> {
        let fit = self.sim.response_fit().map_err(py_err)?;
        Ok((fit.amplitude(), fit.time_constant()))
    }

    fn __repr__(&self) -> String {
        self.sim.to_string()
    }
}

/// The nanosense Python module entry point.
#[pymodule]
fn nanosense(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<SensorSim>()?;
    Ok(())
}
