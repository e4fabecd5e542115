use crate::core::control::{Never, NoProgress, ProgressObserver, StopCondition};
use crate::core::curve::{self, CurrentCurve, ResponseFit};
use crate::core::distribution::{sample_speed_distribution, SpeedDistribution};
use crate::core::environment::EnvironmentParameters;
use crate::core::nanowire::NanowireGeometry;
use crate::error::{Error, Result};
use ndarray::{Array2, Zip};
use rand::{rng, rngs::StdRng, Rng, SeedableRng};
use std::fmt;
use std::sync::Arc;

/// Floor for drawn speeds (m/s) so a transit time is always finite.
const MIN_SPEED: f64 = 1e-12;

/// How a call to [`Simulation::run_with`] ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunOutcome {
    /// The active cell ratio dropped below the target.
    Converged { iterations: u64 },
    /// The stop condition fired before convergence.
    Stopped {
        iterations: u64,
        active_cell_ratio: f64,
    },
}

impl RunOutcome {
    pub fn is_converged(&self) -> bool {
        matches!(self, RunOutcome::Converged { .. })
    }

    pub fn iterations(&self) -> u64 {
        match *self {
            RunOutcome::Converged { iterations } | RunOutcome::Stopped { iterations, .. } => {
                iterations
            }
        }
    }
}

/// Stochastic cellular simulation of a nanowire sensor surface.
///
/// Each grid cell starts active and accrues transit time until a target-gas
/// molecule lands on it, at which point it deactivates and its time freezes.
/// All random draws come from one seeded stream in a fixed order, so a given
/// seed reproduces the grids exactly.
#[derive(Debug)]
pub struct Simulation {
    geometry: Arc<NanowireGeometry>,
    environment: Arc<EnvironmentParameters>,
    state: Array2<bool>,
    times: Array2<f64>,
    iterations: u64,
    simulation_time: f64,
    active_speeds: SpeedDistribution,
    passive_speeds: SpeedDistribution,
    rng: StdRng,
}

impl Simulation {
    /// Create a simulation with every cell active and zero accrued time.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if the environment carries a container volume
    ///   holding fewer target-gas molecules than the surface has carriers.
    /// - any error building the speed distributions.
    pub fn new(
        geometry: impl Into<Arc<NanowireGeometry>>,
        environment: impl Into<Arc<EnvironmentParameters>>,
        seed: Option<u64>,
    ) -> Result<Self> {
        let geometry = geometry.into();
        let environment = environment.into();

        if let Some(active) = environment.active_gas_quantity() {
            let ratio = active / geometry.carriers_quantity();
            if ratio < 1.0 {
                return Err(Error::InvalidParam(format!(
                    "active gas shortage: {ratio:.3e} target molecules per surface carrier; check input parameters"
                )));
            }
        }

        let active_speeds =
            sample_speed_distribution(environment.temperature(), environment.active_molar_mass())?;
        let passive_speeds = sample_speed_distribution(
            environment.temperature(),
            environment.passive_molar_mass(),
        )?;

        let rng: StdRng = match seed {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };

        let shape = geometry.grid_shape();
        Ok(Self {
            geometry,
            environment,
            state: Array2::from_elem(shape, true),
            times: Array2::zeros(shape),
            iterations: 0,
            simulation_time: 0.0,
            active_speeds,
            passive_speeds,
            rng,
        })
    }

    pub fn geometry(&self) -> &NanowireGeometry {
        &self.geometry
    }

    pub fn environment(&self) -> &EnvironmentParameters {
        &self.environment
    }

    /// Per-cell activity: `true` while the cell has not yet met the target gas.
    pub fn state(&self) -> &Array2<bool> {
        &self.state
    }

    /// Per-cell time accrued while active, in seconds.
    pub fn times(&self) -> &Array2<f64> {
        &self.times
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Largest accrued time among deactivated cells (0 before any deactivation).
    pub fn simulation_time(&self) -> f64 {
        self.simulation_time
    }

    pub fn active_cells(&self) -> usize {
        self.state.iter().filter(|&&active| active).count()
    }

    /// Fraction of cells still active, in [0, 1].
    pub fn active_cell_ratio(&self) -> f64 {
        self.active_cells() as f64 / self.geometry.total_cells() as f64
    }

    /// True once the active cell ratio is strictly below `target_active_ratio`.
    pub fn is_converged(&self, target_active_ratio: f64) -> bool {
        self.active_cell_ratio() < target_active_ratio
    }

    pub fn maximum_current(&self) -> f64 {
        self.geometry.maximum_current()
    }

    /// Advance one iteration.
    ///
    /// Every cell draws which gas occupies it; active cells hit by the target
    /// gas deactivate, and the remaining active cells accrue `distance / speed`.
    pub fn step(&mut self) {
        let shape = self.geometry.grid_shape();
        let p_passive = 1.0 - self.environment.concentration();
        let max_distance = self.environment.max_distance();

        // true: passive gas present, false: target gas present
        let mixture = Array2::from_shape_simple_fn(shape, || self.rng.random_bool(p_passive));
        Zip::from(&mut self.state)
            .and(&mixture)
            .for_each(|active, &passive| *active &= passive);

        let active_v = self.active_speeds.draw_speeds(shape, &mut self.rng);
        let passive_v = self.passive_speeds.draw_speeds(shape, &mut self.rng);
        let distance =
            Array2::from_shape_simple_fn(shape, || self.rng.random::<f64>() * max_distance);

        Zip::from(&mut self.times)
            .and(&self.state)
            .and(&mixture)
            .and(&active_v)
            .and(&passive_v)
            .and(&distance)
            .for_each(|t, &active, &passive, &va, &vp, &d| {
                if active {
                    let v = if passive { vp } else { va };
                    *t += d / v.max(MIN_SPEED);
                }
            });

        self.iterations += 1;
        self.simulation_time = Zip::from(&self.times)
            .and(&self.state)
            .fold(0.0, |acc: f64, &t, &active| if active { acc } else { acc.max(t) });

        log::trace!(
            "iteration {} active ratio {:.4} simulation time {:.3e}",
            self.iterations,
            self.active_cell_ratio(),
            self.simulation_time
        );
    }

    /// Iterate until the active cell ratio drops below `target_active_ratio`.
    ///
    /// There is no iteration cap: with a concentration of zero this never
    /// returns. Use [`Simulation::run_with`] to bound the run.
    pub fn run(&mut self, target_active_ratio: f64) -> Result<RunOutcome> {
        self.run_with(target_active_ratio, &mut NoProgress, &Never)
    }

    /// Iterate until converged or until `stop` fires, reporting progress to
    /// `observer` after every iteration.
    ///
    /// `stop` is polled once before each iteration with the number of
    /// iterations completed so far.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `target_active_ratio` is not in (0, 1].
    pub fn run_with<O, S>(
        &mut self,
        target_active_ratio: f64,
        observer: &mut O,
        stop: &S,
    ) -> Result<RunOutcome>
    where
        O: ProgressObserver + ?Sized,
        S: StopCondition + ?Sized,
    {
        if !(target_active_ratio > 0.0 && target_active_ratio <= 1.0) {
            return Err(Error::InvalidParam(format!(
                "target active ratio must lie in (0, 1], got {target_active_ratio}"
            )));
        }

        log::debug!(
            "running {}x{} grid to active ratio < {}",
            self.geometry.n_x(),
            self.geometry.n_y(),
            target_active_ratio
        );
        while !self.is_converged(target_active_ratio) {
            if stop.should_stop(self.iterations) {
                let active_cell_ratio = self.active_cell_ratio();
                log::warn!(
                    "stopped after {} iterations without converging (active ratio {:.4})",
                    self.iterations,
                    active_cell_ratio
                );
                return Ok(RunOutcome::Stopped {
                    iterations: self.iterations,
                    active_cell_ratio,
                });
            }
            self.step();
            observer.on_iteration(self.active_cell_ratio(), self.iterations);
        }

        log::info!(
            "solution converged after {} iterations, simulation time {:.3e} s",
            self.iterations,
            self.simulation_time
        );
        Ok(RunOutcome::Converged {
            iterations: self.iterations,
        })
    }

    /// Current/time curve derived from the present grids.
    pub fn current_vs_time(&self) -> Result<CurrentCurve> {
        curve::current_vs_time(
            &self.state,
            &self.times,
            self.geometry.cell_carrier_count(),
        )
    }

    /// Exponential response law fitted through the final curve point.
    pub fn response_fit(&self) -> Result<ResponseFit> {
        ResponseFit::from_curve(&self.current_vs_time()?, self.maximum_current())
    }
}

impl fmt::Display for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.geometry)?;
        writeln!(f, "{}", self.environment)?;
        writeln!(f, "{:<30}{}", "Iteration Number", self.iterations)?;
        write!(f, "{:<30}{}", "Active Cells Ratio", self.active_cell_ratio())
    }
}
