use crate::core::constants::ELECTRON_CHARGE;
use crate::error::{Error, Result};
use ndarray::{Array2, Zip};
use ordered_float::NotNan;

/// Simulated sensor current as a function of elapsed time.
///
/// `times` and `currents` are parallel, with `times` strictly increasing and
/// `currents` non-decreasing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrentCurve {
    pub times: Vec<f64>,
    pub currents: Vec<f64>,
}

impl CurrentCurve {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Final `(time, current)` point.
    pub fn last(&self) -> Option<(f64, f64)> {
        self.times.last().copied().zip(self.currents.last().copied())
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.currents.iter().copied())
    }

    /// Keep roughly `points` evenly strided samples, always starting at the
    /// first point.
    pub fn downsample(&self, points: usize) -> CurrentCurve {
        let stride = (self.len() / points.max(1)).max(1);
        let (times, currents) = self.iter().step_by(stride).unzip();
        CurrentCurve { times, currents }
    }
}

/// Build the current/time curve from the final per-cell grids.
///
/// Thresholds are the distinct values of `times`. At threshold `t` the
/// deactivated count is the number of cells that are inactive and whose
/// recorded time is `≤ t`; cells still active never count.
pub fn current_vs_time(
    state: &Array2<bool>,
    times: &Array2<f64>,
    cell_carrier_count: u64,
) -> Result<CurrentCurve> {
    let mut thresholds = Vec::with_capacity(times.len());
    let mut deactivated = Vec::new();
    let mut failed = None;
    Zip::from(state).and(times).for_each(|&active, &t| match NotNan::new(t) {
        Ok(t) => {
            thresholds.push(t);
            if !active {
                deactivated.push(t);
            }
        }
        Err(_) => failed = Some(Error::MathError("cell time is NaN".into())),
    });
    if let Some(e) = failed {
        return Err(e);
    }
    thresholds.sort_unstable();
    thresholds.dedup();
    deactivated.sort_unstable();

    let per_cell = ELECTRON_CHARGE * cell_carrier_count as f64;
    let mut curve = CurrentCurve {
        times: Vec::with_capacity(thresholds.len()),
        currents: Vec::with_capacity(thresholds.len()),
    };
    for t in thresholds {
        let count = deactivated.partition_point(|&d| d <= t);
        curve.times.push(t.into_inner());
        curve.currents.push(count as f64 * per_cell);
    }
    Ok(curve)
}

/// Fit of the empirical response law `I(t) = a (1 − e^(−t/b))`.
///
/// `a` is the maximum current of the sensor and the rate `1/b` is chosen so
/// the law passes through the final curve point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseFit {
    amplitude: f64,
    rate: f64,
}

impl ResponseFit {
    /// Errors:
    /// - `Error::InvalidParam` if the curve is empty, its final time is not
    ///   positive, or its final current is not below `maximum_current`.
    pub fn from_curve(curve: &CurrentCurve, maximum_current: f64) -> Result<Self> {
        let Some((t, i)) = curve.last() else {
            return Err(Error::InvalidParam("cannot fit an empty curve".into()));
        };
        if !maximum_current.is_finite() || maximum_current <= 0.0 {
            return Err(Error::InvalidParam(
                "maximum_current must be finite and > 0".into(),
            ));
        }
        if t <= 0.0 {
            return Err(Error::InvalidParam(format!(
                "final curve time must be > 0, got {t}"
            )));
        }
        if i >= maximum_current {
            return Err(Error::InvalidParam(format!(
                "final current {i:e} reaches the maximum current {maximum_current:e}"
            )));
        }
        let rate = -((maximum_current - i) / maximum_current).ln() / t;
        Ok(Self {
            amplitude: maximum_current,
            rate,
        })
    }

    /// `a`, the saturation current.
    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// `1/b`, per second.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// `b`, the response time constant in seconds.
    pub fn time_constant(&self) -> f64 {
        1.0 / self.rate
    }

    /// Current predicted at time `t`.
    pub fn current_at(&self, t: f64) -> f64 {
        self.amplitude * (1.0 - (-self.rate * t).exp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn active_cells_never_count() -> Result<()> {
        let state = array![[false, true], [false, true]];
        let times = array![[2.0, 1.0], [3.0, 5.0]];
        let curve = current_vs_time(&state, &times, 1)?;
        assert_eq!(curve.times, vec![1.0, 2.0, 3.0, 5.0]);
        let counts: Vec<f64> = curve.currents.iter().map(|c| c / ELECTRON_CHARGE).collect();
        assert_relative_eq!(counts[0], 0.0);
        assert_relative_eq!(counts[1], 1.0, max_relative = 1e-12);
        assert_relative_eq!(counts[2], 2.0, max_relative = 1e-12);
        assert_relative_eq!(counts[3], 2.0, max_relative = 1e-12);
        Ok(())
    }

    #[test]
    fn duplicate_times_collapse() -> Result<()> {
        let state = array![[false, false, false]];
        let times = array![[1.0, 1.0, 4.0]];
        let curve = current_vs_time(&state, &times, 10)?;
        assert_eq!(curve.len(), 2);
        assert_relative_eq!(curve.currents[0], 20.0 * ELECTRON_CHARGE, max_relative = 1e-12);
        assert_relative_eq!(curve.currents[1], 30.0 * ELECTRON_CHARGE, max_relative = 1e-12);
        Ok(())
    }

    #[test]
    fn nan_time_is_an_error() {
        let state = array![[false]];
        let times = array![[f64::NAN]];
        assert!(current_vs_time(&state, &times, 1).is_err());
    }

    #[test]
    fn downsample_strides() {
        let curve = CurrentCurve {
            times: (0..10).map(f64::from).collect(),
            currents: (0..10).map(f64::from).collect(),
        };
        let small = curve.downsample(5);
        assert_eq!(small.times, vec![0.0, 2.0, 4.0, 6.0, 8.0]);
        assert_eq!(curve.downsample(100).len(), 10);
    }

    #[test]
    fn fit_passes_through_last_point() -> Result<()> {
        let curve = CurrentCurve {
            times: vec![1.0, 2.0],
            currents: vec![0.2, 0.5],
        };
        let fit = ResponseFit::from_curve(&curve, 1.0)?;
        assert_relative_eq!(fit.current_at(2.0), 0.5, max_relative = 1e-12);
        assert_relative_eq!(fit.time_constant(), 2.0 / 2f64.ln(), max_relative = 1e-12);
        assert_eq!(fit.current_at(0.0), 0.0);
        Ok(())
    }

    #[test]
    fn fit_rejects_saturated_or_empty_curves() {
        assert!(ResponseFit::from_curve(&CurrentCurve::default(), 1.0).is_err());
        let saturated = CurrentCurve {
            times: vec![1.0],
            currents: vec![1.0],
        };
        let err = ResponseFit::from_curve(&saturated, 1.0).unwrap_err();
        assert!(err.to_string().contains("maximum current"));
    }
}
