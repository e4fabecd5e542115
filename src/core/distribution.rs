use crate::core::constants::{AVOGADRO, BOLTZMANN, GAS_CONSTANT};
use crate::error::{Error, Result};
use ndarray::Array2;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;
use std::f64::consts::PI;

/// Number of speed bins in the discretized distribution.
pub const SPEED_BINS: usize = 100;

/// Upper bound of the speed domain, in multiples of the mean thermal speed.
pub const SPEED_DOMAIN_FACTOR: f64 = 3.0;

/// Maxwell–Boltzmann speed density `f(v)` for a molecule of mass `molecule_mass` (kg).
pub fn maxwell_boltzmann_density(speed: f64, temperature: f64, molecule_mass: f64) -> f64 {
    let kt = BOLTZMANN * temperature;
    let shell = 4.0 * PI * speed * speed;
    let norm = (molecule_mass / (2.0 * PI * kt)).powf(1.5);
    let boltz = (-molecule_mass * speed * speed / (2.0 * kt)).exp();
    shell * norm * boltz
}

/// Discretized Maxwell–Boltzmann speed distribution.
///
/// `speeds` are 100 evenly spaced points on `[0, 3·sqrt(2RT/M)]` and
/// `probabilities` the density at each point normalised by the sum. This is a
/// probability mass function over the bins, used for sampling only.
#[derive(Debug, Clone)]
pub struct SpeedDistribution {
    speeds: Vec<f64>,
    probabilities: Vec<f64>,
    sampler: WeightedIndex<f64>,
}

impl SpeedDistribution {
    /// Bin speeds, m/s, strictly increasing and starting at 0.
    pub fn speeds(&self) -> &[f64] {
        &self.speeds
    }

    /// Bin probabilities, summing to 1.
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Draw one speed.
    ///
    /// Bins with zero probability (the `v = 0` bin) are never selected.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.speeds[self.sampler.sample(rng)]
    }

    /// Draw an independent speed for every cell of a grid of shape `shape`.
    pub fn draw_speeds<R: Rng + ?Sized>(&self, shape: (usize, usize), rng: &mut R) -> Array2<f64> {
        Array2::from_shape_simple_fn(shape, || self.draw(rng))
    }

    /// Expected speed of the discretized distribution.
    pub fn mean(&self) -> f64 {
        self.speeds
            .iter()
            .zip(&self.probabilities)
            .map(|(v, p)| v * p)
            .sum()
    }
}

/// Build the 100-bin speed distribution for a gas at `temperature` (K) with
/// molar mass `molar_mass` (kg/mol).
///
/// Errors:
/// - `Error::InvalidParam` if either argument is non-positive or non-finite.
/// - `Error::MathError` if the densities cannot be normalised.
pub fn sample_speed_distribution(temperature: f64, molar_mass: f64) -> Result<SpeedDistribution> {
    if !temperature.is_finite() || temperature <= 0.0 {
        return Err(Error::InvalidParam(
            "temperature must be finite and > 0".into(),
        ));
    }
    if !molar_mass.is_finite() || molar_mass <= 0.0 {
        return Err(Error::InvalidParam(
            "molar_mass must be finite and > 0".into(),
        ));
    }

    let molecule_mass = molar_mass / AVOGADRO;
    let mean = (2.0 * GAS_CONSTANT * temperature / molar_mass).sqrt();
    let upper = SPEED_DOMAIN_FACTOR * mean;
    let step = upper / (SPEED_BINS - 1) as f64;

    let speeds: Vec<f64> = (0..SPEED_BINS).map(|i| i as f64 * step).collect();
    let densities: Vec<f64> = speeds
        .iter()
        .map(|&v| maxwell_boltzmann_density(v, temperature, molecule_mass))
        .collect();

    let total: f64 = densities.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(Error::MathError(format!(
            "speed density sum {total} cannot be normalised (T={temperature}, M={molar_mass})"
        )));
    }
    let probabilities: Vec<f64> = densities.iter().map(|d| d / total).collect();
    let sampler = WeightedIndex::new(&probabilities)
        .map_err(|e| Error::MathError(format!("invalid speed weights: {e}")))?;

    Ok(SpeedDistribution {
        speeds,
        probabilities,
        sampler,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn hundred_bins_normalised() -> Result<()> {
        let dist = sample_speed_distribution(300.0, 28.0134e-3)?;
        assert_eq!(dist.speeds().len(), SPEED_BINS);
        assert_eq!(dist.probabilities().len(), SPEED_BINS);
        let sum: f64 = dist.probabilities().iter().sum();
        assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn speeds_strictly_increasing_from_zero() -> Result<()> {
        let dist = sample_speed_distribution(300.0, 2.01588e-3)?;
        assert_eq!(dist.speeds()[0], 0.0);
        assert!(dist.speeds().windows(2).all(|w| w[0] < w[1]));
        assert!(dist.probabilities().iter().all(|&p| p >= 0.0));
        Ok(())
    }

    #[test]
    fn domain_ends_at_three_mean_speeds() -> Result<()> {
        let (t, m) = (350.0, 32e-3);
        let dist = sample_speed_distribution(t, m)?;
        let mean = (2.0 * GAS_CONSTANT * t / m).sqrt();
        let last = dist.speeds()[SPEED_BINS - 1];
        assert_abs_diff_eq!(last, 3.0 * mean, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn zero_speed_bin_never_drawn() -> Result<()> {
        let dist = sample_speed_distribution(300.0, 28.0134e-3)?;
        assert_eq!(dist.probabilities()[0], 0.0);
        let mut rng = StdRng::seed_from_u64(11);
        let grid = dist.draw_speeds((50, 40), &mut rng);
        assert_eq!(grid.dim(), (50, 40));
        assert!(grid.iter().all(|&v| v > 0.0));
        Ok(())
    }

    #[test]
    fn lighter_gas_is_faster() -> Result<()> {
        let h2 = sample_speed_distribution(300.0, 2.01588e-3)?;
        let n2 = sample_speed_distribution(300.0, 28.0134e-3)?;
        assert!(h2.mean() > n2.mean());
        Ok(())
    }

    #[test]
    fn invalid_inputs_rejected() {
        assert!(sample_speed_distribution(0.0, 1.0).is_err());
        assert!(sample_speed_distribution(-5.0, 1.0).is_err());
        assert!(sample_speed_distribution(300.0, 0.0).is_err());
        let err = sample_speed_distribution(300.0, f64::INFINITY).unwrap_err();
        assert!(err.to_string().contains("molar_mass"));
    }
}
