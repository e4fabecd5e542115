use nanosense::core::{
    EnvironmentParameters, IterationLimit, LogProgress, NanowireGeometry, RunOutcome, Simulation,
};

fn build(
    n_x: usize,
    n_y: usize,
    concentration: f64,
    seed: u64,
) -> nanosense::error::Result<Simulation> {
    let geometry = NanowireGeometry::new(5e-6, 5e-3, n_x, n_y, 1.0 / 34.1e-20)?;
    let environment =
        EnvironmentParameters::new(concentration, 300.0, 101_325.0, 1e-6, 2.01588e-3, 28.0134e-3)?;
    Simulation::new(geometry, environment, Some(seed))
}

/// With the target gas always present every cell deactivates on the first iteration.
#[test]
fn full_concentration_deactivates_everything_at_once() -> nanosense::error::Result<()> {
    let mut sim = build(2, 2, 1.0, 17)?;
    let outcome = sim.run(0.5)?;
    assert_eq!(outcome, RunOutcome::Converged { iterations: 1 });
    assert_eq!(sim.active_cells(), 0);
    assert_eq!(sim.active_cell_ratio(), 0.0);
    // Deactivated in the first iteration, so no time was ever accrued.
    assert!(sim.times().iter().all(|&t| t == 0.0));
    Ok(())
}

/// Without target gas nothing deactivates; a bounded caller sees non-convergence.
#[test]
fn zero_concentration_never_converges() -> nanosense::error::Result<()> {
    let mut sim = build(4, 4, 0.0, 99)?;
    let outcome = sim.run_with(0.999, &mut LogProgress::every(10), &IterationLimit(50))?;
    assert!(!outcome.is_converged());
    assert_eq!(
        outcome,
        RunOutcome::Stopped {
            iterations: 50,
            active_cell_ratio: 1.0
        }
    );
    assert!(!sim.is_converged(0.999));
    assert!(sim.times().iter().all(|&t| t > 0.0 && t.is_finite()));
    let curve = sim.current_vs_time()?;
    assert!(curve.currents.iter().all(|&c| c == 0.0));
    Ok(())
}

/// The observer sees a non-increasing active ratio in [0, 1] and consecutive iteration counts.
#[test]
fn observer_sees_monotone_progress() -> nanosense::error::Result<()> {
    let mut sim = build(20, 20, 0.05, 2024)?;
    let mut seen: Vec<(f64, u64)> = Vec::new();
    let mut observer = |ratio: f64, itr: u64| seen.push((ratio, itr));
    let outcome = sim.run_with(0.1, &mut observer, &IterationLimit(100_000))?;
    assert!(outcome.is_converged());
    assert_eq!(seen.len() as u64, outcome.iterations());
    for (k, &(ratio, itr)) in seen.iter().enumerate() {
        assert!((0.0..=1.0).contains(&ratio));
        assert_eq!(itr, k as u64 + 1);
    }
    assert!(seen.windows(2).all(|w| w[1].0 <= w[0].0));
    let last = seen.last().map(|&(r, _)| r).unwrap_or(1.0);
    assert!(last < 0.1);
    Ok(())
}

/// Closures work as stop conditions, e.g. a cancellation triggered mid-run.
#[test]
fn closure_stop_condition() -> nanosense::error::Result<()> {
    let mut sim = build(10, 10, 0.01, 5)?;
    let outcome = sim.run_with(0.01, &mut |_: f64, _: u64| {}, &|itr: u64| itr >= 3)?;
    assert_eq!(outcome.iterations(), 3);
    assert!(!outcome.is_converged());
    assert_eq!(sim.iterations(), 3);
    Ok(())
}

/// Running again continues from the current state instead of restarting.
#[test]
fn rerun_continues_accumulating() -> nanosense::error::Result<()> {
    let mut sim = build(6, 6, 0.2, 8)?;
    sim.run_with(0.5, &mut |_: f64, _: u64| {}, &IterationLimit(5_000))?;
    let first = sim.iterations();
    sim.run_with(0.1, &mut |_: f64, _: u64| {}, &IterationLimit(50_000))?;
    assert!(sim.iterations() >= first);
    assert!(sim.is_converged(0.1));
    Ok(())
}
