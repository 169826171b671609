use fastrand::Rng;
use std::f64::consts::TAU;

/// Seeded generator used by schedulers and drivers. Identical seeds give
/// identical streams, which is what makes runs reproducible.
pub fn seeded(seed: u64) -> Rng {
    Rng::with_seed(seed)
}

/// Standard normal deviate (mean 0, sd 1) via Box-Muller.
pub fn normal(rng: &mut Rng) -> f64 {
    // 1 - u keeps the log argument in (0, 1]
    let u1 = 1.0 - rng.f64();
    let u2 = rng.f64();
    (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_deviates_are_centered() {
        let mut rng = seeded(7);
        let n = 20_000;
        let samples: Vec<f64> = (0..n).map(|_| normal(&mut rng)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;

        assert!(mean.abs() < 0.05, "mean drifted: {}", mean);
        assert!((var - 1.0).abs() < 0.05, "variance drifted: {}", var);
        assert!(samples.iter().all(|x| x.is_finite()));
    }
}
