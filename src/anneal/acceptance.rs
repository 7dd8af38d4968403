//! Metropolis acceptance criterion.

use rand::Rng;

/// Largest `delta / T` for which `exp(-delta / T)` is evaluated. Beyond it
/// the probability underflows to zero in `f64` and the move is rejected
/// outright.
pub const MAX_ACCEPTANCE_EXPONENT: f64 = 709.0;

/// Decides whether to accept a move with the given length change.
///
/// Improving and neutral moves (`delta <= 0`) are always accepted and
/// consume no randomness. A worsening move is accepted iff a uniform draw
/// from `[0, 1)` is at most `exp(-delta / temperature)`.
#[inline]
pub fn metropolis<R: Rng>(delta: f64, temperature: f64, rng: &mut R) -> bool {
    if delta <= 0.0 {
        return true;
    }
    let exponent = delta / temperature;
    if exponent > MAX_ACCEPTANCE_EXPONENT {
        return false;
    }
    rng.random::<f64>() <= (-exponent).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_improving_and_neutral_always_accepted() {
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..100 {
            assert!(metropolis(-5.0, 1e-12, &mut rng));
            assert!(metropolis(0.0, 1e-12, &mut rng));
        }
    }

    #[test]
    fn test_huge_exponent_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(!metropolis(1e6, 1.0, &mut rng));
        assert!(!metropolis(1.0, 1e-300, &mut rng));
    }

    #[test]
    fn test_acceptance_rate_matches_probability() {
        let mut rng = StdRng::seed_from_u64(42);
        let trials = 20_000;
        let accepted = (0..trials)
            .filter(|_| metropolis(1.0, 1.0, &mut rng))
            .count();
        let rate = accepted as f64 / trials as f64;
        let expected = (-1.0f64).exp();
        assert!(
            (rate - expected).abs() < 0.02,
            "rate {rate}, expected {expected}"
        );
    }

    #[test]
    fn test_high_temperature_accepts_nearly_all() {
        let mut rng = StdRng::seed_from_u64(7);
        let accepted = (0..1000)
            .filter(|_| metropolis(1.0, 1e8, &mut rng))
            .count();
        assert!(accepted > 990);
    }
}
