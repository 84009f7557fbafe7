/// Projective measurement in the computational basis.
///
/// Born rule: P(q = 0) = Σ |αᵢ|² over indices whose bit q is 0.
/// After sampling an outcome, every amplitude that disagrees with it is set
/// to exactly zero and the survivors are rescaled to unit norm.
///
/// Measurement touches the whole vector, so it is always serial.
use super::state::{squared_norm, StateVector};
use crate::error::{check_qubit, Result};
use rand::Rng;
use tracing::{trace, warn};

/// Below this surviving norm, collapse skips renormalization.
pub const RENORM_EPSILON: f64 = 1e-12;

/// Marginal probability of measuring `qubit` as 0.
pub fn probability_zero(store: &StateVector, qubit: usize) -> Result<f64> {
    check_qubit(qubit, store.num_qubits())?;
    let mask = 1usize << qubit;
    let (real, imag) = (store.real(), store.imag());
    Ok((0..store.len())
        .filter(|i| i & mask == 0)
        .map(|i| {
            let (r, m) = (real[i] as f64, imag[i] as f64);
            r * r + m * m
        })
        .sum())
}

/// Measure `qubit`, collapse the state and return the outcome bit.
pub fn measure<R: Rng + ?Sized>(store: &mut StateVector, qubit: usize, rng: &mut R) -> Result<u8> {
    let p0 = probability_zero(store, qubit)?;
    let sample: f64 = rng.gen();
    let outcome = u8::from(sample >= p0);

    collapse(store, qubit, outcome);
    trace!(qubit, p0, sample, outcome, "measured");
    Ok(outcome)
}

/// Measure qubits 0..n one after another on the same store.
pub fn measure_all<R: Rng + ?Sized>(store: &mut StateVector, rng: &mut R) -> Result<Vec<u8>> {
    (0..store.num_qubits())
        .map(|q| measure(store, q, rng))
        .collect()
}

/// Zero the amplitudes inconsistent with `outcome` on `qubit`, then renormalize.
fn collapse(store: &mut StateVector, qubit: usize, outcome: u8) {
    let mask = 1usize << qubit;
    let keep = if outcome == 1 { mask } else { 0 };
    let (real, imag) = store.parts_mut();

    for i in 0..real.len() {
        if i & mask != keep {
            real[i] = 0.0;
            imag[i] = 0.0;
        }
    }

    let norm = squared_norm(real, imag);
    if norm < RENORM_EPSILON {
        warn!(qubit, outcome, norm, "surviving norm too small, skipping renormalization");
        return;
    }

    let scale = (1.0 / norm.sqrt()) as f32;
    for i in 0..real.len() {
        if i & mask == keep {
            real[i] *= scale;
            imag[i] *= scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gates::{apply_cnot, apply_single_qubit, GateDescriptor};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_ground_state_always_zero() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let mut sv = StateVector::new(1).unwrap();
            assert_eq!(measure(&mut sv, 0, &mut rng).unwrap(), 0);
        }
    }

    #[test]
    fn test_one_state_always_one() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let mut sv = StateVector::new(2).unwrap();
            apply_single_qubit(&mut sv, &GateDescriptor::X, 1).unwrap();
            assert_eq!(measure(&mut sv, 1, &mut rng).unwrap(), 1);
            assert_eq!(measure(&mut sv, 0, &mut rng).unwrap(), 0);
        }
    }

    #[test]
    fn test_collapse_zeroes_and_renormalizes() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let mut sv = StateVector::new(3).unwrap();
            for q in 0..3 {
                apply_single_qubit(&mut sv, &GateDescriptor::H, q).unwrap();
            }
            apply_single_qubit(&mut sv, &GateDescriptor::T, 1).unwrap();

            let outcome = measure(&mut sv, 1, &mut rng).unwrap();
            for i in 0..sv.len() {
                if StateVector::qubit_bit(i, 1) != (outcome == 1) {
                    assert_eq!(sv.real()[i], 0.0);
                    assert_eq!(sv.imag()[i], 0.0);
                }
            }
            assert!((sv.total_probability() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_superposition_yields_both_outcomes() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut ones = 0;
        for _ in 0..400 {
            let mut sv = StateVector::new(1).unwrap();
            apply_single_qubit(&mut sv, &GateDescriptor::H, 0).unwrap();
            ones += measure(&mut sv, 0, &mut rng).unwrap() as usize;
        }
        assert!((120..280).contains(&ones), "ones = {ones}");
    }

    #[test]
    fn test_bell_outcomes_are_correlated() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let mut sv = StateVector::new(2).unwrap();
            apply_single_qubit(&mut sv, &GateDescriptor::H, 0).unwrap();
            apply_cnot(&mut sv, 0, 1).unwrap();
            let bits = measure_all(&mut sv, &mut rng).unwrap();
            assert_eq!(bits[0], bits[1]);
        }
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut sv = StateVector::new(4).unwrap();
            for q in 0..4 {
                apply_single_qubit(&mut sv, &GateDescriptor::H, q).unwrap();
            }
            measure_all(&mut sv, &mut rng).unwrap()
        };
        assert_eq!(run(99), run(99));
    }

    #[test]
    fn test_probability_zero() {
        let mut sv = StateVector::new(2).unwrap();
        assert!((probability_zero(&sv, 0).unwrap() - 1.0).abs() < 1e-12);
        apply_single_qubit(&mut sv, &GateDescriptor::H, 1).unwrap();
        assert!((probability_zero(&sv, 1).unwrap() - 0.5).abs() < 1e-6);
        assert!(probability_zero(&sv, 2).is_err());
    }

    #[test]
    fn test_zero_norm_skips_renormalization() {
        let mut sv = StateVector::new(1).unwrap();
        {
            let (real, _) = sv.parts_mut();
            real[0] = 0.0;
        }
        // p0 = 0, so the outcome is 1 and nothing survives.
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(measure(&mut sv, 0, &mut rng).unwrap(), 1);
        assert!(sv.real().iter().all(|&r| r == 0.0));
        assert!(sv.imag().iter().all(|&m| m == 0.0));
    }

    #[test]
    fn test_out_of_range_measurement() {
        let mut sv = StateVector::new(1).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(measure(&mut sv, 1, &mut rng).is_err());
        assert!(sv.amplitude(0).bits_eq(&crate::core::complex::Complex::one()));
    }
}
