/// Fork-join single-qubit gate application.
///
/// The amplitude range is split into contiguous chunks whose boundaries are
/// multiples of `2·block`, so every (i0, i0 + block) pair lives entirely in
/// one chunk and no two workers ever touch the same index. Each chunk runs
/// the same pair kernel as the serial path.
///
/// A bounded rayon pool is built for the call and dropped before it returns;
/// nothing is kept between calls.
use super::gates::{apply_pairs, apply_single_qubit, GateDescriptor};
use super::state::StateVector;
use crate::error::{check_qubit, Error, Result};
use rayon::prelude::*;
use std::ops::Range;
use tracing::debug;

/// Split `[0, len)` into at most `workers` contiguous ranges, each a whole
/// number of `2^(qubit+1)`-sized windows.
///
/// `len` must itself be a multiple of the window size.
pub fn partition(len: usize, qubit: usize, workers: usize) -> Vec<Range<usize>> {
    let window = 2usize << qubit;
    let chunk = chunk_len(len, window, workers);
    (0..len)
        .step_by(chunk.max(1))
        .map(|start| start..(start + chunk).min(len))
        .collect()
}

fn chunk_len(len: usize, window: usize, workers: usize) -> usize {
    let windows = len / window;
    windows.div_ceil(workers.max(1)) * window
}

/// Apply `gate` to `qubit` across at most `workers` threads, one per `partition` range.
///
/// Falls back to [`apply_single_qubit`] when `workers <= 1` or the vector
/// holds a single pair window. The result is bit-identical to the serial path.
pub fn apply_single_qubit_parallel(
    store: &mut StateVector,
    gate: &GateDescriptor,
    qubit: usize,
    workers: usize,
) -> Result<()> {
    check_qubit(qubit, store.num_qubits())?;

    let block = 1usize << qubit;
    let window = 2 * block;
    let len = store.len();
    if workers <= 1 || len <= window {
        return apply_single_qubit(store, gate, qubit);
    }

    let ranges = partition(len, qubit, workers);
    debug!(qubit, workers, len, chunks = ranges.len(), "parallel gate");

    // One thread per chunk; never more threads than pair windows.
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(ranges.len())
        .build()
        .map_err(|e| Error::WorkerPool(e.to_string()))?;

    let (real, imag) = store.parts_mut();
    let pieces = split_ranges(real, imag, &ranges);
    pool.install(|| {
        pieces
            .into_par_iter()
            .for_each(|(re, im)| apply_pairs(re, im, gate, block));
    });
    Ok(())
}

/// Cut both buffers into disjoint mutable slices, one per range.
///
/// `ranges` must be contiguous and start at 0, as `partition` returns them.
fn split_ranges<'a>(
    mut real: &'a mut [f32],
    mut imag: &'a mut [f32],
    ranges: &[Range<usize>],
) -> Vec<(&'a mut [f32], &'a mut [f32])> {
    let mut pieces = Vec::with_capacity(ranges.len());
    for r in ranges {
        let (re, rest_re) = std::mem::take(&mut real).split_at_mut(r.len());
        let (im, rest_im) = std::mem::take(&mut imag).split_at_mut(r.len());
        real = rest_re;
        imag = rest_im;
        pieces.push((re, im));
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepared(n: usize) -> StateVector {
        let mut sv = StateVector::new(n).unwrap();
        for q in 0..n {
            apply_single_qubit(&mut sv, &GateDescriptor::H, q).unwrap();
            if q % 2 == 1 {
                apply_single_qubit(&mut sv, &GateDescriptor::T, q).unwrap();
            }
        }
        sv
    }

    #[test]
    fn test_x_on_qubit_one_matches_serial() {
        let mut serial = StateVector::new(3).unwrap();
        let mut parallel = StateVector::new(3).unwrap();
        apply_single_qubit(&mut serial, &GateDescriptor::X, 1).unwrap();
        apply_single_qubit_parallel(&mut parallel, &GateDescriptor::X, 1, 4).unwrap();

        for i in 0..serial.len() {
            assert!((serial.real()[i] - parallel.real()[i]).abs() < 1e-6);
            assert!((serial.imag()[i] - parallel.imag()[i]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_bit_identical_to_serial_for_every_qubit() {
        let n = 8;
        for qubit in 0..n {
            for workers in [2, 3, 4, 7] {
                let mut serial = prepared(n);
                let mut parallel = prepared(n);
                apply_single_qubit(&mut serial, &GateDescriptor::H, qubit).unwrap();
                apply_single_qubit_parallel(&mut parallel, &GateDescriptor::H, qubit, workers).unwrap();
                assert_eq!(serial.real(), parallel.real(), "qubit {qubit}, {workers} workers");
                assert_eq!(serial.imag(), parallel.imag());
            }
        }
    }

    #[test]
    fn test_partition_respects_pair_windows() {
        for qubit in 0..6 {
            let window = 2 << qubit;
            for workers in 1..10 {
                let ranges = partition(64, qubit, workers);
                assert!(ranges.len() <= workers);
                assert_eq!(ranges.first().map(|r| r.start), Some(0));
                assert_eq!(ranges.last().map(|r| r.end), Some(64));
                for pair in ranges.windows(2) {
                    assert_eq!(pair[0].end, pair[1].start);
                }
                for r in &ranges {
                    assert_eq!(r.start % window, 0);
                    assert_eq!(r.end % window, 0);
                }
            }
        }
    }

    #[test]
    fn test_partition_uneven_split() {
        // 8 windows of 4 over 3 workers: 3 + 3 + 2 windows.
        assert_eq!(partition(32, 1, 3), vec![0..12, 12..24, 24..32]);
        // More workers than windows.
        assert_eq!(partition(8, 1, 4), vec![0..4, 4..8]);
    }

    #[test]
    fn test_split_ranges_follows_partition() {
        let mut real: Vec<f32> = (0..32).map(|i| i as f32).collect();
        let mut imag = vec![0.0f32; 32];
        let ranges = partition(32, 1, 3);
        let pieces = split_ranges(&mut real, &mut imag, &ranges);

        assert_eq!(pieces.len(), ranges.len());
        for ((re, im), r) in pieces.iter().zip(&ranges) {
            assert_eq!(re.len(), r.len());
            assert_eq!(im.len(), r.len());
            assert_eq!(re[0], r.start as f32);
            assert_eq!(re.len() % 4, 0);
        }
    }

    #[test]
    fn test_oversized_worker_count_capped_by_windows() {
        // 3 qubits, target 1: two pair windows, so at most two chunks.
        assert_eq!(partition(8, 1, 10_000).len(), 2);

        let mut serial = prepared(3);
        let mut parallel = prepared(3);
        apply_single_qubit(&mut serial, &GateDescriptor::H, 1).unwrap();
        apply_single_qubit_parallel(&mut parallel, &GateDescriptor::H, 1, 10_000).unwrap();
        assert_eq!(serial.real(), parallel.real());
        assert_eq!(serial.imag(), parallel.imag());
    }

    #[test]
    fn test_single_worker_falls_back() {
        let mut serial = prepared(4);
        let mut parallel = prepared(4);
        apply_single_qubit(&mut serial, &GateDescriptor::Y, 2).unwrap();
        apply_single_qubit_parallel(&mut parallel, &GateDescriptor::Y, 2, 1).unwrap();
        assert_eq!(serial.real(), parallel.real());
        apply_single_qubit_parallel(&mut parallel, &GateDescriptor::Y, 2, 0).unwrap();
        assert!((parallel.total_probability() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_rejects_out_of_range_qubit() {
        let mut sv = StateVector::new(2).unwrap();
        assert_eq!(
            apply_single_qubit_parallel(&mut sv, &GateDescriptor::X, 2, 4),
            Err(Error::out_of_range(2, 2))
        );
    }
}
