/// Quantum state vector representation.
///
/// An n-qubit register has 2^n basis states. Amplitudes are kept as two
/// parallel `f32` buffers (`real`, `imag`), both aligned to
/// [`AMPLITUDE_ALIGNMENT`]. Index bit `q` is the state of qubit `q`
/// (qubit 0 is the least-significant bit).
///
/// The vector must satisfy Σ|αᵢ|² = 1 between operations. Only the gate,
/// measurement and parallel modules get mutable access to the buffers.
use super::aligned::{AlignedBuffer, AMPLITUDE_ALIGNMENT};
use super::complex::Complex;
use crate::error::{check_qubit, Error, Result};
use std::fmt;

struct Buffers {
    real: AlignedBuffer<f32>,
    imag: AlignedBuffer<f32>,
}

pub struct StateVector {
    num_qubits: usize,
    buffers: Option<Buffers>,
}

impl StateVector {
    /// Create a register of `num_qubits` qubits in |0...0⟩.
    ///
    /// Fails with [`Error::Allocation`] if either buffer cannot be obtained;
    /// nothing stays allocated in that case.
    pub fn new(num_qubits: usize) -> Result<Self> {
        let dim = 1usize
            .checked_shl(num_qubits as u32)
            .filter(|_| num_qubits < usize::BITS as usize)
            .ok_or(Error::Allocation {
                size: usize::MAX,
                alignment: AMPLITUDE_ALIGNMENT,
            })?;

        let mut real = AlignedBuffer::<f32>::new(dim, AMPLITUDE_ALIGNMENT)?;
        // `real` is dropped (released) if this one fails.
        let imag = AlignedBuffer::<f32>::new(dim, AMPLITUDE_ALIGNMENT)?;
        real[0] = 1.0;

        Ok(Self {
            num_qubits,
            buffers: Some(Buffers { real, imag }),
        })
    }

    /// Release both buffers and reset the width to zero. Calling it again is a no-op.
    pub fn destroy(&mut self) {
        self.buffers = None;
        self.num_qubits = 0;
    }

    /// False once [`destroy`](Self::destroy) has run.
    pub fn is_live(&self) -> bool {
        self.buffers.is_some()
    }

    #[inline(always)]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of amplitudes: 2^num_qubits, or 0 after `destroy`.
    #[inline(always)]
    pub fn len(&self) -> usize {
        if self.is_live() {
            1 << self.num_qubits
        } else {
            0
        }
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn real(&self) -> &[f32] {
        self.buffers.as_ref().map_or(&[], |b| &b.real[..])
    }

    pub fn imag(&self) -> &[f32] {
        self.buffers.as_ref().map_or(&[], |b| &b.imag[..])
    }

    /// Mutable access to both buffers at once.
    pub(crate) fn parts_mut(&mut self) -> (&mut [f32], &mut [f32]) {
        match self.buffers.as_mut() {
            Some(b) => (&mut b.real[..], &mut b.imag[..]),
            None => (&mut [], &mut []),
        }
    }

    /// Amplitude of basis state `index`.
    ///
    /// # Panics
    /// If `index >= self.len()`.
    #[inline]
    pub fn amplitude(&self, index: usize) -> Complex {
        Complex::new(self.real()[index], self.imag()[index])
    }

    /// Probability of basis state `index`: |αᵢ|²
    #[inline]
    pub fn probability(&self, index: usize) -> f64 {
        let (re, im) = (self.real()[index] as f64, self.imag()[index] as f64);
        re * re + im * im
    }

    /// Probability of every basis state, in index order.
    pub fn probabilities(&self) -> Vec<f64> {
        (0..self.len()).map(|i| self.probability(i)).collect()
    }

    /// Σ|αᵢ|², accumulated in f64.
    pub fn total_probability(&self) -> f64 {
        squared_norm(self.real(), self.imag())
    }

    /// Probability of measuring `qubit` as |1⟩, marginalised over the rest.
    pub fn marginal_probability_one(&self, qubit: usize) -> Result<f64> {
        check_qubit(qubit, self.num_qubits)?;
        Ok((0..self.len())
            .filter(|&i| Self::qubit_bit(i, qubit))
            .map(|i| self.probability(i))
            .sum())
    }

    /// Reset to |0...0⟩.
    pub fn reset(&mut self) {
        let (real, imag) = self.parts_mut();
        real.fill(0.0);
        imag.fill(0.0);
        if let Some(r0) = real.first_mut() {
            *r0 = 1.0;
        }
    }

    /// Whether `qubit`'s bit is set in basis state `basis_idx`.
    #[inline(always)]
    pub fn qubit_bit(basis_idx: usize, qubit: usize) -> bool {
        (basis_idx >> qubit) & 1 == 1
    }

    /// Ket label of basis state `index`, qubit 0 rightmost.
    pub fn basis_label(&self, index: usize) -> String {
        (0..self.num_qubits)
            .rev()
            .map(|q| if Self::qubit_bit(index, q) { '1' } else { '0' })
            .collect()
    }
}

/// Σ(re² + im²) over two parallel buffers, accumulated in f64.
pub(crate) fn squared_norm(real: &[f32], imag: &[f32]) -> f64 {
    real.iter()
        .zip(imag)
        .map(|(&r, &i)| (r as f64) * (r as f64) + (i as f64) * (i as f64))
        .sum()
}

impl fmt::Debug for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateVector")
            .field("num_qubits", &self.num_qubits)
            .field("len", &self.len())
            .field("live", &self.is_live())
            .finish()
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "StateVector ({} qubits, dim={}):", self.num_qubits, self.len())?;
        for i in 0..self.len() {
            let prob = self.probability(i);
            if prob > 1e-12 {
                writeln!(
                    f,
                    "  |{}⟩  amplitude: {}  probability: {:.4}",
                    self.basis_label(i),
                    self.amplitude(i),
                    prob
                )?;
            }
        }
        Ok(())
    }
}
