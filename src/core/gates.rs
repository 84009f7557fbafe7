/// Gate descriptors and in-place gate application.
///
/// A single-qubit gate is a 2×2 complex unitary packed into eight `f32`
/// values, row-major, real part before imaginary:
///
/// ```text
///   [Re00, Im00, Re01, Im01, Re10, Im10, Re11, Im11]
/// ```
///
/// Application strategy: for target qubit q, `block = 2^q`. The index range
/// is cut into windows of `2·block`; inside a window, index `i0` and
/// `i0 + block` differ only in bit q and form the pair the gate mixes.
/// Each pair is read in full, then written in full. O(2^n) per gate.
use super::complex::Complex;
use super::state::StateVector;
use crate::error::{check_qubit, Error, Result};
use std::f32::consts::FRAC_1_SQRT_2;
use std::fmt;
use std::str::FromStr;

// ── Gate descriptor ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateDescriptor(pub [f32; 8]);

impl GateDescriptor {
    /// Hadamard: (1/√2)·[[1, 1], [1, -1]]
    #[rustfmt::skip]
    pub const H: Self = Self([
        FRAC_1_SQRT_2, 0.0, FRAC_1_SQRT_2, 0.0,
        FRAC_1_SQRT_2, 0.0, -FRAC_1_SQRT_2, 0.0,
    ]);

    /// Pauli-X: [[0, 1], [1, 0]]
    pub const X: Self = Self([0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0]);

    /// Pauli-Y: [[0, -i], [i, 0]]
    pub const Y: Self = Self([0.0, 0.0, 0.0, -1.0, 0.0, 1.0, 0.0, 0.0]);

    /// Pauli-Z: [[1, 0], [0, -1]]
    pub const Z: Self = Self([1.0, 0.0, 0.0, 0.0, 0.0, 0.0, -1.0, 0.0]);

    /// S: [[1, 0], [0, i]]
    pub const S: Self = Self([1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);

    /// T: [[1, 0], [0, e^(iπ/4)]]
    #[rustfmt::skip]
    pub const T: Self = Self([
        1.0, 0.0, 0.0, 0.0,
        0.0, 0.0, FRAC_1_SQRT_2, FRAC_1_SQRT_2,
    ]);

    /// Pack a row-major 2×2 complex matrix.
    #[rustfmt::skip]
    pub fn from_matrix(m: [[Complex; 2]; 2]) -> Self {
        Self([
            m[0][0].re, m[0][0].im, m[0][1].re, m[0][1].im,
            m[1][0].re, m[1][0].im, m[1][1].re, m[1][1].im,
        ])
    }

    /// Matrix entry at (row, col).
    pub fn entry(&self, row: usize, col: usize) -> Complex {
        let k = 4 * row + 2 * col;
        Complex::new(self.0[k], self.0[k + 1])
    }
}

// ── Gate identifiers ───────────────────────────────────────────────────────

/// The fixed single-qubit gate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateKind {
    H,
    X,
    Y,
    Z,
    S,
    T,
}

impl GateKind {
    pub const ALL: [GateKind; 6] = [Self::H, Self::X, Self::Y, Self::Z, Self::S, Self::T];

    pub fn name(self) -> &'static str {
        match self {
            Self::H => "H",
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
            Self::S => "S",
            Self::T => "T",
        }
    }

    /// G·G = I. S and T are not (S² = Z, T² = S).
    pub fn is_self_inverse(self) -> bool {
        matches!(self, Self::H | Self::X | Self::Y | Self::Z)
    }
}

impl FromStr for GateKind {
    type Err = Error;

    /// Case-insensitive lookup.
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownGate(s.to_string()))
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lookup from gate identifier to descriptor.
///
/// Built once and handed to whoever applies gates; there is no global table.
#[derive(Debug, Clone)]
pub struct GateTable {
    entries: [GateDescriptor; 6],
}

impl GateTable {
    pub fn standard() -> Self {
        Self {
            entries: [
                GateDescriptor::H,
                GateDescriptor::X,
                GateDescriptor::Y,
                GateDescriptor::Z,
                GateDescriptor::S,
                GateDescriptor::T,
            ],
        }
    }

    #[inline]
    pub fn descriptor(&self, kind: GateKind) -> &GateDescriptor {
        &self.entries[kind as usize]
    }

    /// Resolve a gate name (any case) to its descriptor.
    pub fn resolve(&self, name: &str) -> Result<&GateDescriptor> {
        Ok(self.descriptor(name.parse()?))
    }
}

impl Default for GateTable {
    fn default() -> Self {
        Self::standard()
    }
}

// ── Gate application ───────────────────────────────────────────────────────

/// Apply `gate` to every (i0, i0 + block) pair in `real`/`imag`.
///
/// Both slices must have the same length, a multiple of `2 * block`, and
/// start on a window boundary. The serial and parallel paths both call this,
/// so they produce identical bits.
#[inline]
pub(crate) fn apply_pairs(real: &mut [f32], imag: &mut [f32], gate: &GateDescriptor, block: usize) {
    debug_assert_eq!(real.len(), imag.len());
    debug_assert_eq!(real.len() % (2 * block), 0);

    let [g0, g1, g2, g3, g4, g5, g6, g7] = gate.0;
    let stride = 2 * block;

    for base in (0..real.len()).step_by(stride) {
        for i0 in base..base + block {
            let i1 = i0 + block;
            let (r0, m0) = (real[i0], imag[i0]);
            let (r1, m1) = (real[i1], imag[i1]);

            let nr0 = g0 * r0 - g1 * m0 + g2 * r1 - g3 * m1;
            let ni0 = g0 * m0 + g1 * r0 + g2 * m1 + g3 * r1;
            let nr1 = g4 * r0 - g5 * m0 + g6 * r1 - g7 * m1;
            let ni1 = g4 * m0 + g5 * r0 + g6 * m1 + g7 * r1;

            real[i0] = nr0;
            imag[i0] = ni0;
            real[i1] = nr1;
            imag[i1] = ni1;
        }
    }
}

/// Apply a single-qubit gate to `qubit`.
pub fn apply_single_qubit(store: &mut StateVector, gate: &GateDescriptor, qubit: usize) -> Result<()> {
    check_qubit(qubit, store.num_qubits())?;
    let (real, imag) = store.parts_mut();
    apply_pairs(real, imag, gate, 1 << qubit);
    Ok(())
}

/// Apply CNOT: flip `target` wherever `control` is |1⟩.
///
/// Pure amplitude swaps, so applying it twice restores the state exactly.
pub fn apply_cnot(store: &mut StateVector, control: usize, target: usize) -> Result<()> {
    let n = store.num_qubits();
    check_qubit(control, n)?;
    check_qubit(target, n)?;
    if control == target {
        return Err(Error::ControlEqualsTarget(control));
    }

    let control_mask = 1usize << control;
    let target_mask = 1usize << target;
    let (real, imag) = store.parts_mut();

    for i in 0..real.len() {
        if i & control_mask == 0 {
            continue;
        }
        let j = i ^ target_mask;
        if j > i {
            real.swap(i, j);
            imag.swap(i, j);
        }
    }
    Ok(())
}
