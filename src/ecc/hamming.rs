//! Systematic single-error-correcting parity-check codes.
//!
//! A code is described by its parity-check equations alone. Each equation is
//! a bitmask over codeword positions and must evaluate (XOR of the covered
//! bits) to zero for a valid codeword. The syndrome-to-position table is not
//! written by hand: it is the set of columns of the parity-check matrix,
//! derived when the code is constructed. Construction rejects any matrix
//! where a column is zero or two columns coincide, since such a code cannot
//! locate a single-bit error.
//!
//! Codewords are laid out with the `K = N - R` data bits first and the `R`
//! parity bits last, equation `j` owning parity bit `K + j`.
//!
//! # Limitations
//!
//! These codes correct any single-bit error. Two or more flipped bits are not
//! detected reliably: the syndrome of a double error is the XOR of two
//! columns, which is either zero or the column of a third position. The first
//! case looks error-free, the second is "corrected" at the wrong position.
//! Codes whose table does not cover every nonzero syndrome report the
//! uncovered values as [`Correction::UnmappedSyndrome`].

use crate::ecc::{ErrorCorrection, Result};
use crate::error::{Error, MatrixError};
use bitvec::prelude::*;
use log::{debug, trace, warn};

/// Largest number of parity equations a code may have
pub const MAX_PARITY_BITS: usize = 5;

/// Largest supported codeword length (one `u32` mask per equation)
pub const MAX_CODE_LENGTH: usize = 32;

const TABLE_SIZE: usize = 1 << MAX_PARITY_BITS;

/// Outcome of a single-error correction attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    /// All parity checks held
    NoError,
    /// The bit at this codeword index was flipped back
    Corrected(usize),
    /// A nonzero syndrome that no single-bit error produces; the codeword was left untouched
    UnmappedSyndrome(u8),
}

impl Correction {
    /// Whether a bit was flipped
    pub fn is_corrected(&self) -> bool {
        matches!(self, Correction::Corrected(_))
    }

    /// Whether any parity check failed, corrected or not
    pub fn error_detected(&self) -> bool {
        !matches!(self, Correction::NoError)
    }
}

/// Builds an equation mask from a list of codeword positions.
///
/// Intended for `const` code definitions. A position of 32 or more overflows
/// the mask and fails const evaluation.
pub const fn positions_mask(positions: &[usize]) -> u32 {
    let mut mask = 0u32;
    let mut i = 0;
    while i < positions.len() {
        mask |= 1u32 << positions[i];
        i += 1;
    }
    mask
}

/// Packs per-equation syndrome bits into an integer, equation 0 in the LSB.
///
/// `bits` holds at most `MAX_PARITY_BITS` entries.
pub(crate) fn pack_syndrome(bits: &[u8]) -> u8 {
    bits.iter()
        .enumerate()
        .fold(0, |acc, (j, &bit)| acc | ((bit & 1) << j))
}

/// XOR of the bits covered by `mask`
fn parity_over(mask: u32, bits: &[u8]) -> u8 {
    bits.iter()
        .enumerate()
        .filter(|&(i, _)| (mask >> i) & 1 == 1)
        .fold(0, |acc, (_, &bit)| acc ^ bit)
}

fn check_bits(bits: &[u8]) -> Result<()> {
    match bits.iter().position(|&bit| bit > 1) {
        Some(position) => Err(Error::InvalidBit {
            position,
            value: bits[position],
        }),
        None => Ok(()),
    }
}

/// A systematic linear block code with `N` codeword bits and `R` parity
/// equations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParityCheckCode<const N: usize, const R: usize> {
    /// Parity-check equations, bit `i` set when position `i` participates
    equations: [u32; R],
    /// Syndrome value -> codeword index of the single-bit error producing it
    table: [Option<u8>; TABLE_SIZE],
}

impl<const N: usize, const R: usize> ParityCheckCode<N, R> {
    /// Runtime counterpart of [`from_equations`](Self::from_equations) for
    /// codes built from data rather than constants.
    pub fn new(equations: [u32; R]) -> Result<Self> {
        let code = Self::from_equations(equations)?;
        debug!(
            "Built Hamming({},{}) code with {} mapped syndromes",
            N,
            N - R,
            code.syndrome_table().count()
        );
        Ok(code)
    }

    /// Creates a code from its parity-check equations and derives the
    /// syndrome table.
    ///
    /// # Arguments
    ///
    /// * `equations` - One position mask per parity bit, in syndrome bit order
    ///
    /// # Returns
    ///
    /// The code, or the first defect found in the matrix
    pub const fn from_equations(equations: [u32; R]) -> std::result::Result<Self, MatrixError> {
        if R == 0 || R > MAX_PARITY_BITS {
            return Err(MatrixError::ParityCount(R));
        }
        if N <= R || N > MAX_CODE_LENGTH {
            return Err(MatrixError::CodeLength {
                length: N,
                parity: R,
            });
        }

        let data_len = N - R;
        let valid_mask = if N == MAX_CODE_LENGTH {
            u32::MAX
        } else {
            (1u32 << N) - 1
        };
        let parity_mask = valid_mask & !((1u32 << data_len) - 1);

        let mut j = 0;
        while j < R {
            let equation = equations[j];
            if equation & !valid_mask != 0 {
                return Err(MatrixError::PositionOutOfRange { equation: j });
            }
            if equation & parity_mask != 1u32 << (data_len + j) {
                return Err(MatrixError::NotSystematic { equation: j });
            }
            j += 1;
        }

        let mut table = [None; TABLE_SIZE];
        let mut position = 0;
        while position < N {
            let syndrome = Self::column(&equations, position);
            if syndrome == 0 {
                return Err(MatrixError::ZeroColumn { position });
            }
            if let Some(first) = table[syndrome as usize] {
                return Err(MatrixError::DuplicateColumn {
                    first: first as usize,
                    second: position,
                    syndrome,
                });
            }
            table[syndrome as usize] = Some(position as u8);
            position += 1;
        }

        Ok(Self { equations, table })
    }

    /// Syndrome produced by a single flip at `position`
    const fn column(equations: &[u32; R], position: usize) -> u8 {
        let mut syndrome = 0u8;
        let mut j = 0;
        while j < R {
            if (equations[j] >> position) & 1 == 1 {
                syndrome |= 1 << j;
            }
            j += 1;
        }
        syndrome
    }

    /// Total codeword length (N)
    pub const fn code_length(&self) -> usize {
        N
    }

    /// Number of data bits (K)
    pub const fn data_length(&self) -> usize {
        N - R
    }

    /// Number of parity bits (R)
    pub const fn parity_length(&self) -> usize {
        R
    }

    /// The parity-check equations as position masks
    pub fn equations(&self) -> &[u32; R] {
        &self.equations
    }

    /// Codeword index whose single-bit error yields `syndrome`
    pub fn position_for(&self, syndrome: u8) -> Option<usize> {
        self.table
            .get(syndrome as usize)
            .copied()
            .flatten()
            .map(usize::from)
    }

    /// All `(syndrome, position)` pairs of the decoding table, by syndrome
    pub fn syndrome_table(&self) -> impl Iterator<Item = (u8, usize)> + '_ {
        self.table
            .iter()
            .enumerate()
            .filter_map(|(syndrome, entry)| entry.map(|pos| (syndrome as u8, usize::from(pos))))
    }

    /// Evaluates every parity-check equation over `codeword`.
    ///
    /// # Returns
    ///
    /// One bit per equation in equation order, or `Error::InvalidBit` if an
    /// element is not 0 or 1
    pub fn compute_syndrome(&self, codeword: &[u8; N]) -> Result<[u8; R]> {
        check_bits(codeword)?;
        Ok(self.syndrome_bits(codeword))
    }

    fn syndrome_bits(&self, codeword: &[u8; N]) -> [u8; R] {
        let mut syndrome = [0u8; R];
        for (bit, &equation) in syndrome.iter_mut().zip(self.equations.iter()) {
            *bit = parity_over(equation, codeword);
        }
        syndrome
    }

    /// Packed syndrome of `codeword`; 0 when every check holds
    pub fn syndrome(&self, codeword: &[u8; N]) -> Result<u8> {
        Ok(pack_syndrome(&self.compute_syndrome(codeword)?))
    }

    /// Corrects at most one bit error in caller-owned data.
    pub fn correct_in_place(&self, codeword: &mut [u8; N]) -> Result<Correction> {
        check_bits(codeword)?;
        Ok(self.correct_checked(codeword))
    }

    /// Correction for a codeword whose elements are already known to be 0 or 1
    pub(crate) fn correct_checked(&self, codeword: &mut [u8; N]) -> Correction {
        let syndrome = pack_syndrome(&self.syndrome_bits(codeword));
        trace!("Hamming({},{}) syndrome {:#04x}", N, N - R, syndrome);

        if syndrome == 0 {
            return Correction::NoError;
        }

        match self.position_for(syndrome) {
            Some(position) => {
                codeword[position] ^= 1;
                debug!(
                    "Hamming({},{}) corrected bit {} (syndrome {:#04x})",
                    N,
                    N - R,
                    position,
                    syndrome
                );
                Correction::Corrected(position)
            }
            None => {
                warn!(
                    "Hamming({},{}) syndrome {:#04x} has no single-bit error pattern",
                    N,
                    N - R,
                    syndrome
                );
                Correction::UnmappedSyndrome(syndrome)
            }
        }
    }

    /// Detects and corrects at most one bit error.
    ///
    /// # Returns
    ///
    /// The corrected copy of `codeword` along with what was done to it. The
    /// copy equals the input unless the outcome is `Correction::Corrected`.
    pub fn correct_single_error(&self, codeword: &[u8; N]) -> Result<([u8; N], Correction)> {
        let mut corrected = *codeword;
        let outcome = self.correct_in_place(&mut corrected)?;
        Ok((corrected, outcome))
    }

    /// Computes the parity bits for `data` and returns the full codeword.
    ///
    /// # Arguments
    ///
    /// * `data` - Exactly K bits, each 0 or 1
    pub fn encode_word(&self, data: &[u8]) -> Result<[u8; N]> {
        let data_len = self.data_length();
        if data.len() != data_len {
            return Err(Error::InvalidLength {
                expected: data_len,
                actual: data.len(),
            });
        }
        check_bits(data)?;
        Ok(self.encode_checked(data))
    }

    /// Encoding for exactly K data bits already known to be 0 or 1
    pub(crate) fn encode_checked(&self, data: &[u8]) -> [u8; N] {
        let data_len = self.data_length();
        let mut codeword = [0u8; N];
        codeword[..data_len].copy_from_slice(data);
        for (j, &equation) in self.equations.iter().enumerate() {
            codeword[data_len + j] = parity_over(equation, data);
        }
        codeword
    }

    /// Corrects `codeword` and returns its data bits.
    ///
    /// Unlike [`correct_single_error`](Self::correct_single_error), an
    /// unmapped syndrome is an error here since the data cannot be trusted.
    pub fn decode_word(&self, codeword: &[u8; N]) -> Result<Vec<u8>> {
        let (corrected, outcome) = self.correct_single_error(codeword)?;
        if let Correction::UnmappedSyndrome(syndrome) = outcome {
            return Err(Error::UnmappedSyndrome { syndrome });
        }
        Ok(corrected[..self.data_length()].to_vec())
    }
}

impl<const N: usize, const R: usize> ErrorCorrection for ParityCheckCode<N, R> {
    /// Encodes a byte stream in blocks of K bits, MSB first.
    ///
    /// The data is followed by a single 1 bit and then zeros up to the end of
    /// the last block, so `decode` can find where the data stops even when
    /// the padding spans whole bytes. The output is zero-padded to a byte.
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }

        let data_len = self.data_length();
        let mut data_bits = BitVec::<u8, Msb0>::from_slice(data);
        data_bits.push(true);

        let blocks = data_bits.len().div_ceil(data_len);
        data_bits.resize(blocks * data_len, false);
        let mut encoded = bitvec![u8, Msb0; 0; blocks * N];

        let mut word = vec![0u8; data_len];
        for (block, output) in data_bits.chunks_exact(data_len).zip(encoded.chunks_mut(N)) {
            for (dst, bit) in word.iter_mut().zip(block.iter()) {
                *dst = u8::from(*bit);
            }

            let codeword = self.encode_checked(&word);
            for (i, &bit) in codeword.iter().enumerate() {
                output.set(i, bit == 1);
            }
        }

        Ok(encoded.as_raw_slice().to_vec())
    }

    /// Decodes a stream produced by `encode`, correcting one error per block,
    /// and strips the end marker and padding.
    fn decode(&self, encoded: &[u8]) -> Result<Vec<u8>> {
        if encoded.is_empty() {
            return Ok(Vec::new());
        }

        let min_bytes_needed = N.div_ceil(8);
        if encoded.len() < min_bytes_needed {
            return Err(Error::invalid_input(format!(
                "encoded data too short, need at least {} bytes",
                min_bytes_needed
            )));
        }

        let data_len = self.data_length();
        let encoded_bits = encoded.view_bits::<Msb0>();
        let blocks = encoded_bits.len() / N;
        let mut decoded = bitvec![u8, Msb0; 0; blocks * data_len];

        for (block, output) in encoded_bits.chunks_exact(N).zip(decoded.chunks_mut(data_len)) {
            let mut codeword = [0u8; N];
            for (dst, bit) in codeword.iter_mut().zip(block.iter()) {
                *dst = u8::from(*bit);
            }

            let data = self.decode_word(&codeword)?;
            for (i, &bit) in data.iter().enumerate() {
                output.set(i, bit == 1);
            }
        }

        let marker = decoded
            .last_one()
            .ok_or_else(|| Error::invalid_input("end-of-data marker not found"))?;
        if marker % 8 != 0 {
            return Err(Error::invalid_input(format!(
                "end-of-data marker at bit {} is not on a byte boundary",
                marker
            )));
        }

        decoded.truncate(marker);
        Ok(decoded.as_raw_slice().to_vec())
    }
}
