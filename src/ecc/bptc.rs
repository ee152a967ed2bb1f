//! BPTC(196,96) block product turbo code used for DMR voice headers,
//! terminators and CSBKs.
//!
//! The 196 payload bits of a burst are interleaved with
//! `e[k] = raw[(181 * k) mod 196]`. Once deinterleaved they form a reserved
//! bit followed by a 13 x 15 matrix:
//!
//! ```text
//!          col 0 ........ col 10 | col 11 .. col 14
//! row 0    R R R d d ...... d    |  row parity
//! row 1-8  d d d d d ...... d    |  row parity
//! row 9-12        column parity (Hamming(13,9))
//! ```
//!
//! Rows 0-8 are Hamming(15,11) codewords, every column is a Hamming(13,9)
//! codeword. Decoding alternates column and row correction until a pass
//! changes nothing, bounded at five passes.
//!
//! # Examples
//!
//! ```
//! use dmr_hamming::ecc::bptc;
//!
//! let data = *b"Hello, DMR!!";
//! let mut burst = [0u8; bptc::BURST_LENGTH_BYTES];
//! bptc::encode(&data, &mut burst);
//!
//! burst[5] ^= 0x10;
//! let decoded = bptc::decode(&burst);
//! assert_eq!(decoded.data, data);
//! assert_eq!(decoded.corrected, 1);
//! ```

use crate::ecc::codes::{HAMMING_13_9, HAMMING_15_11};
use crate::ecc::hamming::Correction;
use bitvec::prelude::*;
use log::debug;

/// DMR burst length in bytes
pub const BURST_LENGTH_BYTES: usize = 33;

/// Information bytes carried by one BPTC(196,96) codeword
pub const DATA_LENGTH_BYTES: usize = 12;

const CODE_BITS: usize = 196;
const ROWS: usize = 13;
const COLUMNS: usize = 15;
const DATA_ROWS: usize = 9;
const INTERLEAVE_STEP: usize = 181;
const MAX_PASSES: usize = 5;

/// Burst bits holding raw bits 98 and 99, inside the sync area byte
const SPLIT_BITS: [usize; 2] = [166, 167];
/// First burst bit after the sync area
const SECOND_HALF_START: usize = 168;

/// Result of decoding one burst
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BptcDecoded {
    pub data: [u8; DATA_LENGTH_BYTES],
    /// Bit flips applied across all passes
    pub corrected: usize,
    /// Rows and columns left with an unmapped syndrome after the last pass
    pub unmapped: usize,
}

type Matrix = [u8; CODE_BITS];

fn matrix_index(row: usize, column: usize) -> usize {
    row * COLUMNS + column + 1
}

/// Matrix positions of the 96 information bits, in transmission order
fn data_positions() -> impl Iterator<Item = usize> {
    (4..=11).chain((1..DATA_ROWS).flat_map(|row| matrix_index(row, 0)..=matrix_index(row, 10)))
}

fn extract_binary(burst: &[u8; BURST_LENGTH_BYTES]) -> Matrix {
    let bits = burst.view_bits::<Msb0>();
    let mut raw = [0u8; CODE_BITS];

    for (dst, bit) in raw[..98].iter_mut().zip(bits[..98].iter()) {
        *dst = u8::from(*bit);
    }
    raw[98] = u8::from(bits[SPLIT_BITS[0]]);
    raw[99] = u8::from(bits[SPLIT_BITS[1]]);
    for (dst, bit) in raw[100..].iter_mut().zip(bits[SECOND_HALF_START..].iter()) {
        *dst = u8::from(*bit);
    }

    raw
}

fn insert_binary(raw: &Matrix, burst: &mut [u8; BURST_LENGTH_BYTES]) {
    let bits = burst.view_bits_mut::<Msb0>();

    for (i, &bit) in raw[..98].iter().enumerate() {
        bits.set(i, bit == 1);
    }
    bits.set(SPLIT_BITS[0], raw[98] == 1);
    bits.set(SPLIT_BITS[1], raw[99] == 1);
    for (i, &bit) in raw[100..].iter().enumerate() {
        bits.set(SECOND_HALF_START + i, bit == 1);
    }
}

fn deinterleave(raw: &Matrix) -> Matrix {
    let mut matrix = [0u8; CODE_BITS];
    for (a, dst) in matrix.iter_mut().enumerate() {
        *dst = raw[(a * INTERLEAVE_STEP) % CODE_BITS];
    }
    matrix
}

fn interleave(matrix: &Matrix) -> Matrix {
    let mut raw = [0u8; CODE_BITS];
    for (a, &bit) in matrix.iter().enumerate() {
        raw[(a * INTERLEAVE_STEP) % CODE_BITS] = bit;
    }
    raw
}

/// Runs the row/column correction passes, returning `(corrected, unmapped)`.
fn error_check(matrix: &mut Matrix) -> (usize, usize) {
    let mut corrected = 0;
    let mut unmapped = 0;

    for pass in 0..MAX_PASSES {
        let mut fixed_this_pass = 0;
        unmapped = 0;

        for column in 0..COLUMNS {
            let mut codeword = [0u8; ROWS];
            for (row, dst) in codeword.iter_mut().enumerate() {
                *dst = matrix[matrix_index(row, column)];
            }

            match HAMMING_13_9.correct_checked(&mut codeword) {
                Correction::Corrected(row) => {
                    matrix[matrix_index(row, column)] = codeword[row];
                    fixed_this_pass += 1;
                }
                Correction::UnmappedSyndrome(_) => unmapped += 1,
                Correction::NoError => {}
            }
        }

        for row in 0..DATA_ROWS {
            let start = matrix_index(row, 0);
            let mut codeword = [0u8; COLUMNS];
            codeword.copy_from_slice(&matrix[start..start + COLUMNS]);

            match HAMMING_15_11.correct_checked(&mut codeword) {
                Correction::Corrected(column) => {
                    matrix[start + column] = codeword[column];
                    fixed_this_pass += 1;
                }
                Correction::UnmappedSyndrome(_) => unmapped += 1,
                Correction::NoError => {}
            }
        }

        debug!(
            "BPTC pass {}: {} corrected, {} unmapped",
            pass, fixed_this_pass, unmapped
        );

        corrected += fixed_this_pass;
        if fixed_this_pass == 0 {
            break;
        }
    }

    (corrected, unmapped)
}

fn extract_data(matrix: &Matrix) -> [u8; DATA_LENGTH_BYTES] {
    let mut data = [0u8; DATA_LENGTH_BYTES];
    let bits = data.view_bits_mut::<Msb0>();
    for (i, position) in data_positions().enumerate() {
        bits.set(i, matrix[position] == 1);
    }
    data
}

/// Decodes the BPTC(196,96) payload of a 33-byte burst.
///
/// Decoding never fails on channel errors: the data is returned with counts
/// of what was corrected and what could not be.
pub fn decode(burst: &[u8; BURST_LENGTH_BYTES]) -> BptcDecoded {
    let raw = extract_binary(burst);
    let mut matrix = deinterleave(&raw);
    let (corrected, unmapped) = error_check(&mut matrix);

    BptcDecoded {
        data: extract_data(&matrix),
        corrected,
        unmapped,
    }
}

/// Encodes 12 information bytes into the payload of `burst`.
///
/// Only payload bits are written; the sync area in the middle of the burst
/// keeps whatever it held.
pub fn encode(
    data: &[u8; DATA_LENGTH_BYTES],
    burst: &mut [u8; BURST_LENGTH_BYTES],
) {
    let mut matrix = [0u8; CODE_BITS];
    for (position, bit) in data_positions().zip(data.view_bits::<Msb0>().iter()) {
        matrix[position] = u8::from(*bit);
    }

    for row in 0..DATA_ROWS {
        let start = matrix_index(row, 0);
        let codeword = HAMMING_15_11.encode_checked(&matrix[start..start + 11]);
        matrix[start..start + COLUMNS].copy_from_slice(&codeword);
    }

    for column in 0..COLUMNS {
        let mut column_data = [0u8; DATA_ROWS];
        for (row, dst) in column_data.iter_mut().enumerate() {
            *dst = matrix[matrix_index(row, column)];
        }

        let codeword = HAMMING_13_9.encode_checked(&column_data);
        for (row, &bit) in codeword.iter().enumerate().skip(DATA_ROWS) {
            matrix[matrix_index(row, column)] = bit;
        }
    }

    insert_binary(&interleave(&matrix), burst);
}

/// Decodes a batch of bursts, in parallel when the `parallel` feature is on.
pub fn decode_bursts(bursts: &[[u8; BURST_LENGTH_BYTES]]) -> Vec<BptcDecoded> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        bursts.par_iter().map(decode).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        bursts.iter().map(decode).collect()
    }
}
