//! The fixed Hamming codes used by DMR.
//!
//! Each code is defined only by its parity-check equations; the decoding
//! tables are derived at compile time and a malformed matrix fails the build.
//!
//! | Code          | Used for                         |
//! |---------------|----------------------------------|
//! | Hamming(15,11)| BPTC(196,96) rows                |
//! | Hamming(13,9) | BPTC(196,96) columns             |
//! | Hamming(7,4)  | CACH TACT                        |

use crate::ecc::hamming::{positions_mask, Correction, ParityCheckCode};
use crate::ecc::Result;

const HAMMING_15_11_EQUATIONS: [u32; 4] = [
    positions_mask(&[0, 1, 2, 3, 5, 7, 8, 11]),
    positions_mask(&[1, 2, 3, 4, 6, 8, 9, 12]),
    positions_mask(&[2, 3, 4, 5, 7, 9, 10, 13]),
    positions_mask(&[0, 1, 2, 4, 6, 7, 10, 14]),
];

const HAMMING_13_9_EQUATIONS: [u32; 4] = [
    positions_mask(&[0, 1, 3, 5, 6, 9]),
    positions_mask(&[0, 1, 2, 4, 6, 7, 10]),
    positions_mask(&[0, 1, 2, 3, 5, 7, 8, 11]),
    positions_mask(&[0, 2, 4, 5, 8, 12]),
];

const HAMMING_7_4_EQUATIONS: [u32; 3] = [
    positions_mask(&[0, 1, 2, 4]),
    positions_mask(&[1, 2, 3, 5]),
    positions_mask(&[0, 1, 3, 6]),
];

/// Hamming(15,11,3): 11 data bits, parity at indices 11..=14
pub const HAMMING_15_11: ParityCheckCode<15, 4> =
    match ParityCheckCode::from_equations(HAMMING_15_11_EQUATIONS) {
        Ok(code) => code,
        Err(_) => panic!("Hamming(15,11) parity-check matrix is malformed"),
    };

/// Hamming(13,9,3): 9 data bits, parity at indices 9..=12.
///
/// Shortened from a 15-bit code, so syndromes 0x09 and 0x0B are unmapped.
pub const HAMMING_13_9: ParityCheckCode<13, 4> =
    match ParityCheckCode::from_equations(HAMMING_13_9_EQUATIONS) {
        Ok(code) => code,
        Err(_) => panic!("Hamming(13,9) parity-check matrix is malformed"),
    };

/// Hamming(7,4,3): 4 data bits, parity at indices 4..=6
pub const HAMMING_7_4: ParityCheckCode<7, 3> =
    match ParityCheckCode::from_equations(HAMMING_7_4_EQUATIONS) {
        Ok(code) => code,
        Err(_) => panic!("Hamming(7,4) parity-check matrix is malformed"),
    };

/// Computes the four Hamming(15,11) check bits of `codeword`
pub fn hamming_15_11_syndrome(codeword: &[u8; 15]) -> Result<[u8; 4]> {
    HAMMING_15_11.compute_syndrome(codeword)
}

/// Corrects at most one bit error in a Hamming(15,11) codeword
pub fn hamming_15_11_correct(codeword: &[u8; 15]) -> Result<([u8; 15], Correction)> {
    HAMMING_15_11.correct_single_error(codeword)
}

/// Computes the four Hamming(13,9) check bits of `codeword`
pub fn hamming_13_9_syndrome(codeword: &[u8; 13]) -> Result<[u8; 4]> {
    HAMMING_13_9.compute_syndrome(codeword)
}

/// Corrects at most one bit error in a Hamming(13,9) codeword.
///
/// Syndromes 0x09 and 0x0B are not produced by any single-bit error and
/// come back as [`Correction::UnmappedSyndrome`].
pub fn hamming_13_9_correct(codeword: &[u8; 13]) -> Result<([u8; 13], Correction)> {
    HAMMING_13_9.correct_single_error(codeword)
}

/// Computes the three Hamming(7,4) check bits of `codeword`
pub fn hamming_7_4_syndrome(codeword: &[u8; 7]) -> Result<[u8; 3]> {
    HAMMING_7_4.compute_syndrome(codeword)
}

/// Corrects at most one bit error in a Hamming(7,4) codeword
pub fn hamming_7_4_correct(codeword: &[u8; 7]) -> Result<([u8; 7], Correction)> {
    HAMMING_7_4.correct_single_error(codeword)
}
