//! Reed-Solomon(12,9) check used on DMR full link control.
//!
//! Nine data bytes are followed by three parity bytes over GF(2^8). Byte 0 is
//! the highest-degree coefficient of the codeword polynomial, and the
//! generator is `(x + α)(x + α²)(x + α³)`, so a valid codeword evaluates to
//! zero at `α`, `α²` and `α³`. Link control only needs the check, not
//! correction.

use log::trace;

/// Primitive polynomial for GF(2^8): x^8 + x^4 + x^3 + x^2 + 1 (0x11D)
const PRIMITIVE_POLY: u16 = 0x11D;

/// Data bytes per codeword
pub const DATA_BYTES: usize = 9;

/// Parity bytes per codeword
pub const PARITY_BYTES: usize = 3;

/// Total codeword length in bytes
pub const CODE_BYTES: usize = DATA_BYTES + PARITY_BYTES;

/// Generator coefficients below the leading 1: x^3 + 14x^2 + 56x + 64
const GENERATOR: [u8; PARITY_BYTES] = [14, 56, 64];

/// Roots of the generator: α, α², α³ with α = 2
const ROOTS: [u8; PARITY_BYTES] = [2, 4, 8];

/// Multiply two elements in GF(2^8)
fn gf_multiply(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }

    let mut result: u8 = 0;
    let mut a = a as u16;
    let mut b = b;

    while b > 0 {
        if b & 1 != 0 {
            result ^= a as u8;
        }

        b >>= 1;
        a <<= 1;

        if a & 0x100 != 0 {
            a ^= PRIMITIVE_POLY;
        }
    }

    result
}

/// Evaluates the polynomial with coefficients `bytes` (highest degree first) at `x`
fn evaluate(bytes: &[u8], x: u8) -> u8 {
    bytes
        .iter()
        .fold(0, |acc, &coefficient| gf_multiply(acc, x) ^ coefficient)
}

/// Computes the three parity bytes for nine data bytes.
///
/// # Returns
///
/// The remainder of `data(x) * x^3` divided by the generator, highest degree first
pub fn encode(data: &[u8; DATA_BYTES]) -> [u8; PARITY_BYTES] {
    let mut parity = [0u8; PARITY_BYTES];

    for &byte in data {
        let feedback = byte ^ parity[0];
        parity[0] = parity[1] ^ gf_multiply(feedback, GENERATOR[0]);
        parity[1] = parity[2] ^ gf_multiply(feedback, GENERATOR[1]);
        parity[2] = gf_multiply(feedback, GENERATOR[2]);
    }

    parity
}

/// Evaluates the codeword at each generator root; all zero for a valid codeword
pub fn syndromes(codeword: &[u8; CODE_BYTES]) -> [u8; PARITY_BYTES] {
    let mut syndromes = [0u8; PARITY_BYTES];
    for (syndrome, &root) in syndromes.iter_mut().zip(ROOTS.iter()) {
        *syndrome = evaluate(codeword, root);
    }
    trace!("RS(12,9) syndromes {:02x?}", syndromes);
    syndromes
}

/// Whether `codeword` is a valid RS(12,9) codeword
pub fn check(codeword: &[u8; CODE_BYTES]) -> bool {
    syndromes(codeword) == [0; PARITY_BYTES]
}
