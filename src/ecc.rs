//! Error correction code implementations.
//!
//! This module provides single-error-correcting parity-check codes and the
//! DMR framing structures built from them:
//! - A generic systematic parity-check code with a derived syndrome table
//! - Hamming(15,11), Hamming(13,9) and Hamming(7,4) instances
//! - CACH TACT field coding
//! - BPTC(196,96) block product code
//! - Reed-Solomon(12,9) link control check
//! - Full LC and short LC framing
//!
//! # Layout
//!
//! All codes here use a systematic layout with the data bits first and the
//! parity bits at the end of the codeword. This is not the textbook layout
//! with parity at power-of-two positions, and the bit order matters for
//! interoperability with DMR equipment.
//!
//! # Examples
//!
//! ```
//! use dmr_hamming::ecc::{Correction, HAMMING_15_11};
//!
//! let mut codeword = HAMMING_15_11.encode_word(&[1, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap();
//! let original = codeword;
//! codeword[2] ^= 1;
//!
//! let (fixed, outcome) = HAMMING_15_11.correct_single_error(&codeword).unwrap();
//! assert_eq!(fixed, original);
//! assert_eq!(outcome, Correction::Corrected(2));
//! ```

pub use crate::error::Result;

/// Trait for error correction codes operating on byte streams
pub trait ErrorCorrection {
    /// Encode data with error correction symbols
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decode data and correct errors if possible
    fn decode(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Generic systematic parity-check codes
pub mod hamming;
pub use hamming::{Correction, ParityCheckCode};

/// Fixed Hamming code instances
pub mod codes;
pub use codes::{
    hamming_13_9_correct, hamming_13_9_syndrome, hamming_15_11_correct, hamming_15_11_syndrome,
    hamming_7_4_correct, hamming_7_4_syndrome, HAMMING_13_9, HAMMING_15_11, HAMMING_7_4,
};

/// DMR CACH TACT field
pub mod tact;
pub use tact::{Lcss, Slot, Tact};

/// DMR BPTC(196,96) block product code
pub mod bptc;
pub use bptc::BptcDecoded;

/// Reed-Solomon(12,9) over GF(2^8)
pub mod rs129;

/// DMR full and short link control
pub mod lc;
pub use lc::{DataType, FullLc};
