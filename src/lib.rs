pub mod ecc;
pub mod error;

pub use ecc::{
    bptc, codes, hamming, lc, rs129, tact, Correction, ErrorCorrection, ParityCheckCode,
    HAMMING_13_9, HAMMING_15_11, HAMMING_7_4,
};
pub use error::{Error, MatrixError, Result};
