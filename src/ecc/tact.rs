//! TDMA access channel type (TACT) field of the DMR CACH.
//!
//! The Common Announcement Channel carries 24 bits between bursts. Seven of
//! them form the TACT, a Hamming(7,4) codeword over four information bits:
//!
//! ```text
//! index  0   1   2    3    4   5   6
//!        AT  TC  LS1  LS0  H0  H1  H2
//! ```
//!
//! The remaining 17 CACH bits carry short link control fragments; see
//! [`crate::ecc::lc`] for how those are filled.

use crate::ecc::codes::HAMMING_7_4;
use crate::ecc::hamming::Correction;
use crate::ecc::Result;
use crate::error::Error;
use bitvec::prelude::*;

/// CACH length in bytes
pub const CACH_LENGTH_BYTES: usize = 3;

/// Positions of the seven TACT bits within the CACH, MSB first
pub const TACT_POSITIONS: [usize; 7] = [0, 4, 8, 12, 14, 18, 22];

/// TDMA channel the following burst belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    One,
    Two,
}

/// Link control start/stop: where this CACH sits in a short LC sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lcss {
    SingleFragment = 0,
    FirstFragment = 1,
    LastFragment = 2,
    Continuation = 3,
}

impl Lcss {
    fn from_bits(ls1: u8, ls0: u8) -> Self {
        match (ls1, ls0) {
            (0, 0) => Lcss::SingleFragment,
            (0, _) => Lcss::FirstFragment,
            (_, 0) => Lcss::LastFragment,
            _ => Lcss::Continuation,
        }
    }

    fn bits(self) -> (u8, u8) {
        let value = self as u8;
        ((value >> 1) & 1, value & 1)
    }
}

/// Decoded TACT information bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tact {
    /// AT: the inbound channel of the other slot is busy
    pub access_busy: bool,
    /// TC: slot of the burst that follows
    pub slot: Slot,
    pub lcss: Lcss,
}

impl Tact {
    pub fn new(access_busy: bool, slot: Slot, lcss: Lcss) -> Self {
        Tact {
            access_busy,
            slot,
            lcss,
        }
    }

    /// Encodes the field into its 7-bit Hamming(7,4) codeword
    pub fn encode(&self) -> [u8; 7] {
        let (ls1, ls0) = self.lcss.bits();
        let data = [
            u8::from(self.access_busy),
            u8::from(self.slot == Slot::Two),
            ls1,
            ls0,
        ];
        HAMMING_7_4.encode_checked(&data)
    }

    /// Decodes a TACT codeword, correcting a single bit error.
    ///
    /// # Returns
    ///
    /// The field and what the correction step did to the codeword
    pub fn decode(codeword: &[u8; 7]) -> Result<(Self, Correction)> {
        let (fixed, outcome) = HAMMING_7_4.correct_single_error(codeword)?;
        if let Correction::UnmappedSyndrome(syndrome) = outcome {
            return Err(Error::UnmappedSyndrome { syndrome });
        }

        let tact = Tact {
            access_busy: fixed[0] == 1,
            slot: if fixed[1] == 1 { Slot::Two } else { Slot::One },
            lcss: Lcss::from_bits(fixed[2], fixed[3]),
        };
        Ok((tact, outcome))
    }

    /// Writes the encoded field into its CACH positions, leaving the other
    /// CACH bits unchanged.
    pub fn write_cach(&self, cach: &mut [u8; CACH_LENGTH_BYTES]) {
        let codeword = self.encode();
        let bits = cach.view_bits_mut::<Msb0>();
        for (&position, &bit) in TACT_POSITIONS.iter().zip(codeword.iter()) {
            bits.set(position, bit == 1);
        }
    }

    /// Extracts and decodes the TACT from a received CACH
    pub fn read_cach(cach: &[u8; CACH_LENGTH_BYTES]) -> Result<(Self, Correction)> {
        let bits = cach.view_bits::<Msb0>();
        let mut codeword = [0u8; 7];
        for (dst, &position) in codeword.iter_mut().zip(TACT_POSITIONS.iter()) {
            *dst = u8::from(bits[position]);
        }
        Self::decode(&codeword)
    }
}
