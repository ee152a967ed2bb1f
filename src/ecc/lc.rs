//! DMR link control: full LC in voice headers and terminators, short LC in
//! the CACH.
//!
//! A full LC is nine bytes protected by RS(12,9). Before the twelve bytes go
//! into BPTC(196,96) the parity bytes are XORed with a mask that depends on
//! the burst's data type, so a header cannot be mistaken for a terminator.
//!
//! ```text
//! byte 0     PF | R | FLCO (6 bits)
//! byte 1     feature ID
//! byte 2     service options
//! bytes 3-5  destination ID
//! bytes 6-8  source ID
//! ```
//!
//! A short LC is 68 bits spread over the 17 free bits of four consecutive
//! CACHs. The TACT LCSS field of each CACH marks the first, middle and last
//! fragments.
//!
//! # Examples
//!
//! ```
//! use dmr_hamming::ecc::bptc::BURST_LENGTH_BYTES;
//! use dmr_hamming::ecc::lc::{DataType, FullLc};
//!
//! let lc = FullLc::from_bytes(&[0x00, 0x00, 0x00, 0x00, 0x0C, 0x30, 0x2F, 0x9B, 0xE5]);
//! let mut burst = [0u8; BURST_LENGTH_BYTES];
//! lc.encode(DataType::VoiceLcHeader, &mut burst);
//!
//! assert_eq!(FullLc::decode(&burst, DataType::VoiceLcHeader).unwrap(), lc);
//! assert!(FullLc::decode(&burst, DataType::TerminatorWithLc).is_err());
//! ```

use crate::ecc::bptc::{self, BURST_LENGTH_BYTES, DATA_LENGTH_BYTES};
use crate::ecc::rs129::{self, DATA_BYTES, PARITY_BYTES};
use crate::ecc::tact::{Lcss, Slot, Tact, CACH_LENGTH_BYTES};
use crate::ecc::Result;
use crate::error::Error;
use bitvec::prelude::*;
use log::{debug, warn};

/// Bytes of a short LC as handed to the CACH interleaver
pub const SHORT_LC_BYTES: usize = 9;

/// Short LC bits actually carried; the last four bits of the ninth byte are dropped
pub const SHORT_LC_BITS: usize = 68;

/// CACHs needed to carry one short LC
pub const CACH_FRAGMENTS: usize = 4;

/// Bytes of four CACHs, TACT bits included
pub const INTERLEAVED_BYTES: usize = CACH_FRAGMENTS * CACH_LENGTH_BYTES;

/// CACH bits not owned by the TACT
const CACH_PAYLOAD_MASK: [u8; CACH_LENGTH_BYTES] = [0x77, 0x75, 0xDD];

/// Bit `i` of the short LC goes to bit `CACH_INTERLEAVE[i]` of the four CACHs
pub const CACH_INTERLEAVE: [usize; SHORT_LC_BITS] = [
    1, 2, 3, 5, 6, 7, 9, 10, 11, 13, 15, 16, 17, 19, 20, 21, 23, //
    25, 26, 27, 29, 30, 31, 33, 34, 35, 37, 39, 40, 41, 43, 44, 45, 47, //
    49, 50, 51, 53, 54, 55, 57, 58, 59, 61, 63, 64, 65, 67, 68, 69, 71, //
    73, 74, 75, 77, 78, 79, 81, 82, 83, 85, 87, 88, 89, 91, 92, 93, 95,
];

/// Burst data types that carry a full LC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    VoiceLcHeader = 1,
    TerminatorWithLc = 2,
}

impl DataType {
    /// Mask XORed over the RS(12,9) parity bytes
    pub fn crc_mask(self) -> [u8; PARITY_BYTES] {
        match self {
            DataType::VoiceLcHeader => [0x96; PARITY_BYTES],
            DataType::TerminatorWithLc => [0x99; PARITY_BYTES],
        }
    }

    fn apply_mask(self, bytes: &mut [u8; DATA_LENGTH_BYTES]) {
        for (byte, mask) in bytes[DATA_BYTES..].iter_mut().zip(self.crc_mask()) {
            *byte ^= mask;
        }
    }
}

/// Full link control fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullLc {
    /// PF: protect flag
    pub protect: bool,
    pub reserved: bool,
    /// Full LC opcode, 6 bits
    pub flco: u8,
    pub feature_id: u8,
    pub service_options: u8,
    /// Destination (talkgroup or unit), 24 bits
    pub dst_id: u32,
    /// Source unit, 24 bits
    pub src_id: u32,
}

fn read_id(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0, |acc, &b| (acc << 8) | u32::from(b))
}

fn write_id(id: u32, bytes: &mut [u8]) {
    for (i, byte) in bytes.iter_mut().rev().enumerate() {
        *byte = (id >> (8 * i)) as u8;
    }
}

impl FullLc {
    /// Parses the nine LC bytes
    pub fn from_bytes(bytes: &[u8; DATA_BYTES]) -> Self {
        FullLc {
            protect: bytes[0] & 0x80 != 0,
            reserved: bytes[0] & 0x40 != 0,
            flco: bytes[0] & 0x3F,
            feature_id: bytes[1],
            service_options: bytes[2],
            dst_id: read_id(&bytes[3..6]),
            src_id: read_id(&bytes[6..9]),
        }
    }

    /// Packs the fields into nine bytes; FLCO and the IDs are truncated to their widths
    pub fn to_bytes(&self) -> [u8; DATA_BYTES] {
        let mut bytes = [0u8; DATA_BYTES];
        bytes[0] = (u8::from(self.protect) << 7)
            | (u8::from(self.reserved) << 6)
            | (self.flco & 0x3F);
        bytes[1] = self.feature_id;
        bytes[2] = self.service_options;
        write_id(self.dst_id, &mut bytes[3..6]);
        write_id(self.src_id, &mut bytes[6..9]);
        bytes
    }

    /// Decodes a full LC from a voice header or terminator burst.
    ///
    /// # Arguments
    ///
    /// * `burst` - The 33-byte burst
    /// * `data_type` - Data type from the slot type field, selects the parity mask
    ///
    /// # Returns
    ///
    /// The LC fields, or `Error::LinkControlCheck` when the RS(12,9) check
    /// fails after BPTC correction
    pub fn decode(burst: &[u8; BURST_LENGTH_BYTES], data_type: DataType) -> Result<Self> {
        let decoded = bptc::decode(burst);
        let mut bytes = decoded.data;
        data_type.apply_mask(&mut bytes);

        let syndromes = rs129::syndromes(&bytes);
        if syndromes != [0; PARITY_BYTES] {
            warn!(
                "{:?} LC failed RS(12,9) check after {} BPTC corrections",
                data_type, decoded.corrected
            );
            return Err(Error::LinkControlCheck { syndromes });
        }

        let mut lc = [0u8; DATA_BYTES];
        lc.copy_from_slice(&bytes[..DATA_BYTES]);
        let lc = Self::from_bytes(&lc);
        debug!(
            "{:?} LC: FLCO {:#04x}, {} -> {}",
            data_type, lc.flco, lc.src_id, lc.dst_id
        );
        Ok(lc)
    }

    /// Encodes the LC with RS(12,9) parity and the data type mask into the
    /// payload of `burst`.
    pub fn encode(&self, data_type: DataType, burst: &mut [u8; BURST_LENGTH_BYTES]) {
        let lc = self.to_bytes();
        let mut bytes = [0u8; DATA_LENGTH_BYTES];
        bytes[..DATA_BYTES].copy_from_slice(&lc);
        bytes[DATA_BYTES..].copy_from_slice(&rs129::encode(&lc));
        data_type.apply_mask(&mut bytes);

        bptc::encode(&bytes, burst);
    }
}

/// Spreads a short LC over the payload bits of four CACHs
pub fn interleave_short_lc(data: &[u8; SHORT_LC_BYTES]) -> [u8; INTERLEAVED_BYTES] {
    let mut interleaved = [0u8; INTERLEAVED_BYTES];
    let src = data.view_bits::<Msb0>();
    let dst = interleaved.view_bits_mut::<Msb0>();
    for (i, &position) in CACH_INTERLEAVE.iter().enumerate() {
        dst.set(position, src[i]);
    }
    interleaved
}

/// Gathers a short LC back from the payload bits of four CACHs
pub fn deinterleave_short_lc(interleaved: &[u8; INTERLEAVED_BYTES]) -> [u8; SHORT_LC_BYTES] {
    let mut data = [0u8; SHORT_LC_BYTES];
    let src = interleaved.view_bits::<Msb0>();
    let dst = data.view_bits_mut::<Msb0>();
    for (i, &position) in CACH_INTERLEAVE.iter().enumerate() {
        dst.set(i, src[position]);
    }
    data
}

/// LCSS value for fragment `index` of a four-CACH short LC
pub fn fragment_lcss(index: usize) -> Lcss {
    match index {
        0 => Lcss::FirstFragment,
        i if i == CACH_FRAGMENTS - 1 => Lcss::LastFragment,
        _ => Lcss::Continuation,
    }
}

/// Builds the CACH carrying fragment `index` of an interleaved short LC.
///
/// # Arguments
///
/// * `interleaved` - Output of [`interleave_short_lc`]
/// * `index` - Fragment number, 0 to 3
/// * `access_busy` - TACT AT bit
/// * `slot` - Slot of the burst that follows
pub fn cach_for_fragment(
    interleaved: &[u8; INTERLEAVED_BYTES],
    index: usize,
    access_busy: bool,
    slot: Slot,
) -> Result<[u8; CACH_LENGTH_BYTES]> {
    if index >= CACH_FRAGMENTS {
        return Err(Error::invalid_input(format!(
            "short LC fragment {} out of range, expected 0..{}",
            index, CACH_FRAGMENTS
        )));
    }

    let start = index * CACH_LENGTH_BYTES;
    let mut cach = [0u8; CACH_LENGTH_BYTES];
    cach.copy_from_slice(&interleaved[start..start + CACH_LENGTH_BYTES]);
    Tact::new(access_busy, slot, fragment_lcss(index)).write_cach(&mut cach);
    Ok(cach)
}

/// Reassembles a short LC from four received CACHs.
///
/// Each TACT is corrected on the way; the fragments must arrive as first,
/// continuation, continuation, last.
pub fn short_lc_from_cachs(
    cachs: &[[u8; CACH_LENGTH_BYTES]; CACH_FRAGMENTS],
) -> Result<([u8; SHORT_LC_BYTES], [Tact; CACH_FRAGMENTS])> {
    let mut interleaved = [0u8; INTERLEAVED_BYTES];
    let mut tacts = [Tact::new(false, Slot::One, Lcss::SingleFragment); CACH_FRAGMENTS];

    for (index, (cach, chunk)) in cachs
        .iter()
        .zip(interleaved.chunks_exact_mut(CACH_LENGTH_BYTES))
        .enumerate()
    {
        let (tact, _) = Tact::read_cach(cach)?;
        if tact.lcss != fragment_lcss(index) {
            return Err(Error::invalid_input(format!(
                "CACH {} has LCSS {:?}, expected {:?}",
                index,
                tact.lcss,
                fragment_lcss(index)
            )));
        }
        tacts[index] = tact;

        for ((dst, &byte), &mask) in chunk.iter_mut().zip(cach).zip(&CACH_PAYLOAD_MASK) {
            *dst = byte & mask;
        }
    }

    Ok((deinterleave_short_lc(&interleaved), tacts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecc::tact::TACT_POSITIONS;

    const LC_BYTES: [u8; DATA_BYTES] = [0xC3, 0x10, 0x20, 0x00, 0x0C, 0x30, 0x2F, 0x9B, 0xE5];

    const SHORT_LC: [u8; SHORT_LC_BYTES] = [0x3A, 0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xE0];

    #[test]
    fn test_field_layout() {
        let lc = FullLc::from_bytes(&LC_BYTES);
        assert!(lc.protect);
        assert!(lc.reserved);
        assert_eq!(lc.flco, 0x03);
        assert_eq!(lc.feature_id, 0x10);
        assert_eq!(lc.service_options, 0x20);
        assert_eq!(lc.dst_id, 0x000C30);
        assert_eq!(lc.src_id, 0x2F9BE5);
        assert_eq!(lc.to_bytes(), LC_BYTES);
    }

    #[test]
    fn test_full_lc_through_burst() {
        let lc = FullLc::from_bytes(&LC_BYTES);
        for data_type in [DataType::VoiceLcHeader, DataType::TerminatorWithLc] {
            let mut burst = [0u8; BURST_LENGTH_BYTES];
            lc.encode(data_type, &mut burst);
            assert_eq!(FullLc::decode(&burst, data_type).unwrap(), lc);

            // A single channel error is repaired by the BPTC before the check
            burst[30] ^= 0x04;
            assert_eq!(FullLc::decode(&burst, data_type).unwrap(), lc);
        }
    }

    #[test]
    fn test_parity_mask_depends_on_data_type() {
        let lc = FullLc::from_bytes(&LC_BYTES);
        let mut burst = [0u8; BURST_LENGTH_BYTES];
        lc.encode(DataType::VoiceLcHeader, &mut burst);

        let bytes = bptc::decode(&burst).data;
        let parity = rs129::encode(&LC_BYTES);
        for i in 0..PARITY_BYTES {
            assert_eq!(bytes[DATA_BYTES + i], parity[i] ^ 0x96);
        }

        // Header and terminator masks differ by 0x0F in every parity byte
        assert_eq!(
            FullLc::decode(&burst, DataType::TerminatorWithLc),
            Err(Error::LinkControlCheck {
                syndromes: rs129::syndromes(&{
                    let mut masked = bytes;
                    DataType::TerminatorWithLc.apply_mask(&mut masked);
                    masked
                })
            })
        );
    }

    #[test]
    fn test_missing_parity_fails_check() {
        let mut bytes = [0u8; DATA_LENGTH_BYTES];
        bytes[..DATA_BYTES].copy_from_slice(&LC_BYTES);
        let mut burst = [0u8; BURST_LENGTH_BYTES];
        bptc::encode(&bytes, &mut burst);

        assert!(matches!(
            FullLc::decode(&burst, DataType::VoiceLcHeader),
            Err(Error::LinkControlCheck { .. })
        ));
    }

    #[test]
    fn test_cach_interleave_avoids_tact() {
        for pair in CACH_INTERLEAVE.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        for &position in &CACH_INTERLEAVE {
            assert!(position < INTERLEAVED_BYTES * 8);
            assert!(!TACT_POSITIONS.contains(&(position % 24)), "bit {}", position);
        }
    }

    #[test]
    fn test_short_lc_drops_last_nibble() {
        let mut data = SHORT_LC;
        data[8] |= 0x0F;
        assert_eq!(deinterleave_short_lc(&interleave_short_lc(&data)), SHORT_LC);
    }

    #[test]
    fn test_short_lc_through_cachs() {
        let interleaved = interleave_short_lc(&SHORT_LC);
        let mut cachs = [[0u8; CACH_LENGTH_BYTES]; CACH_FRAGMENTS];
        for (index, cach) in cachs.iter_mut().enumerate() {
            *cach = cach_for_fragment(&interleaved, index, true, Slot::Two).unwrap();

            let start = index * CACH_LENGTH_BYTES;
            for i in 0..CACH_LENGTH_BYTES {
                assert_eq!(cach[i] & CACH_PAYLOAD_MASK[i], interleaved[start + i]);
            }
        }

        // A TACT error in one fragment is corrected
        cachs[2][0] ^= 0x80;

        let (data, tacts) = short_lc_from_cachs(&cachs).unwrap();
        assert_eq!(data, SHORT_LC);
        let lcss: Vec<Lcss> = tacts.iter().map(|t| t.lcss).collect();
        assert_eq!(
            lcss,
            [
                Lcss::FirstFragment,
                Lcss::Continuation,
                Lcss::Continuation,
                Lcss::LastFragment
            ]
        );
        assert!(tacts.iter().all(|t| t.access_busy && t.slot == Slot::Two));
    }

    #[test]
    fn test_fragment_out_of_range() {
        let interleaved = interleave_short_lc(&SHORT_LC);
        assert!(matches!(
            cach_for_fragment(&interleaved, CACH_FRAGMENTS, false, Slot::One),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_fragments_out_of_order() {
        let interleaved = interleave_short_lc(&SHORT_LC);
        let mut cachs = [[0u8; CACH_LENGTH_BYTES]; CACH_FRAGMENTS];
        for (index, cach) in cachs.iter_mut().enumerate() {
            *cach = cach_for_fragment(&interleaved, index, false, Slot::One).unwrap();
        }
        cachs.swap(0, 3);

        assert!(matches!(
            short_lc_from_cachs(&cachs),
            Err(Error::InvalidInput(_))
        ));
    }
}
