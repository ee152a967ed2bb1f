use dmr_hamming::ecc::{bptc, Correction, ErrorCorrection, ParityCheckCode};
use dmr_hamming::{HAMMING_13_9, HAMMING_15_11, HAMMING_7_4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Every K-bit data word, as bit vectors
fn all_data_words(k: usize) -> impl Iterator<Item = Vec<u8>> {
    (0u32..1 << k).map(move |value| (0..k).map(|i| ((value >> i) & 1) as u8).collect())
}

fn check_exhaustive<const N: usize, const R: usize>(code: &ParityCheckCode<N, R>) {
    for data in all_data_words(code.data_length()) {
        let codeword = code.encode_word(&data).unwrap();

        let (same, outcome) = code.correct_single_error(&codeword).unwrap();
        assert_eq!(same, codeword);
        assert_eq!(outcome, Correction::NoError);

        for position in 0..N {
            let mut damaged = codeword;
            damaged[position] ^= 1;

            let (fixed, outcome) = code.correct_single_error(&damaged).unwrap();
            assert_eq!(fixed, codeword, "data {:?}, flip {}", data, position);
            assert_eq!(outcome, Correction::Corrected(position));
        }
    }
}

fn check_table<const N: usize, const R: usize>(code: &ParityCheckCode<N, R>) {
    assert_eq!(code.position_for(0), None);

    let mut seen = [false; N];
    for (syndrome, position) in code.syndrome_table() {
        assert_ne!(syndrome, 0);
        assert!(!seen[position], "position {} mapped twice", position);
        seen[position] = true;

        // The table entry is exactly the syndrome of a flip at that position
        let mut single = [0u8; N];
        single[position] = 1;
        assert_eq!(code.syndrome(&single).unwrap(), syndrome);
    }
    assert!(seen.iter().all(|&s| s));
}

#[test]
fn test_hamming_15_11_exhaustive_single_errors() {
    check_exhaustive(&HAMMING_15_11);
}

#[test]
fn test_hamming_7_4_exhaustive_single_errors() {
    check_exhaustive(&HAMMING_7_4);
}

#[test]
fn test_hamming_13_9_exhaustive_single_errors() {
    check_exhaustive(&HAMMING_13_9);
}

#[test]
fn test_syndrome_tables_are_consistent() {
    check_table(&HAMMING_15_11);
    check_table(&HAMMING_13_9);
    check_table(&HAMMING_7_4);
}

#[test]
fn test_correction_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(0x15_11);
    for _ in 0..100 {
        let data: Vec<u8> = (0..11).map(|_| rng.gen_range(0..2)).collect();
        let mut codeword = HAMMING_15_11.encode_word(&data).unwrap();
        codeword[rng.gen_range(0..15)] ^= 1;

        let (first, _) = HAMMING_15_11.correct_single_error(&codeword).unwrap();
        let (second, outcome) = HAMMING_15_11.correct_single_error(&first).unwrap();
        assert_eq!(first, second);
        assert_eq!(outcome, Correction::NoError);
    }
}

#[test]
fn test_stream_round_trip_random_data() {
    let mut rng = StdRng::seed_from_u64(42);
    for len in (1usize..=12).chain([64, 257]) {
        let data: Vec<u8> = (0..len).map(|_| rng.gen()).collect();

        let encoded = ErrorCorrection::encode(&HAMMING_15_11, &data).unwrap();
        assert_eq!(ErrorCorrection::decode(&HAMMING_15_11, &encoded).unwrap(), data);

        let encoded = ErrorCorrection::encode(&HAMMING_13_9, &data).unwrap();
        assert_eq!(ErrorCorrection::decode(&HAMMING_13_9, &encoded).unwrap(), data);

        let encoded = ErrorCorrection::encode(&HAMMING_7_4, &data).unwrap();
        assert_eq!(ErrorCorrection::decode(&HAMMING_7_4, &encoded).unwrap(), data);
    }
}

#[test]
fn test_stream_round_trip_with_block_errors() {
    let mut rng = StdRng::seed_from_u64(0x13_09);
    for len in 1usize..=12 {
        let data: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        let mut encoded = ErrorCorrection::encode(&HAMMING_15_11, &data).unwrap();

        // One flipped bit in each complete 15-bit block
        let blocks = encoded.len() * 8 / 15;
        for block in 0..blocks {
            let bit = block * 15 + rng.gen_range(0..15);
            encoded[bit / 8] ^= 0x80 >> (bit % 8);
        }
        assert_eq!(
            ErrorCorrection::decode(&HAMMING_15_11, &encoded).unwrap(),
            data,
            "len {}",
            len
        );
    }
}

#[test]
fn test_bptc_random_single_errors() {
    let mut rng = StdRng::seed_from_u64(196);
    for _ in 0..50 {
        let mut data = [0u8; bptc::DATA_LENGTH_BYTES];
        rng.fill(&mut data[..]);

        let mut burst = [0u8; bptc::BURST_LENGTH_BYTES];
        bptc::encode(&data, &mut burst);

        // Any payload bit; the 68 sync area bits sit between raw bits 97 and 98
        let payload: usize = rng.gen_range(0..196);
        let bit = if payload < 98 { payload } else { payload + 68 };
        burst[bit / 8] ^= 0x80 >> (bit % 8);

        assert_eq!(bptc::decode(&burst).data, data);
    }
}
