use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dmr_hamming::ecc::ErrorCorrection;
use dmr_hamming::{HAMMING_15_11, HAMMING_7_4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn bench_correct_single_error(c: &mut Criterion) {
    let mut group = c.benchmark_group("hamming/correct");

    let mut codeword = HAMMING_15_11
        .encode_word(&[1, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0])
        .unwrap();
    codeword[2] ^= 1;
    group.bench_function("15_11", |b| {
        b.iter(|| HAMMING_15_11.correct_single_error(black_box(&codeword)))
    });

    let mut codeword = HAMMING_7_4.encode_word(&[0, 1, 0, 0]).unwrap();
    codeword[1] ^= 1;
    group.bench_function("7_4", |b| {
        b.iter(|| HAMMING_7_4.correct_single_error(black_box(&codeword)))
    });

    group.finish();
}

fn bench_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("hamming/stream");
    let mut rng = StdRng::seed_from_u64(42);

    for size in [64usize, 1024, 16384] {
        let data: Vec<u8> = (0..size).map(|_| rng.gen()).collect();
        let encoded = ErrorCorrection::encode(&HAMMING_15_11, &data).unwrap();

        group.bench_with_input(BenchmarkId::new("encode_15_11", size), &data, |b, data| {
            b.iter(|| ErrorCorrection::encode(&HAMMING_15_11, black_box(data)))
        });
        group.bench_with_input(
            BenchmarkId::new("decode_15_11", size),
            &encoded,
            |b, encoded| b.iter(|| ErrorCorrection::decode(&HAMMING_15_11, black_box(encoded))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_correct_single_error, bench_stream);
criterion_main!(benches);
