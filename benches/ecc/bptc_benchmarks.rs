use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dmr_hamming::ecc::bptc::{self, BURST_LENGTH_BYTES, DATA_LENGTH_BYTES};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_bursts(count: usize) -> Vec<[u8; BURST_LENGTH_BYTES]> {
    let mut rng = StdRng::seed_from_u64(196);
    (0..count)
        .map(|_| {
            let mut data = [0u8; DATA_LENGTH_BYTES];
            rng.fill(&mut data[..]);
            let mut burst = [0u8; BURST_LENGTH_BYTES];
            bptc::encode(&data, &mut burst);
            // One channel error per burst
            let bit = rng.gen_range(0..96);
            burst[bit / 8] ^= 0x80 >> (bit % 8);
            burst
        })
        .collect()
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("bptc/decode");

    let burst = random_bursts(1)[0];
    group.bench_function("single", |b| b.iter(|| bptc::decode(black_box(&burst))));

    for count in [16usize, 256] {
        let bursts = random_bursts(count);
        group.bench_with_input(BenchmarkId::new("batch", count), &bursts, |b, bursts| {
            b.iter(|| bptc::decode_bursts(black_box(bursts)))
        });
    }

    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let data = [0x5Au8; DATA_LENGTH_BYTES];
    c.bench_function("bptc/encode", |b| {
        b.iter(|| {
            let mut burst = [0u8; BURST_LENGTH_BYTES];
            bptc::encode(black_box(&data), &mut burst);
            burst
        })
    });
}

criterion_group!(benches, bench_decode, bench_encode);
criterion_main!(benches);
