use oracle_attacks::{
    break_single_byte_xor, hamming_distance, recover_ecb_suffix, score_english, xor_with_byte,
    EcbSuffixOracle,
};

use criterion::{criterion_group, criterion_main, Criterion};

const SAMPLE: &str = "It was a bright cold day in the park and the clocks \
were striking thirteen. A keen wind chased leaves along the path while two \
men argued quietly about the price of coal, and nobody paid any attention \
to the grey van parked across the street from the bakery.";

pub fn bench_score_english(c: &mut Criterion) {
    c.bench_function("score_english", |b| b.iter(|| score_english(SAMPLE.as_bytes())));
}

pub fn bench_hamming_distance(c: &mut Criterion) {
    let left = SAMPLE.as_bytes();
    let right = xor_with_byte(left, 0x5a);
    c.bench_function("hamming_distance", |b| {
        b.iter(|| hamming_distance(left, &right))
    });
}

pub fn single_byte_xor_cracking(c: &mut Criterion) {
    let ciphertext = xor_with_byte(SAMPLE.as_bytes(), 0x35);
    c.bench_function("break_single_byte_xor", |b| {
        b.iter(|| break_single_byte_xor(&ciphertext))
    });
}

pub fn ecb_suffix_recovery(c: &mut Criterion) {
    let oracle = EcbSuffixOracle::new(b"magic words: squeamish ossifrage".to_vec());
    c.bench_function("recover_ecb_suffix", |b| {
        b.iter(|| recover_ecb_suffix(&oracle))
    });
}

criterion_group!(
    benches,
    bench_score_english,
    bench_hamming_distance,
    single_byte_xor_cracking,
    ecb_suffix_recovery,
);
criterion_main!(benches);
