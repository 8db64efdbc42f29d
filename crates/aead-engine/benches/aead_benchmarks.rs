// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Throughput benchmarks for the AEAD engines
//!
//! Run with: `cargo bench --package aead-engine`

use aead_common::config::{AeadConfig, ChaChaBackend, GcmMultiplierKind};
use aead_common::types::{AeadAlgorithm, Direction};
use aead_engine::gcm::{
    BasicGcmMultiplier, Tables2x256GcmMultiplier, Tables8kGcmMultiplier,
};
use aead_engine::{AeadCipher, AeadParameters, AesGcm, ChaCha20Poly1305, GcmMultiplier, RecordCipher};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const SIZES: [usize; 3] = [64, 1024, 16_384];

fn generate_test_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 256) as u8).collect()
}

/// Seal one message, rotating the nonce so GCM never sees a repeat
fn seal_once(engine: &mut dyn AeadCipher, key: &[u8], seq: &mut u64, pt: &[u8], out: &mut [u8]) {
    let mut nonce = [0u8; 12];
    nonce[4..].copy_from_slice(&seq.to_be_bytes());
    *seq += 1;
    engine
        .init(true, &AeadParameters::new(key, 128, &nonce))
        .expect("init");
    let n = engine.process_bytes(pt, out).expect("process");
    engine.do_final(&mut out[n..]).expect("final");
}

fn bench_gcm_multipliers(c: &mut Criterion) {
    let mut group = c.benchmark_group("gcm_seal");
    let key = [0x42u8; 16];

    for size in SIZES {
        let pt = generate_test_data(size);
        let mut out = vec![0u8; size + 16];
        group.throughput(Throughput::Bytes(size as u64));

        for kind in [
            GcmMultiplierKind::Basic,
            GcmMultiplierKind::Tables8k,
            GcmMultiplierKind::Tables2x256,
        ] {
            let mut engine = AesGcm::with_multiplier(kind);
            let mut seq = 0u64;
            group.bench_with_input(BenchmarkId::new(format!("{kind:?}"), size), &pt, |b, pt| {
                b.iter(|| seal_once(&mut engine, &key, &mut seq, black_box(pt), &mut out));
            });
        }
    }
    group.finish();
}

fn bench_ghash_multiply(c: &mut Criterion) {
    let mut group = c.benchmark_group("ghash_multiply_h");
    let h = [0x66u8; 16];

    let mut basic = BasicGcmMultiplier::new();
    let mut t8k = Tables8kGcmMultiplier::new();
    let mut t2x256 = Tables2x256GcmMultiplier::new();
    basic.init(&h);
    t8k.init(&h);
    t2x256.init(&h);

    let mut x = [0x5Au8; 16];
    group.bench_function("basic", |b| b.iter(|| basic.multiply_h(black_box(&mut x))));
    group.bench_function("tables8k", |b| b.iter(|| t8k.multiply_h(black_box(&mut x))));
    group.bench_function("tables2x256", |b| b.iter(|| t2x256.multiply_h(black_box(&mut x))));
    group.finish();
}

fn bench_chacha_backends(c: &mut Criterion) {
    let mut group = c.benchmark_group("chacha20_poly1305_seal");
    let key = [0x42u8; 32];

    for size in SIZES {
        let pt = generate_test_data(size);
        let mut out = vec![0u8; size + 16];
        group.throughput(Throughput::Bytes(size as u64));

        for backend in [ChaChaBackend::Scalar, ChaChaBackend::Wide] {
            let mut engine = ChaCha20Poly1305::new(backend);
            let mut seq = 0u64;
            group.bench_with_input(
                BenchmarkId::new(format!("{backend:?}"), size),
                &pt,
                |b, pt| b.iter(|| seal_once(&mut engine, &key, &mut seq, black_box(pt), &mut out)),
            );
        }
    }
    group.finish();
}

fn bench_record_open(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_open_16k");
    let size = 16_384;
    let pt = generate_test_data(size);
    let nonce = [0x07u8; 12];
    group.throughput(Throughput::Bytes(size as u64));

    for algorithm in AeadAlgorithm::ALL {
        let key = vec![0x24u8; algorithm.key_size()];
        let mut tx = RecordCipher::new(algorithm, Direction::Encrypt, &AeadConfig::THROUGHPUT);
        tx.set_key(&key).expect("key");
        let mut ct = vec![0u8; size + algorithm.tag_size()];
        tx.seal(&nonce, b"hdr", &pt, &mut ct).expect("seal");

        let mut rx = RecordCipher::new(algorithm, Direction::Decrypt, &AeadConfig::THROUGHPUT);
        rx.set_key(&key).expect("key");
        let mut out = vec![0u8; size];
        group.bench_function(algorithm.name(), |b| {
            b.iter(|| rx.open(&nonce, b"hdr", black_box(&ct), &mut out).expect("open"));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_gcm_multipliers,
    bench_ghash_multiply,
    bench_chacha_backends,
    bench_record_open
);
criterion_main!(benches);
