//! Performance benchmarks for the DSP module
//!
//! Run with: cargo bench -p eqalpha_dsp

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use eqalpha_dsp::{BandParams, ChainUpdate, EqSnapshot, FilterChain, ProcessContext};

fn boosted_snapshot() -> EqSnapshot {
    EqSnapshot {
        bands: [
            BandParams::new(1, 7),
            BandParams::new(4, 2),
            BandParams::new(3, 6),
            BandParams::new(5, 8),
        ],
        proportional_q: true,
        drive: 3.0,
    }
}

fn prepared_chain(frames: usize) -> FilterChain {
    let mut chain = FilterChain::new();
    chain
        .configure(ProcessContext::new(48000.0, 2, frames))
        .unwrap();
    chain.apply(&ChainUpdate::design(&boosted_snapshot(), 48000.0));
    chain
}

fn benchmark_chain_processing(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_chain");

    // Common buffer sizes in audio applications
    let buffer_sizes = [64, 128, 256, 512, 1024, 2048];

    for size in buffer_sizes {
        // Stereo buffer (interleaved)
        let sample_count = size * 2;

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("process_interleaved_{}_frames", size), |b| {
            let mut chain = prepared_chain(size);
            let mut buffer: Vec<f32> = (0..sample_count)
                .map(|i| (i as f32 * 0.001).sin())
                .collect();

            b.iter(|| {
                chain.process_interleaved(black_box(&mut buffer), 2);
            });
        });

        group.bench_function(format!("process_planar_{}_frames", size), |b| {
            let mut chain = prepared_chain(size);
            let mut left: Vec<f32> = (0..size).map(|i| (i as f32 * 0.001).sin()).collect();
            let mut right: Vec<f32> = (0..size).map(|i| (i as f32 * 0.002).sin()).collect();

            b.iter(|| {
                chain.process_planar(black_box(&mut [&mut left[..], &mut right[..]]));
            });
        });
    }

    group.finish();
}

fn benchmark_coefficient_design(c: &mut Criterion) {
    c.bench_function("chain_update_design", |b| {
        let mut snapshot = boosted_snapshot();
        let mut step = 0;

        b.iter(|| {
            // Simulate sweeping a switch
            snapshot.bands[step % 4].gain_index = step % 9;
            black_box(ChainUpdate::design(black_box(&snapshot), 48000.0));
            step += 1;
        });
    });
}

criterion_group!(benches, benchmark_chain_processing, benchmark_coefficient_design);

criterion_main!(benches);
