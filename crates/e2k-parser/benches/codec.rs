// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Benchmark for E2K parsing and emission on a synthetic grid model.
//!
//! Run with: cargo bench -p e2k-parser --bench codec

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use e2k_parser::{E2kDocument, EmitOptions};
use std::fmt::Write;

/// Square bay grid with one column stack per node and beams along x
fn generate_model(bays: usize, stories: usize) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "$ STORIES - IN SEQUENCE FROM TOP");
    for s in (1..=stories).rev() {
        let _ = writeln!(text, "  STORY \"Story{}\"  HEIGHT 144", s);
    }
    let _ = writeln!(text, "  STORY \"Base\"  ELEV 0");

    let nodes = bays + 1;
    let _ = writeln!(text, "\n$ POINT COORDINATES");
    for i in 0..nodes * nodes {
        let _ = writeln!(
            text,
            "  POINT \"{}\"  {}  {}",
            i + 1,
            (i % nodes) * 240,
            (i / nodes) * 240
        );
    }

    let _ = writeln!(text, "\n$ LINE CONNECTIVITIES");
    for i in 0..nodes * nodes {
        let _ = writeln!(text, "  LINE  \"C{}\"  COLUMN  \"{}\"  \"{}\"  1", i + 1, i + 1, i + 1);
        if i % nodes != bays {
            let _ = writeln!(text, "  LINE  \"B{}\"  BEAM  \"{}\"  \"{}\"  0", i + 1, i + 1, i + 2);
        }
    }

    let _ = writeln!(text, "\n$ LINE ASSIGNS");
    for s in 1..=stories {
        for i in 0..nodes * nodes {
            let _ = writeln!(
                text,
                "  LINEASSIGN  \"C{}\"  \"Story{}\"  SECTION  \"W14X90\"  MINNUMSTA 3",
                i + 1,
                s
            );
            if i % nodes != bays {
                let _ = writeln!(
                    text,
                    "  LINEASSIGN  \"B{}\"  \"Story{}\"  SECTION  \"W12X26\"  MAXSTASPC 24",
                    i + 1,
                    s
                );
            }
        }
    }

    text
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for bays in [5, 20, 50] {
        let text = generate_model(bays, 10);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(bays), &text, |b, text| {
            b.iter(|| E2kDocument::parse(black_box(text)))
        });
    }

    group.finish();
}

fn bench_emit(c: &mut Criterion) {
    let mut group = c.benchmark_group("emit");
    let options = EmitOptions::default();

    for bays in [5, 20, 50] {
        let document = E2kDocument::parse(&generate_model(bays, 10));
        group.bench_with_input(BenchmarkId::from_parameter(bays), &document, |b, document| {
            b.iter(|| black_box(document).to_e2k(&options))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_emit);
criterion_main!(benches);
