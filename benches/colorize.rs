//! Benchmarks for nickname colorizing and outbound line splitting.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use irchuu_rs::irc::colorize::{colorize, djb2, palette_index};
use irchuu_rs::irc::splitter::split_lines;

const SHORT_NICK: &str = "bob";
const LONG_NICK: &str = "a_moderately_long_nickname_42";

fn palette(len: usize) -> Vec<String> {
    (1..=len).map(|n| n.to_string()).collect()
}

fn benchmark_djb2(c: &mut Criterion) {
    let mut group = c.benchmark_group("djb2");

    group.bench_function("short_nick", |b| {
        b.iter(|| black_box(djb2(black_box(SHORT_NICK))))
    });

    group.bench_function("long_nick", |b| {
        b.iter(|| black_box(djb2(black_box(LONG_NICK))))
    });

    group.finish();
}

fn benchmark_palette_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("palette_index");
    let fifteen = palette(15);

    group.bench_function("fifteen_colors", |b| {
        b.iter(|| black_box(palette_index(black_box(LONG_NICK), fifteen.len())))
    });

    group.finish();
}

fn benchmark_colorize(c: &mut Criterion) {
    let mut group = c.benchmark_group("colorize");
    let six = palette(6);
    let fifteen = palette(15);

    group.bench_function("six_color_palette", |b| {
        b.iter(|| black_box(colorize(black_box(SHORT_NICK), &six)))
    });

    group.bench_function("fifteen_color_palette", |b| {
        b.iter(|| black_box(colorize(black_box(LONG_NICK), &fifteen)))
    });

    group.finish();
}

fn benchmark_split_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_lines");
    let short_message = "this is a short relayed message";
    let long_message = "word ".repeat(200);

    group.bench_function("fits_in_one_line", |b| {
        b.iter(|| black_box(split_lines(black_box(short_message), 440, "<bob> ")))
    });

    group.bench_function("splits_across_several_lines", |b| {
        b.iter(|| black_box(split_lines(black_box(&long_message), 440, "<bob> ")))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_djb2,
    benchmark_palette_index,
    benchmark_colorize,
    benchmark_split_lines,
);

criterion_main!(benches);
