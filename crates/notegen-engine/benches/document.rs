use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use notegen_engine::editing::{locate_section, section_anchors};
use notegen_engine::{Document, clean_html};
mod common;

fn bench_parse_and_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("document");
    group.sample_size(20);

    let html = common::generate_notes_html(100);
    group.bench_function("parse", |b| {
        b.iter(|| black_box(Document::parse(black_box(&html))));
    });

    let doc = Document::parse(&html);
    group.bench_function("to_html", |b| {
        b.iter(|| black_box(doc.to_html()));
    });
    group.bench_function("clean_html", |b| {
        b.iter(|| black_box(clean_html(&doc)));
    });

    group.finish();
}

fn bench_sections(c: &mut Criterion) {
    let mut group = c.benchmark_group("sections");
    group.sample_size(20);

    let doc = Document::parse(&common::generate_notes_html(100));
    group.bench_function("section_anchors", |b| {
        b.iter(|| black_box(section_anchors(&doc)));
    });

    let anchors = section_anchors(&doc);
    group.bench_function("locate_every_section", |b| {
        b.iter(|| {
            for anchor in &anchors {
                black_box(locate_section(&doc, *anchor));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_parse_and_serialize, bench_sections);
criterion_main!(benches);
