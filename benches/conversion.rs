//! Benchmarks for the text-to-EPUB pipeline.
//!
//! Run with: cargo bench

use std::hint::black_box;
use std::io::Cursor;

use criterion::{Criterion, criterion_group, criterion_main};

use txtpub::epub::{EpubConfig, generate_documents, write_epub_to_writer};
use txtpub::text::{normalize_document, segment_text};
use txtpub::{Book, Metadata};

/// A synthetic novel: 300 chapters of 40 paragraphs each.
fn sample_text() -> String {
    let mut text = String::from("本书纯属虚构，如有雷同，纯属巧合。\n\n");
    for chapter in 1..=300 {
        text.push_str(&format!("第{chapter}章 风起云涌\n"));
        for paragraph in 0..40 {
            text.push_str(&format!(
                "　　他抬头望向远方，第{paragraph}次想起那个夜晚。山风吹过，树影摇曳，一切仿佛都没有改变。\n"
            ));
        }
        text.push('\n');
    }
    text
}

fn sample_book(text: &str) -> Book {
    Book::new(
        Metadata::new("基准测试").with_author("佚名"),
        segment_text(text),
    )
}

fn bench_normalize(c: &mut Criterion) {
    let text = sample_text();
    let (gbk, _, _) = encoding_rs::GBK.encode(&text);

    c.bench_function("normalize_utf8", |b| {
        b.iter(|| normalize_document(black_box(text.as_bytes())));
    });
    c.bench_function("normalize_gbk", |b| {
        b.iter(|| normalize_document(black_box(&gbk)));
    });
}

fn bench_segment(c: &mut Criterion) {
    let text = sample_text();
    c.bench_function("segment_text", |b| {
        b.iter(|| segment_text(black_box(&text)));
    });
}

fn bench_generate(c: &mut Criterion) {
    let book = sample_book(&sample_text());
    let config = EpubConfig::new().with_modified("2024-01-01T00:00:00Z");

    c.bench_function("generate_documents", |b| {
        b.iter(|| generate_documents(black_box(&book), &config).unwrap());
    });
    c.bench_function("write_epub_to_writer", |b| {
        b.iter(|| write_epub_to_writer(black_box(&book), &config, Cursor::new(Vec::new())).unwrap());
    });
}

criterion_group!(benches, bench_normalize, bench_segment, bench_generate);
criterion_main!(benches);
