//! Benchmarks for full-buffer highlight passes and the per-keystroke work.
//!
//! Run with: cargo bench

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use hyperpad_core::{Document, auto_indent};
use hyperpad_syntax::{Highlighter, Language, Theme};

/// Generates a page of `blocks` repeated sections.
fn generate_html(blocks: usize) -> String {
    (0..blocks)
        .map(|i| {
            format!(
                "<div class=\"row\" id=\"r{i}\">\n  <!-- row {i} -->\n  <p>Item {i}</p>\n</div>\n"
            )
        })
        .collect()
}

fn generate_css(rules: usize) -> String {
    (0..rules)
        .map(|i| format!(".item-{i} {{\n  margin: {i}px;\n  color: #fff;\n}}\n/* rule {i} */\n"))
        .collect()
}

fn generate_js(functions: usize) -> String {
    (0..functions)
        .map(|i| {
            format!(
                "function f{i}(a) {{\n  var s = \"v{i}\";\n  return parseInt(a) + {i} || null; // done\n}}\n"
            )
        })
        .collect()
}

/// Benchmarks a complete pass per language and size.
fn bench_highlight_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("highlight_pass");

    for size in [10, 100, 1000].iter() {
        let inputs = [
            (Language::Html, generate_html(*size)),
            (Language::Css, generate_css(*size)),
            (Language::Js, generate_js(*size)),
        ];
        for (language, text) in inputs {
            let highlighter = Highlighter::new(language, Theme::light());
            group.bench_with_input(
                BenchmarkId::new(language.name(), size),
                &text,
                |b, text| b.iter(|| black_box(highlighter.highlight(black_box(text)))),
            );
        }
    }

    group.finish();
}

/// Benchmarks an edit that keeps existing colors attached to their text.
fn bench_edit_with_shift(c: &mut Criterion) {
    let mut group = c.benchmark_group("edit_with_shift");

    let text = generate_html(1000);
    let highlighter = Highlighter::new(Language::Html, Theme::dark());
    let highlights = highlighter.highlight(&text);

    group.bench_function("insert_at_middle", |b| {
        b.iter_with_setup(
            || {
                let mut document = Document::from_text(Language::Html, &text);
                document.set_highlights(highlights.clone());
                document
            },
            |mut document| {
                let mid = document.len_chars() / 2;
                document.insert(mid, black_box("x")).unwrap();
                black_box(document)
            },
        )
    });

    group.finish();
}

/// Benchmarks the backward scan done on every newline.
fn bench_auto_indent(c: &mut Criterion) {
    let mut group = c.benchmark_group("auto_indent");

    let text = generate_js(1000);
    let end = text.chars().count();

    group.bench_function("newline_at_end", |b| {
        b.iter(|| black_box(auto_indent(black_box(&text), end, "\t")))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_highlight_pass,
    bench_edit_with_shift,
    bench_auto_indent,
);

criterion_main!(benches);
