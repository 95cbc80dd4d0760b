use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use build_gh_pages::copier::copy_directory;
use build_gh_pages::rewriter::{rewrite_file, rewrite_line};

const PAGE_LINE: &str =
    r#"<link rel="stylesheet" href="/assets/site.css"><a href="/docs/intro.html">Intro</a></p>"#;

/// Create a site directory with N html files
fn create_site(dir: &TempDir, count: usize) -> PathBuf {
    let src = dir.path().join("site");
    fs::create_dir_all(&src).unwrap();

    for i in 0..count {
        let subdir = src.join(format!("section{}", i % 10));
        fs::create_dir_all(&subdir).unwrap();
        fs::write(subdir.join(format!("page{}.html", i)), PAGE_LINE).unwrap();
    }

    src
}

/// Benchmark the per-line scan
fn bench_rewrite_line(c: &mut Criterion) {
    let mut out = Vec::with_capacity(256);

    c.bench_function("rewrite_line_html", |b| {
        b.iter(|| {
            out.clear();
            rewrite_line(black_box(PAGE_LINE.as_bytes()), b"/project/", &mut out)
        })
    });

    let plain = "a plain paragraph with a/b/c style text and no references at all";
    c.bench_function("rewrite_line_no_match", |b| {
        b.iter(|| {
            out.clear();
            rewrite_line(black_box(plain.as_bytes()), b"/project/", &mut out)
        })
    });
}

/// Benchmark rewriting a 1000 line file in place
fn bench_rewrite_file(c: &mut Criterion) {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("index.html");
    let content = format!("{PAGE_LINE}\n").repeat(1000);

    c.bench_function("rewrite_file_1000_lines", |b| {
        b.iter(|| {
            fs::write(&file, &content).unwrap();
            rewrite_file(black_box(&file), "/project/").unwrap()
        })
    });
}

/// Benchmark directory copy with different file counts
fn bench_copy_directory(c: &mut Criterion) {
    let mut group = c.benchmark_group("copy_directory");

    for file_count in [100, 500, 1000].iter() {
        let temp = TempDir::new().unwrap();
        let src = create_site(&temp, *file_count);
        let dst = temp.path().join("out");

        group.throughput(Throughput::Elements(*file_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(file_count),
            file_count,
            |b, _| {
                b.iter(|| {
                    let _ = fs::remove_dir_all(&dst);
                    copy_directory(black_box(&src), black_box(&dst)).unwrap()
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_rewrite_line,
    bench_rewrite_file,
    bench_copy_directory,
);
criterion_main!(benches);
