use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use layered_vfs::{util, ArchiveFileSystem, CollectQuery, FilePath, FileSystem, InMemoryFileSystem};
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

/// ZIP with `count` small files spread over 16 folders
fn build_zip(count: usize) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for i in 0..count {
        writer
            .start_file(format!("folder_{:02}/file_{:06}.txt", i % 16, i), options)
            .unwrap();
        writer.write_all(b"archive entry").unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Benchmark binary-search lookups against the sorted record index
fn bench_archive_lookups(c: &mut Criterion) {
    let entry_counts = vec![100, 1_000, 10_000];

    let mut group = c.benchmark_group("archive_lookups");

    for count in entry_counts {
        let archive = ArchiveFileSystem::from_reader(Cursor::new(build_zip(count))).unwrap();
        let paths: Vec<FilePath> = archive.records().iter().map(|r| r.path().clone()).collect();

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                for path in &paths {
                    black_box(archive.file_exists(path));
                }
            });
        });
    }

    group.finish();
}

/// Benchmark collecting one folder out of 16 (contiguous prefix scan)
fn bench_archive_collect(c: &mut Criterion) {
    let entry_counts = vec![1_000, 10_000];

    let mut group = c.benchmark_group("archive_collect");

    for count in entry_counts {
        let archive = ArchiveFileSystem::from_reader(Cursor::new(build_zip(count))).unwrap();
        let query = CollectQuery::files(FilePath::of("folder_07"));

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| black_box(archive.collect(&query).unwrap()));
        });
    }

    group.finish();
}

/// Same folder query against the in-memory backend, which scans every file
fn bench_memory_collect(c: &mut Criterion) {
    let entry_counts = vec![1_000, 10_000];

    let mut group = c.benchmark_group("memory_collect");

    for count in entry_counts {
        let fs = InMemoryFileSystem::new(false);
        for i in 0..count {
            let path = FilePath::of(&format!("folder_{:02}/file_{:06}.txt", i % 16, i));
            util::write_string(&fs, &path, "memory entry").unwrap();
        }
        let query = CollectQuery::files(FilePath::of("folder_07"));

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| black_box(fs.collect(&query).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_archive_lookups,
    bench_archive_collect,
    bench_memory_collect,
);
criterion_main!(benches);
