//! Benchmarks for search result folding and entry access.
//!
//! The mock directory serves the responses, so these measure client-side
//! work only.

#![allow(missing_docs, clippy::unwrap_used)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use ldap_proto::{ConnectionDescriptor, Connector, RawEntry};
use ldap_session::{Entry, SearchExecutor, SearchRequest};
use ldap_testing::{MockDirectory, MockSearch, fixtures};
use std::hint::black_box;

const BASE: &str = "ou=People,dc=example,dc=com";

fn people(count: usize) -> Vec<RawEntry> {
    (0..count)
        .map(|i| {
            fixtures::person(
                &format!("user{i}"),
                &format!("User {i}"),
                &format!("user{i}@example.com"),
            )
        })
        .collect()
}

/// Benchmark folding a full result list of increasing size.
fn bench_fold_list(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let descriptor = ConnectionDescriptor::parse("ldap://mock/").unwrap();
    let executor = SearchExecutor::new();
    let mut group = c.benchmark_group("fold_list");

    for count in [10usize, 100, 1000] {
        let directory = MockDirectory::builder()
            .with_search(BASE, MockSearch::entries(people(count)))
            .build();
        let request = SearchRequest::new(BASE);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.to_async(&runtime).iter(|| async {
                let mut conn = directory.initialize(&descriptor).await.unwrap();
                let outcome = executor.execute(&mut conn, &request).await.unwrap();
                black_box(outcome)
            })
        });
    }
    group.finish();
}

/// Benchmark a first-only search that stops after one entry.
fn bench_first_only(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let descriptor = ConnectionDescriptor::parse("ldap://mock/").unwrap();
    let executor = SearchExecutor::new();
    let directory = MockDirectory::builder()
        .with_search(BASE, MockSearch::entries(people(1000)))
        .build();
    let request = SearchRequest::new(BASE).first_only(true);

    c.bench_function("first_only", |b| {
        b.to_async(&runtime).iter(|| async {
            let mut conn = directory.initialize(&descriptor).await.unwrap();
            let outcome = executor.execute(&mut conn, &request).await.unwrap();
            black_box(outcome)
        })
    });
}

/// Benchmark case-insensitive attribute lookup on a converted entry.
fn bench_entry_access(c: &mut Criterion) {
    let entry = Entry::from_raw(fixtures::person("jdoe", "John Doe", "jdoe@example.com")).unwrap();

    c.bench_function("entry_get_exact_case", |b| {
        b.iter(|| black_box(entry.get_first(black_box("mail"))))
    });
    c.bench_function("entry_get_other_case", |b| {
        b.iter(|| black_box(entry.get_first(black_box("MAIL"))))
    });
}

criterion_group!(benches, bench_fold_list, bench_first_only, bench_entry_access);
criterion_main!(benches);
