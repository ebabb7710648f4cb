//! Criterion benchmarks for query evaluation and index construction.
//!
//! Run with:
//! ```bash
//! cargo bench --bench query
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use skippath::index::{Class, Kernel, StructuralIndex};
use skippath::{Evaluator, Records};

/// Generate a realistic JSON document with nested structures.
fn generate_json(approx_size: usize) -> Vec<u8> {
    let mut json = String::with_capacity(approx_size);
    json.push_str("{\"users\":[");

    let num_users = (approx_size / 150).max(1);
    for i in 0..num_users {
        if i > 0 {
            json.push(',');
        }
        json.push_str(&format!(
            "{{\"id\":{},\"name\":\"User{}\",\"email\":\"user{}@example.com\",\"active\":true,\"score\":{}}}",
            i, i, i, i * 10
        ));
    }

    json.push_str("],\"total\":");
    json.push_str(&num_users.to_string());
    json.push('}');
    json.into_bytes()
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");

    let sizes = [("1KB", 1024), ("16KB", 16 * 1024), ("256KB", 256 * 1024)];
    let queries = [
        ("first_user", "$.users[0].name"),
        ("slice", "$.users[10:20].score"),
        ("tail_key", "$.total"),
        ("iterate", "$.users[].id"),
    ];

    for (size_name, size) in sizes {
        let records = Records::single(&generate_json(size));
        let record = records.get(0).unwrap();
        group.throughput(Throughput::Bytes(record.len() as u64));

        for (query_name, query) in queries {
            let mut eval = Evaluator::new(query).unwrap();
            group.bench_with_input(
                BenchmarkId::new(query_name, size_name),
                &record,
                |b, record| b.iter(|| eval.run(black_box(record))),
            );
        }
    }

    group.finish();
}

fn bench_index_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_kernels");

    let records = Records::single(&generate_json(64 * 1024));
    let record = records.get(0).unwrap();
    let buf = record.padded_bytes();
    group.throughput(Throughput::Bytes(buf.len() as u64));

    let mut kernels = vec![("detected", skippath::index::detect()), ("swar", Kernel::Swar)];
    kernels.dedup_by_key(|(_, k)| *k);

    for (name, kernel) in kernels {
        group.bench_function(BenchmarkId::new("full_scan", name), |b| {
            b.iter(|| {
                let mut idx = StructuralIndex::with_kernel(black_box(buf), kernel);
                let mut ones = 0u32;
                for w in 0..buf.len() / 64 {
                    idx.seek(w);
                    ones += idx.bits(Class::Comma).count_ones();
                    ones += idx.bits(Class::RBrace).count_ones();
                }
                ones
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_queries, bench_index_kernels);
criterion_main!(benches);
