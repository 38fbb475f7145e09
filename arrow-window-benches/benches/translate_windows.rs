//! Benchmark: windowed translation vs arrow-rs raw access
//!
//! Benchmark groups:
//! - strings_in_struct: a struct-of-string column read through a struct offset
//! - list_of_list: nested variable-size lists
//! - table_scan: chunked OFFSET/LIMIT scan over several batches

use std::sync::Arc;

use arrow_window::{
    ArrayNode, ScanOptions, TableScan, Window,
    arrow_array::{
        Array, ArrayRef, Int32Array, RecordBatch, StringArray, StructArray,
        builder::{Int32Builder, ListBuilder},
        cast::AsArray,
    },
    arrow_data::ArrayData,
    arrow_schema::{Field, Schema},
};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

const ROWS: usize = (1 << 17) + 1;

fn struct_of(name: &str, child: ArrayRef) -> ArrayRef {
    let field = Arc::new(Field::new(name, child.data_type().clone(), true));
    Arc::new(StructArray::from(vec![(field, child)]))
}

fn shifted(array: &ArrayRef, offset: usize, len: usize) -> ArrayData {
    let data = array.to_data();
    ArrayData::builder(data.data_type().clone())
        .len(len)
        .offset(offset)
        .child_data(data.child_data().to_vec())
        .build()
        .unwrap()
}

fn bench_strings_in_struct(c: &mut Criterion) {
    let mut group = c.benchmark_group("strings_in_struct");
    let strings: ArrayRef = Arc::new(StringArray::from_iter_values(
        (0..ROWS).map(|i| i.to_string()),
    ));
    let column = struct_of("a", strings);

    for size in [100, 1_000, 10_000] {
        let offset = ROWS - size;
        let data = shifted(&column, offset, size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("translate", size), &data, |b, data| {
            b.iter(|| {
                let node = ArrayNode::from_data(data).unwrap();
                let values = node.translate(Window::new(0, size)).unwrap();
                black_box(values.len())
            })
        });

        // arrow-rs raw: slice the column and read the child directly
        group.bench_with_input(BenchmarkId::new("arrow_raw", size), &column, |b, column| {
            b.iter(|| {
                let sliced = column.slice(offset, size);
                let child = sliced.as_struct().column(0).as_string::<i32>();
                let mut total = 0usize;
                for i in 0..child.len() {
                    total = total.wrapping_add(child.value(i).len());
                }
                black_box(total)
            })
        });
    }

    group.finish();
}

fn bench_list_of_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_of_list");

    for size in [100, 1_000, 10_000] {
        let mut builder = ListBuilder::new(ListBuilder::new(Int32Builder::new()));
        for i in 0..size as i32 {
            let inner = builder.values();
            inner.values().append_slice(&[i, i, i]);
            inner.append(true);
            inner.append(true);
            inner.append_null();
            builder.append(true);
        }
        let data = builder.finish().to_data();
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("translate", size), &data, |b, data| {
            let node = ArrayNode::from_data(data).unwrap();
            b.iter(|| black_box(node.translate(Window::new(0, size)).unwrap()))
        });
    }

    group.finish();
}

fn bench_table_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_scan");
    let schema = Arc::new(Schema::new(vec![Field::new(
        "id",
        arrow_window::arrow_schema::DataType::Int32,
        false,
    )]));
    let batches: Vec<RecordBatch> = (0..8)
        .map(|b| {
            let ids: ArrayRef = Arc::new(Int32Array::from_iter_values(b * 4096..(b + 1) * 4096));
            RecordBatch::try_new(schema.clone(), vec![ids]).unwrap()
        })
        .collect();

    for chunk_size in [256, 2048] {
        let options = ScanOptions::new()
            .with_offset(1000)
            .with_limit(20_000)
            .with_chunk_size(chunk_size);
        let scan = TableScan::try_new(schema.clone(), &batches, options).unwrap();
        group.throughput(Throughput::Elements(scan.output_rows() as u64));

        group.bench_with_input(BenchmarkId::new("chunks", chunk_size), &scan, |b, scan| {
            b.iter(|| {
                let mut rows = 0usize;
                for chunk in scan.chunks() {
                    rows += chunk.unwrap().len();
                }
                black_box(rows)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_strings_in_struct,
    bench_list_of_list,
    bench_table_scan
);
criterion_main!(benches);
