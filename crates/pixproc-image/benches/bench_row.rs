use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pixproc_image::{
    row::{decode_row, decode_row_words, encode_row},
    ComponentOrder, Endianness, Rgba32,
};
use std::hint::black_box;

fn bench_row(c: &mut Criterion) {
    let mut group = c.benchmark_group("RowCodec");

    for width in [256, 1920, 4096] {
        for order in [ComponentOrder::Rgb, ComponentOrder::Bgra] {
            let bytes = (0..order.row_len(width, 0))
                .map(|i| (i % 251) as u8)
                .collect::<Vec<_>>();
            let mut pixels = vec![Rgba32::TRANSPARENT; width];
            let parameter = format!("{width}_{order}");

            group.throughput(Throughput::Bytes(bytes.len() as u64));

            group.bench_with_input(
                BenchmarkId::new("decode_bytes", &parameter),
                &bytes,
                |b, bytes| b.iter(|| decode_row(black_box(bytes), order, &mut pixels)),
            );

            group.bench_with_input(
                BenchmarkId::new("decode_words", &parameter),
                &bytes,
                |b, bytes| {
                    b.iter(|| {
                        decode_row_words(black_box(bytes), order, Endianness::NATIVE, &mut pixels)
                    })
                },
            );

            let mut out = vec![0u8; bytes.len()];
            group.bench_function(BenchmarkId::new("encode_bytes", &parameter), |b| {
                b.iter(|| encode_row(black_box(&pixels), order, &mut out))
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_row);
criterion_main!(benches);
