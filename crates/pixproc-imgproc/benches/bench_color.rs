use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use pixproc_image::{Image, ImageSize, Rgba32};
use pixproc_imgproc::{
    color::{apply_color_matrix, grayscale, ColorMatrix, GrayscaleMode},
    enhance,
    parallel::{par_apply_with, ExecutionStrategy},
};
use rand::Rng;
use std::hint::black_box;

fn random_image(size: ImageSize) -> Image<Rgba32> {
    let mut rng = rand::rng();
    let data = (0..size.area())
        .map(|_| Rgba32::new(rng.random(), rng.random(), rng.random(), 255))
        .collect();
    Image::from_vec(size, data).unwrap()
}

fn bench_color(c: &mut Criterion) {
    let mut group = c.benchmark_group("Color");

    for (width, height) in [(256, 224), (512, 448), (1024, 896)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{width}x{height}");
        let size = ImageSize {
            width: *width,
            height: *height,
        };
        let src = random_image(size);
        let mut dst = Image::new(size);
        let rect = src.bounds();

        group.bench_with_input(
            BenchmarkId::new("grayscale_bt709", &parameter_string),
            &src,
            |b, src| {
                b.iter(|| {
                    grayscale(black_box(src), &mut dst, rect, GrayscaleMode::Bt709, None).unwrap()
                })
            },
        );

        let sepia = ColorMatrix::sepia();
        group.bench_with_input(
            BenchmarkId::new("sepia", &parameter_string),
            &src,
            |b, src| {
                b.iter(|| apply_color_matrix(black_box(src), &mut dst, rect, &sepia, None).unwrap())
            },
        );

        group.bench_with_input(
            BenchmarkId::new("brightness", &parameter_string),
            &src,
            |b, src| {
                b.iter(|| enhance::brightness(black_box(src), &mut dst, rect, 20, None).unwrap())
            },
        );

        group.bench_with_input(
            BenchmarkId::new("invert_serial", &parameter_string),
            &src,
            |b, src| {
                b.iter(|| {
                    par_apply_with(
                        ExecutionStrategy::Serial,
                        black_box(src),
                        &mut dst,
                        rect,
                        rect,
                        |_, _, p| Rgba32::new(255 - p.r(), 255 - p.g(), 255 - p.b(), p.a()),
                        None,
                    )
                    .unwrap()
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_color);
criterion_main!(benches);
