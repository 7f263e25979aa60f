//! atelier-vision 성능 벤치마크
//!
//! 실행: cargo bench -p atelier-vision
//!
//! 벤치마크 대상:
//! - 가우시안 블러 (gaussian_blur)
//! - 블러 미리보기 파이프라인 (blurred_preview)
//! - 대표 색상 추출 (dominant_colors)

use std::hint::black_box;

use atelier_vision::blur::{self, PreviewOptions};
use atelier_vision::palette::{self, PaletteOptions};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{DynamicImage, Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// 테스트용 패턴 이미지 생성
fn create_test_image(width: u32, height: u32, seed: u8) -> DynamicImage {
    let mut img = RgbaImage::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let r = (x as u8).wrapping_add(seed).wrapping_mul(17);
        let g = (y as u8).wrapping_add(seed).wrapping_mul(31);
        let b = (x as u8).wrapping_add(y as u8).wrapping_add(seed);
        *pixel = Rgba([r, g, b, 255]);
    }
    DynamicImage::ImageRgba8(img)
}

fn bench_blur(c: &mut Criterion) {
    let mut group = c.benchmark_group("gaussian_blur");

    for sigma in [4.0f32, 12.0] {
        let image = create_test_image(800, 600, 7).to_rgba8();
        group.throughput(Throughput::Elements(800 * 600));
        group.bench_with_input(
            BenchmarkId::new("800x600", format!("sigma_{sigma}")),
            &image,
            |b, image| {
                b.iter(|| black_box(blur::gaussian_blur(image, sigma)));
            },
        );
    }

    group.finish();
}

fn bench_preview(c: &mut Criterion) {
    let mut group = c.benchmark_group("blurred_preview");
    group.sample_size(20);

    let resolutions = [(1280, 720), (1920, 1080), (3840, 2160)];
    let options = PreviewOptions::default();

    for (width, height) in resolutions {
        let image = create_test_image(width, height, 42);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{width}x{height}")),
            &image,
            |b, image| {
                b.iter(|| black_box(blur::blurred_preview(image, &options)));
            },
        );
    }

    group.finish();
}

fn bench_palette(c: &mut Criterion) {
    let mut group = c.benchmark_group("dominant_colors");

    let image = create_test_image(1920, 1080, 3);
    for k in [3usize, 5, 8] {
        let options = PaletteOptions {
            k,
            ..PaletteOptions::default()
        };
        group.bench_with_input(BenchmarkId::new("1920x1080", k), &options, |b, options| {
            let mut rng = StdRng::seed_from_u64(42);
            b.iter(|| black_box(palette::dominant_colors(&image, options, &mut rng)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_blur, bench_preview, bench_palette);
criterion_main!(benches);
