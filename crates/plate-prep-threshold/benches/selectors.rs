use criterion::{black_box, criterion_group, criterion_main, Criterion};
use plate_prep_core::{GrayImage, Histogram};
use plate_prep_threshold::{binarize_all, select_thresholds, vote, ThresholdMethod};

/// Synthetic plate-like image: dark glyph strokes on a bright, noisy background.
fn synthetic_plate(width: usize, height: usize) -> GrayImage {
    let mut data = Vec::with_capacity(width * height);
    let mut seed = 0x2545_f491u32;
    for y in 0..height {
        for x in 0..width {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let noise = (seed % 21) as i32 - 10;
            let stroke = (x / 6) % 4 == 0 && (height / 5..4 * height / 5).contains(&y);
            let base = if stroke { 40 } else { 210 };
            data.push((base + noise).clamp(0, 255) as u8);
        }
    }
    GrayImage::from_raw(width, height, data).expect("valid synthetic image")
}

fn bench_selectors(c: &mut Criterion) {
    let img = synthetic_plate(320, 80);
    let view = img.view();
    let hist = Histogram::from_view(&view);

    let mut group = c.benchmark_group("selectors");
    for method in ThresholdMethod::ALL {
        group.bench_function(method.name(), |b| {
            b.iter(|| black_box(method.select(black_box(&view), &hist)))
        });
    }
    group.finish();

    c.bench_function("ensemble_vote", |b| {
        b.iter(|| {
            let report = select_thresholds(&view, &ThresholdMethod::ENSEMBLE);
            let members = binarize_all(&view, &report).expect("valid view");
            black_box(vote(&members).expect("vote"))
        })
    });
}

criterion_group!(benches, bench_selectors);
criterion_main!(benches);
