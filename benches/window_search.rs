use carrier_grid::detector::crosses::locate_crosses_in;
use carrier_grid::detector::frame::isolate;
use carrier_grid::detector::rows::{locate_rows_in, row_profile};
use carrier_grid::segment_carrier;
use carrier_grid::tools::synthetic::SyntheticCarrier;
use carrier_grid::utils::grayscale::to_grayscale;
use carrier_grid::utils::integral::IntegralImage;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, GrayImage};

fn carrier_gray(carrier: &SyntheticCarrier) -> GrayImage {
    let config = carrier.config();
    let photo = DynamicImage::ImageRgb8(carrier.render());
    match isolate(&photo, &config.frame, &config.tilt) {
        Ok(isolated) => to_grayscale(&isolated.image),
        Err(err) => panic!("synthetic carrier has no holder: {err}"),
    }
}

fn bench_integral_image(c: &mut Criterion) {
    let gray = carrier_gray(&SyntheticCarrier::default());
    c.bench_function("integral_image_3500x2700", |b| {
        b.iter(|| IntegralImage::new(black_box(&gray)))
    });
}

fn bench_row_search(c: &mut Criterion) {
    let carrier = SyntheticCarrier::default();
    let config = carrier.config();
    let integral = IntegralImage::new(&carrier_gray(&carrier));

    c.bench_function("row_profile_3500x2700", |b| {
        b.iter(|| row_profile(black_box(&integral), 20, 2000))
    });
    c.bench_function("locate_rows_3500x2700", |b| {
        b.iter(|| locate_rows_in(black_box(&integral), black_box(&config.rows)))
    });
}

fn bench_cross_search(c: &mut Criterion) {
    let carrier = SyntheticCarrier::default();
    let config = carrier.config();
    let integral = IntegralImage::new(&carrier_gray(&carrier));
    let rows = [750usize, 1350, 1950];

    c.bench_function("locate_crosses_3_rows_3500x2700", |b| {
        b.iter(|| locate_crosses_in(black_box(&integral), black_box(&rows), black_box(&config.crosses)))
    });
}

fn bench_full_pipeline_scaled(c: &mut Criterion) {
    let carrier = SyntheticCarrier::scaled(2);
    let config = carrier.config();
    let photo = DynamicImage::ImageRgb8(carrier.render());

    c.bench_function("segment_carrier_2000x1500", |b| {
        b.iter(|| segment_carrier(black_box(&photo), black_box(&config)))
    });
}

criterion_group!(
    benches,
    bench_integral_image,
    bench_row_search,
    bench_cross_search,
    bench_full_pipeline_scaled
);
criterion_main!(benches);
