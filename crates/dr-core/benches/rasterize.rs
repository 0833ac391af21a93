use criterion::{Criterion, black_box, criterion_group, criterion_main};
use dr_core::config::RasterConfig;
use dr_core::frame::{DepthFrame, DepthUnitScale};
use dr_core::rasterize::DepthRasterizer;

fn bench_rasterize(c: &mut Criterion) {
    let (width, height) = (640u32, 480u32);
    let data: Vec<u16> = (0..width * height)
        .map(|i| ((i % width) * 3 + (i / width)) as u16)
        .collect();
    let Ok(frame) = DepthFrame::new(width, height, &data) else {
        return;
    };
    let Ok(rasterizer) = DepthRasterizer::new(RasterConfig::default()) else {
        return;
    };

    c.bench_function("rasterize_640x480_10x20", |b| {
        b.iter(|| rasterizer.rasterize(black_box(&frame), DepthUnitScale::MILLIMETER));
    });

    let Ok(fine) = DepthRasterizer::new(RasterConfig {
        tile_width: 2,
        tile_height: 4,
        ..RasterConfig::default()
    }) else {
        return;
    };
    c.bench_function("rasterize_640x480_2x4", |b| {
        b.iter(|| fine.rasterize(black_box(&frame), DepthUnitScale::MILLIMETER));
    });
}

criterion_group!(benches, bench_rasterize);
criterion_main!(benches);
