//! Benchmarks for timestamp planning, encoding, packaging, and video capture.
//!
//! Run with: cargo bench
//!
//! The video benchmarks need `tests/fixtures/sample_video.mp4` and are
//! skipped without it.

use std::{path::Path, time::Duration};

use criterion::{Criterion, criterion_group, criterion_main};
use framextractor::{
    BatchExtractor, ExtractError, ExtractOptions, ExtractionRequest, FrameSource, OutputEncoding,
    RasterSurface, Resolution, Sampling, SourceAsset, VideoSource, compute_timestamps,
    package_archive,
};
use image::{DynamicImage, Rgba, RgbaImage};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

/// A 1080p synthetic source so encoder cost dominates.
struct Gradient {
    frame: DynamicImage,
}

impl Gradient {
    fn new() -> Self {
        let pixels = RgbaImage::from_fn(1920, 1080, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
        });
        Self {
            frame: DynamicImage::ImageRgba8(pixels),
        }
    }
}

impl FrameSource for Gradient {
    fn source_dimensions(&self) -> (u32, u32) {
        (1920, 1080)
    }

    fn duration(&self) -> Duration {
        Duration::from_secs(60)
    }

    fn draw_frame(
        &mut self,
        _offset: Duration,
        surface: &mut RasterSurface,
    ) -> Result<(), ExtractError> {
        surface.draw_image(&self.frame)
    }
}

fn benchmark_timestamp_planning(criterion: &mut Criterion) {
    let duration = Duration::from_secs(2 * 60 * 60);

    criterion.bench_function("plan 2h at 5 fps", |bencher| {
        let request = ExtractionRequest::batch(Sampling::FixedRate(5.0));
        bencher.iter(|| compute_timestamps(duration, &request).unwrap());
    });

    criterion.bench_function("plan 10000 evenly spaced", |bencher| {
        let request = ExtractionRequest::batch(Sampling::FixedCount(10_000));
        bencher.iter(|| compute_timestamps(duration, &request).unwrap());
    });
}

fn benchmark_encoding(criterion: &mut Criterion) {
    for (label, encoding) in [
        ("png", OutputEncoding::Png),
        ("jpeg q95", OutputEncoding::jpeg(95)),
        ("webp q85", OutputEncoding::webp(85)),
    ] {
        criterion.bench_function(&format!("capture 1080p -> 640 wide {label}"), |bencher| {
            let request = ExtractionRequest::single()
                .with_resolution(Resolution::Width(640))
                .with_encoding(encoding);
            let mut extractor = BatchExtractor::new(Gradient::new(), request).unwrap();
            bencher.iter(|| extractor.capture_at(0, Duration::ZERO).unwrap());
        });
    }
}

fn benchmark_packaging(criterion: &mut Criterion) {
    let request = ExtractionRequest::batch(Sampling::FixedCount(10))
        .with_resolution(Resolution::Width(320))
        .with_encoding(OutputEncoding::jpeg(90));
    let batch = BatchExtractor::new(Gradient::new(), request)
        .unwrap()
        .run(&ExtractOptions::new())
        .unwrap();

    criterion.bench_function("zip 10 frames", |bencher| {
        bencher.iter(|| package_archive(batch.outputs(), "frames.zip").unwrap());
    });
}

fn benchmark_video_capture(criterion: &mut Criterion) {
    framextractor::set_ffmpeg_log_level(log::LevelFilter::Error);

    if !Path::new(SAMPLE_VIDEO).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }

    criterion.bench_function("capture first frame", |bencher| {
        bencher.iter(|| {
            let asset = SourceAsset::video(SAMPLE_VIDEO).unwrap();
            let source = VideoSource::open(&asset).unwrap();
            let mut extractor = BatchExtractor::new(source, ExtractionRequest::single()).unwrap();
            extractor.capture_at(0, Duration::ZERO).unwrap()
        });
    });

    criterion.bench_function("capture mid-video seek", |bencher| {
        let asset = SourceAsset::video(SAMPLE_VIDEO).unwrap();
        let source = VideoSource::open(&asset).unwrap();
        let mut extractor = BatchExtractor::new(source, ExtractionRequest::single()).unwrap();
        bencher.iter(|| extractor.capture_at(0, Duration::from_secs(3)).unwrap());
    });

    criterion.bench_function("batch of 5 at 1 fps", |bencher| {
        bencher.iter(|| {
            let asset = SourceAsset::video(SAMPLE_VIDEO).unwrap();
            let source = VideoSource::open(&asset).unwrap();
            let request = ExtractionRequest::batch(Sampling::FixedRate(1.0));
            let mut extractor = BatchExtractor::new(source, request).unwrap();
            extractor.run(&ExtractOptions::new()).unwrap()
        });
    });
}

criterion_group!(
    benches,
    benchmark_timestamp_planning,
    benchmark_encoding,
    benchmark_packaging,
    benchmark_video_capture
);
criterion_main!(benches);
