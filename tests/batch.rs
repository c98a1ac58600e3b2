//! Batch loop, progress, and cancellation tests.
//!
//! These drive [`BatchExtractor`] with a synthetic [`FrameSource`], so no
//! media fixtures are needed.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use framextractor::{
    BatchExtractor, CancellationToken, ExtractError, ExtractOptions, ExtractionRequest,
    FailureKind, OperationType, OutputEncoding, ProgressCallback, ProgressInfo, RasterSurface,
    Resolution, Sampling,
};
use image::{DynamicImage, Rgba, RgbaImage};

/// A five-second "video" whose frames are solid colours.
struct ColourBars {
    width: u32,
    height: u32,
    fail_at: Option<Duration>,
}

impl ColourBars {
    fn new() -> Self {
        Self {
            width: 64,
            height: 36,
            fail_at: None,
        }
    }
}

impl framextractor::FrameSource for ColourBars {
    fn source_dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn duration(&self) -> Duration {
        Duration::from_secs(5)
    }

    fn draw_frame(
        &mut self,
        offset: Duration,
        surface: &mut RasterSurface,
    ) -> Result<(), ExtractError> {
        if self.fail_at == Some(offset) {
            return Err(ExtractError::DecodeError(format!("corrupt packet at {offset:?}")));
        }
        let red = (offset.as_secs() * 50) as u8;
        let frame = RgbaImage::from_pixel(self.width, self.height, Rgba([red, 0, 0, 255]));
        surface.draw_image(&DynamicImage::ImageRgba8(frame))
    }
}

/// Records every report and cancels the token once `cancel_at` items are done.
struct CancelAfter {
    token: CancellationToken,
    cancel_at: u64,
    seen: Mutex<Vec<ProgressInfo>>,
}

impl ProgressCallback for CancelAfter {
    fn on_progress(&self, info: &ProgressInfo) {
        self.seen.lock().unwrap().push(info.clone());
        if info.current == self.cancel_at {
            self.token.cancel();
        }
    }
}

// ── Cancellation ───────────────────────────────────────────────────

#[test]
fn cancelling_mid_batch_keeps_captured_frames() {
    let token = CancellationToken::new();
    let progress = Arc::new(CancelAfter {
        token: token.clone(),
        cancel_at: 2,
        seen: Mutex::new(Vec::new()),
    });
    let options = ExtractOptions::new()
        .with_progress(progress.clone())
        .with_cancellation(token);

    let request = ExtractionRequest::batch(Sampling::FixedCount(5));
    let mut extractor = BatchExtractor::new(ColourBars::new(), request).unwrap();
    let batch = extractor
        .run(&options)
        .expect("cancellation must not surface as an error");

    assert_eq!(batch.len(), 2);
    assert!(batch.was_cancelled());
    assert_eq!(batch.outputs()[1].filename(), "frame_0002.png");

    let seen = progress.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|info| info.total == 5));
    assert!(
        seen.iter()
            .all(|info| info.operation == OperationType::FrameExtraction)
    );
}

#[test]
fn uncancelled_batch_reports_every_capture() {
    let token = CancellationToken::new();
    let progress = Arc::new(CancelAfter {
        token: token.clone(),
        cancel_at: u64::MAX,
        seen: Mutex::new(Vec::new()),
    });
    let options = ExtractOptions::new()
        .with_progress(progress.clone())
        .with_cancellation(token);

    let request = ExtractionRequest::batch(Sampling::FixedRate(1.0));
    let mut extractor = BatchExtractor::new(ColourBars::new(), request).unwrap();
    let batch = extractor.run(&options).unwrap();

    assert_eq!(batch.len(), 5);
    assert!(!batch.was_cancelled());

    let seen = progress.seen.lock().unwrap();
    let fractions: Vec<f32> = seen.iter().map(ProgressInfo::fraction).collect();
    assert_eq!(fractions, vec![0.2, 0.4, 0.6, 0.8, 1.0]);
    assert_eq!(seen[4].current_timestamp, Some(Duration::from_secs(4)));
}

// ── Failures ───────────────────────────────────────────────────────

#[test]
fn decode_failure_aborts_the_run() {
    let source = ColourBars {
        fail_at: Some(Duration::from_secs(3)),
        ..ColourBars::new()
    };
    let request = ExtractionRequest::batch(Sampling::FixedRate(1.0));
    let mut extractor = BatchExtractor::new(source, request).unwrap();

    let error = extractor.run(&ExtractOptions::new()).unwrap_err();
    assert_eq!(error.kind(), FailureKind::Capture);
}

#[test]
fn degenerate_source_is_rejected_before_capture() {
    let source = ColourBars {
        width: 0,
        ..ColourBars::new()
    };
    match BatchExtractor::new(source, ExtractionRequest::single()) {
        Err(ExtractError::InvalidDimensions { width: 0, .. }) => {}
        Err(other) => panic!("Expected InvalidDimensions, got: {other}"),
        Ok(_) => panic!("Expected InvalidDimensions"),
    }
}

// ── Outputs ────────────────────────────────────────────────────────

#[test]
fn outputs_follow_request_encoding_and_size() {
    let request = ExtractionRequest::batch(Sampling::FixedCount(2))
        .with_resolution(Resolution::Width(32))
        .with_encoding(OutputEncoding::jpeg(80))
        .with_timestamped_names(true);
    let mut extractor = BatchExtractor::new(ColourBars::new(), request).unwrap();
    assert_eq!(extractor.target_dimensions(), (32, 18));

    let batch = extractor.run(&ExtractOptions::new()).unwrap();
    let names: Vec<&str> = batch.iter().map(|output| output.filename()).collect();
    assert_eq!(names, ["frame_0001_0_00s.jpg", "frame_0002_2_50s.jpg"]);

    for output in &batch {
        assert_eq!(output.mime_type(), "image/jpeg");
        let decoded = image::load_from_memory(output.bytes()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 18));
    }
}

#[test]
fn single_capture_is_one_png_at_zero() {
    let mut extractor = BatchExtractor::new(ColourBars::new(), ExtractionRequest::single()).unwrap();
    let batch = extractor.run(&ExtractOptions::new()).unwrap();

    assert_eq!(batch.len(), 1);
    let output = &batch.outputs()[0];
    assert_eq!(output.filename(), "frame_0001.png");
    assert_eq!(output.timestamp(), Some(Duration::ZERO));
    assert!(output.bytes().starts_with(b"\x89PNG"));
}
