//! Session lifecycle tests.

use std::{fs, time::Duration};

use framextractor::{
    BatchExtractor, BatchResult, ExtractError, ExtractOptions, ExtractionRequest, FrameSource,
    RasterSurface, Sampling, Session, SourceAsset,
};
use image::{DynamicImage, RgbaImage};

/// Three seconds of black.
struct Blank;

impl FrameSource for Blank {
    fn source_dimensions(&self) -> (u32, u32) {
        (16, 9)
    }

    fn duration(&self) -> Duration {
        Duration::from_secs(3)
    }

    fn draw_frame(
        &mut self,
        _offset: Duration,
        surface: &mut RasterSurface,
    ) -> Result<(), ExtractError> {
        surface.draw_image(&DynamicImage::ImageRgba8(RgbaImage::new(16, 9)))
    }
}

fn run_with(token: &framextractor::CancellationToken) -> BatchResult {
    let request = ExtractionRequest::batch(Sampling::FixedRate(1.0));
    let options = ExtractOptions::new().with_cancellation(token.clone());
    BatchExtractor::new(Blank, request).unwrap().run(&options).unwrap()
}

fn video_asset(directory: &tempfile::TempDir, name: &str) -> SourceAsset {
    let path = directory.path().join(name);
    fs::write(&path, b"stub").unwrap();
    SourceAsset::video(&path).unwrap()
}

#[test]
fn new_run_cancels_the_previous_one() {
    let mut session = Session::new();
    let first = session.begin_run();
    assert!(session.is_running());

    let second = session.begin_run();
    assert!(first.is_cancelled());
    assert!(!second.is_cancelled());
}

#[test]
fn selecting_a_source_cancels_and_discards() {
    let directory = tempfile::tempdir().unwrap();
    let mut session = Session::new();
    session.select_source(video_asset(&directory, "one.mp4"));

    let token = session.begin_run();
    session.select_source(video_asset(&directory, "two.webm"));

    assert!(token.is_cancelled());
    assert!(!session.is_running());
    assert!(session.batch().is_none());
    assert_eq!(session.source().map(SourceAsset::display_name), Some("two.webm"));
}

#[test]
fn finished_batch_replaces_the_old_one_and_reset_clears() {
    let directory = tempfile::tempdir().unwrap();
    let mut session = Session::new();
    session.select_source(video_asset(&directory, "clip.mkv"));

    let token = session.begin_run();
    assert!(session.finish_run(&token, Default::default()));
    assert!(!token.is_cancelled());
    assert!(!session.is_running());
    assert!(session.batch().is_some_and(|batch| batch.is_empty()));

    session.reset();
    assert!(session.source().is_none());
    assert!(session.batch().is_none());
}

#[test]
fn superseded_run_cannot_overwrite_the_current_one() {
    let mut session = Session::new();
    let first = session.begin_run();
    let second = session.begin_run();

    let stale = run_with(&first);
    assert!(stale.was_cancelled());
    assert!(!session.finish_run(&first, stale));

    assert!(session.is_running());
    assert!(session.batch().is_none());
    assert!(!second.is_cancelled());

    let current = run_with(&second);
    assert!(session.finish_run(&second, current));
    assert!(!session.is_running());
    assert!(session.batch().is_some_and(|batch| batch.len() == 3 && !batch.was_cancelled()));
}

#[test]
fn finishing_twice_keeps_the_first_result() {
    let mut session = Session::new();
    let token = session.begin_run();
    assert!(session.finish_run(&token, BatchResult::default()));
    assert!(!session.finish_run(&token, run_with(&token)));
    assert!(session.batch().is_some_and(BatchResult::is_empty));
}

#[test]
fn unknown_video_extension_is_rejected() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("clip.flv");
    fs::write(&path, b"stub").unwrap();

    let error = SourceAsset::video(&path).unwrap_err();
    assert_eq!(error.kind(), framextractor::FailureKind::UnsupportedInput);
}
