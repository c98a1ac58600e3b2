//! Frame capture and the batch loop.
//!
//! [`compute_timestamps`] turns a duration and an [`ExtractionRequest`]
//! into capture offsets. A [`BatchExtractor`] owns a [`FrameSource`] plus
//! the reusable [`RasterSurface`] and captures those offsets one at a time.
//!
//! # Example
//!
//! ```no_run
//! use framextractor::{
//!     BatchExtractor, ExtractOptions, ExtractionRequest, Sampling, SourceAsset, VideoSource,
//! };
//!
//! let asset = SourceAsset::video("input.mp4")?;
//! let source = VideoSource::open(&asset)?;
//! let request = ExtractionRequest::batch(Sampling::FixedCount(10));
//!
//! let mut extractor = BatchExtractor::new(source, request)?;
//! let batch = extractor.run(&ExtractOptions::new())?;
//! println!("captured {} frames", batch.len());
//! # Ok::<(), framextractor::ExtractError>(())
//! ```

use std::time::{Duration, Instant};

use crate::{
    configuration::{ExtractOptions, ExtractionMode, ExtractionRequest, Sampling},
    error::ExtractError,
    output::{BatchResult, ExtractedOutput, frame_filename},
    progress::{OperationType, ProgressTracker},
    surface::RasterSurface,
};

/// Upper bound on the number of captures in one batch.
pub const MAX_BATCH_FRAMES: usize = 50_000;

/// Something frames can be drawn from at arbitrary offsets.
///
/// Implemented by [`VideoSource`](crate::VideoSource) for real media. The
/// batch loop only relies on this trait, so tests can drive it with a
/// synthetic source.
pub trait FrameSource {
    /// Native dimensions of the frames.
    fn source_dimensions(&self) -> (u32, u32);

    /// Total duration. Zero if unknown.
    fn duration(&self) -> Duration;

    /// Position the source at `offset` and draw the frame shown there into
    /// `surface`, scaled to the surface's dimensions.
    fn draw_frame(&mut self, offset: Duration, surface: &mut RasterSurface)
    -> Result<(), ExtractError>;
}

/// Compute the capture offsets for a source of the given duration.
///
/// - Single mode yields exactly `[0]`.
/// - [`Sampling::FixedRate`] yields `0, 1/r, 2/r, ...` strictly below the
///   duration.
/// - [`Sampling::FixedCount`] yields `i * duration / n` for `i` in `0..n`.
///
/// ```
/// use std::time::Duration;
///
/// use framextractor::{ExtractionRequest, Sampling, compute_timestamps};
///
/// let request = ExtractionRequest::batch(Sampling::FixedRate(2.0));
/// let offsets = compute_timestamps(Duration::from_millis(1600), &request)?;
/// assert_eq!(offsets, vec![
///     Duration::ZERO,
///     Duration::from_millis(500),
///     Duration::from_millis(1000),
///     Duration::from_millis(1500),
/// ]);
/// # Ok::<(), framextractor::ExtractError>(())
/// ```
///
/// # Errors
///
/// Returns [`ExtractError::InvalidRequest`] in batch mode for a zero
/// duration, a rate that is not a positive finite number, a zero count, or
/// a plan longer than [`MAX_BATCH_FRAMES`].
pub fn compute_timestamps(
    duration: Duration,
    request: &ExtractionRequest,
) -> Result<Vec<Duration>, ExtractError> {
    if request.mode == ExtractionMode::Single {
        return Ok(vec![Duration::ZERO]);
    }

    if duration.is_zero() {
        return Err(ExtractError::InvalidRequest(
            "source has no duration to sample".to_string(),
        ));
    }

    let seconds = duration.as_secs_f64();

    let timestamps = match request.sampling {
        Sampling::FixedRate(rate) => {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(ExtractError::InvalidRequest(format!(
                    "frame rate must be a positive number, got {rate}"
                )));
            }
            let planned = (seconds * rate).ceil();
            check_batch_size(planned)?;
            (0..planned as usize)
                .map(|index| index as f64 / rate)
                .filter(|offset| *offset < seconds)
                .map(Duration::from_secs_f64)
                .collect()
        }
        Sampling::FixedCount(count) => {
            if count == 0 {
                return Err(ExtractError::InvalidRequest(
                    "frame count must be at least 1".to_string(),
                ));
            }
            check_batch_size(count as f64)?;
            let interval = duration / count;
            (0..count).map(|index| interval * index).collect()
        }
    };

    Ok(timestamps)
}

fn check_batch_size(planned: f64) -> Result<(), ExtractError> {
    if planned > MAX_BATCH_FRAMES as f64 {
        return Err(ExtractError::InvalidRequest(format!(
            "{planned} frames requested, the limit is {MAX_BATCH_FRAMES}"
        )));
    }
    Ok(())
}

/// Captures frames from a [`FrameSource`] according to an
/// [`ExtractionRequest`].
///
/// The extractor exclusively owns its source and surface, so captures are
/// strictly sequential.
pub struct BatchExtractor<S: FrameSource> {
    source: S,
    request: ExtractionRequest,
    surface: RasterSurface,
}

impl<S: FrameSource> BatchExtractor<S> {
    /// Prepare an extractor, sizing the surface from the request's
    /// resolution and the source's dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidDimensions`] if the source reports a
    /// zero dimension.
    pub fn new(source: S, request: ExtractionRequest) -> Result<Self, ExtractError> {
        let (source_width, source_height) = source.source_dimensions();
        let (width, height) = request.resolution.resolve(source_width, source_height)?;
        let surface = RasterSurface::new(width, height)?;

        log::debug!(
            "Prepared {width}x{height} surface for {source_width}x{source_height} source, {}",
            request.encoding,
        );

        Ok(Self {
            source,
            request,
            surface,
        })
    }

    /// The request this extractor was built for.
    pub fn request(&self) -> &ExtractionRequest {
        &self.request
    }

    /// Dimensions of the produced images.
    pub fn target_dimensions(&self) -> (u32, u32) {
        self.surface.dimensions()
    }

    /// The underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Release the extractor and return its source.
    pub fn into_source(self) -> S {
        self.source
    }

    /// Offsets this extractor's request would capture.
    pub fn timestamps(&self) -> Result<Vec<Duration>, ExtractError> {
        compute_timestamps(self.source.duration(), &self.request)
    }

    /// Capture the frame at `offset` as the `index`-th (0-based) output.
    ///
    /// # Errors
    ///
    /// Seek, decode, and encode failures from the source or encoder.
    pub fn capture_at(
        &mut self,
        index: usize,
        offset: Duration,
    ) -> Result<ExtractedOutput, ExtractError> {
        self.source.draw_frame(offset, &mut self.surface)?;
        let bytes = self.surface.encode(self.request.encoding)?;
        let filename = frame_filename(
            index,
            offset,
            self.request.encoding,
            self.request.timestamped_names,
        );

        log::debug!("Captured {filename} at {offset:?} ({} bytes)", bytes.len());

        Ok(ExtractedOutput::frame(
            filename,
            self.request.encoding,
            bytes,
            offset,
        ))
    }

    /// Capture every offset in order.
    ///
    /// Cancellation is checked before each capture. A cancelled run is not
    /// an error: it returns the outputs captured so far with
    /// [`BatchResult::was_cancelled`] set.
    ///
    /// # Errors
    ///
    /// The first capture failure aborts the run; outputs captured before it
    /// are discarded.
    pub fn run_batch(
        &mut self,
        timestamps: &[Duration],
        options: &ExtractOptions,
    ) -> Result<BatchResult, ExtractError> {
        let started = Instant::now();
        let mut tracker = ProgressTracker::new(
            options.progress.clone(),
            OperationType::FrameExtraction,
            timestamps.len() as u64,
            options.batch_size,
        );
        let mut outputs = Vec::with_capacity(timestamps.len());

        for (index, offset) in timestamps.iter().copied().enumerate() {
            if options.is_cancelled() {
                log::warn!(
                    "Extraction cancelled after {} of {} frames",
                    outputs.len(),
                    timestamps.len(),
                );
                return Ok(BatchResult::new(outputs, true));
            }

            outputs.push(self.capture_at(index, offset)?);
            tracker.advance(Some(offset));
        }

        log::info!(
            "Extracted {} frames in {:.2?}",
            outputs.len(),
            started.elapsed(),
        );

        Ok(BatchResult::new(outputs, false))
    }

    /// Compute the offsets for this request and capture them all.
    pub fn run(&mut self, options: &ExtractOptions) -> Result<BatchResult, ExtractError> {
        let timestamps = self.timestamps()?;
        self.run_batch(&timestamps, options)
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    /// Fills the surface with a shade derived from the offset.
    struct Gradient {
        draws: Vec<Duration>,
    }

    impl FrameSource for Gradient {
        fn source_dimensions(&self) -> (u32, u32) {
            (32, 18)
        }

        fn duration(&self) -> Duration {
            Duration::from_secs(4)
        }

        fn draw_frame(
            &mut self,
            offset: Duration,
            surface: &mut RasterSurface,
        ) -> Result<(), ExtractError> {
            self.draws.push(offset);
            let shade = (offset.as_millis() % 256) as u8;
            let frame = image::RgbaImage::from_pixel(32, 18, Rgba([shade, shade, shade, 255]));
            surface.draw_image(&image::DynamicImage::ImageRgba8(frame))
        }
    }

    #[test]
    fn single_mode_ignores_sampling() {
        let request = ExtractionRequest {
            sampling: Sampling::FixedRate(f64::NAN),
            ..ExtractionRequest::single()
        };
        assert_eq!(
            compute_timestamps(Duration::ZERO, &request).unwrap(),
            vec![Duration::ZERO]
        );
    }

    #[test]
    fn invalid_batches_are_rejected() {
        let duration = Duration::from_secs(10);
        for sampling in [
            Sampling::FixedRate(0.0),
            Sampling::FixedRate(-1.0),
            Sampling::FixedRate(f64::INFINITY),
            Sampling::FixedCount(0),
            Sampling::FixedRate(1_000_000.0),
        ] {
            let request = ExtractionRequest::batch(sampling);
            let error = compute_timestamps(duration, &request).unwrap_err();
            assert!(matches!(error, ExtractError::InvalidRequest(_)), "{sampling:?}");
        }

        let request = ExtractionRequest::batch(Sampling::FixedCount(3));
        assert!(compute_timestamps(Duration::ZERO, &request).is_err());
    }

    #[test]
    fn run_captures_in_order_with_sequential_names() {
        let request = ExtractionRequest::batch(Sampling::FixedCount(4));
        let mut extractor = BatchExtractor::new(Gradient { draws: Vec::new() }, request).unwrap();

        let batch = extractor.run(&ExtractOptions::new()).unwrap();

        let names: Vec<&str> = batch.iter().map(|output| output.filename()).collect();
        assert_eq!(
            names,
            ["frame_0001.png", "frame_0002.png", "frame_0003.png", "frame_0004.png"]
        );
        assert!(!batch.was_cancelled());
        assert_eq!(
            extractor.into_source().draws,
            vec![
                Duration::ZERO,
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(3),
            ]
        );
    }

    #[test]
    fn cancelled_before_start_captures_nothing() {
        let token = crate::CancellationToken::new();
        token.cancel();
        let options = ExtractOptions::new().with_cancellation(token);

        let request = ExtractionRequest::batch(Sampling::FixedRate(1.0));
        let mut extractor = BatchExtractor::new(Gradient { draws: Vec::new() }, request).unwrap();
        let batch = extractor.run(&options).unwrap();

        assert!(batch.is_empty());
        assert!(batch.was_cancelled());
        assert!(extractor.source().draws.is_empty());
    }
}
