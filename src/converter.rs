//! Still image conversion.
//!
//! The converter is the one-frame case of extraction: decode the image,
//! draw it onto a [`RasterSurface`], encode. Results carry the original
//! and encoded sizes so a batch can be summarised.
//!
//! # Example
//!
//! ```no_run
//! use framextractor::{ExtractOptions, ExtractionRequest, SourceAsset, convert_batch};
//!
//! let assets = vec![SourceAsset::image("a.png")?, SourceAsset::image("b.jpg")?];
//! let batch = convert_batch(&assets, &ExtractionRequest::image_conversion(), &ExtractOptions::new())?;
//!
//! let summary = batch.summary();
//! println!("saved {} bytes ({:.1}%)", summary.savings(), summary.average_compression_ratio);
//! # Ok::<(), framextractor::ExtractError>(())
//! ```

use std::{
    collections::HashSet,
    time::{Duration, Instant},
};

use image::{DynamicImage, ImageReader};

use crate::{
    configuration::{ExtractOptions, ExtractionRequest},
    error::ExtractError,
    extractor::FrameSource,
    output::{BatchResult, ExtractedOutput, converted_filename, deduplicated_filename},
    progress::{OperationType, ProgressTracker},
    source::{AssetKind, SourceAsset},
    surface::RasterSurface,
};

/// A decoded still image, usable wherever a [`FrameSource`] is expected.
///
/// Every offset shows the same picture and the duration is zero.
pub struct StillImage {
    image: DynamicImage,
}

impl StillImage {
    /// Decode an image asset.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::UnsupportedInput`] if the asset is a video.
    /// - [`ExtractError::ImageError`] if the bytes cannot be decoded.
    pub fn open(asset: &SourceAsset) -> Result<Self, ExtractError> {
        if asset.kind() != AssetKind::Image {
            return Err(ExtractError::UnsupportedInput {
                name: asset.display_name().to_string(),
                reason: "expected an image file".to_string(),
            });
        }

        let image = ImageReader::open(asset.path())?
            .with_guessed_format()?
            .decode()?;
        Ok(Self { image })
    }

    /// Wrap an already decoded image.
    pub fn from_image(image: DynamicImage) -> Self {
        Self { image }
    }
}

impl FrameSource for StillImage {
    fn source_dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    fn duration(&self) -> Duration {
        Duration::ZERO
    }

    fn draw_frame(
        &mut self,
        _offset: Duration,
        surface: &mut RasterSurface,
    ) -> Result<(), ExtractError> {
        surface.draw_image(&self.image)
    }
}

/// Convert one image asset with the request's resolution and encoding.
///
/// The output is named after the asset with its extension replaced, and
/// records the asset's size for the compression ratio.
pub fn convert_image(
    asset: &SourceAsset,
    request: &ExtractionRequest,
) -> Result<ExtractedOutput, ExtractError> {
    convert_named(
        asset,
        request,
        converted_filename(asset.display_name(), request.encoding),
    )
}

fn convert_named(
    asset: &SourceAsset,
    request: &ExtractionRequest,
    filename: String,
) -> Result<ExtractedOutput, ExtractError> {
    let mut image = StillImage::open(asset)?;
    let (source_width, source_height) = image.source_dimensions();
    let (width, height) = request.resolution.resolve(source_width, source_height)?;

    let mut surface = RasterSurface::new(width, height)?;
    image.draw_frame(Duration::ZERO, &mut surface)?;
    let bytes = surface.encode(request.encoding)?;

    let output = ExtractedOutput::converted(
        filename,
        request.encoding,
        bytes,
        asset.byte_size(),
    );

    log::debug!(
        "Converted {} to {} ({} -> {} bytes)",
        asset.display_name(),
        output.filename(),
        asset.byte_size(),
        output.encoded_size(),
    );

    Ok(output)
}

/// Convert several image assets in order.
///
/// Follows the same contract as
/// [`BatchExtractor::run_batch`](crate::BatchExtractor::run_batch):
/// cancellation is checked before each image and yields a partial result;
/// the first failure aborts the batch.
///
/// Names are unique within the batch: when two sources map to the same
/// output name (`photo.png` and `photo.jpg`), later ones get a ` (N)`
/// suffix, e.g. `photo (1).webp`.
pub fn convert_batch(
    assets: &[SourceAsset],
    request: &ExtractionRequest,
    options: &ExtractOptions,
) -> Result<BatchResult, ExtractError> {
    let started = Instant::now();
    let mut tracker = ProgressTracker::new(
        options.progress.clone(),
        OperationType::ImageConversion,
        assets.len() as u64,
        options.batch_size,
    );
    let mut outputs = Vec::with_capacity(assets.len());
    let mut taken = HashSet::with_capacity(assets.len());

    for asset in assets {
        if options.is_cancelled() {
            log::warn!(
                "Conversion cancelled after {} of {} images",
                outputs.len(),
                assets.len(),
            );
            return Ok(BatchResult::new(outputs, true));
        }

        let filename = deduplicated_filename(
            &converted_filename(asset.display_name(), request.encoding),
            &taken,
        );
        taken.insert(filename.clone());
        outputs.push(convert_named(asset, request, filename)?);
        tracker.advance(None);
    }

    let batch = BatchResult::new(outputs, false);
    let summary = batch.summary();
    log::info!(
        "Converted {} images in {:.2?}, {:.1}% smaller on average",
        summary.files,
        started.elapsed(),
        summary.average_compression_ratio,
    );

    Ok(batch)
}
