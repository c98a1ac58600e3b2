//! # framextractor
//!
//! Extract still frames from videos and convert images, then package the
//! results for download.
//!
//! `framextractor` seeks a video to a planned set of offsets, draws each
//! frame onto a reusable RGBA surface, and encodes it as PNG, JPEG, or WebP.
//! The same pipeline converts still images (WebP by default) and reports how
//! much space was saved. Several outputs are bundled into one ZIP archive.
//! Decoding is powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! ## Quick Start
//!
//! ### Extract a Batch of Frames
//!
//! ```no_run
//! use framextractor::{
//!     BatchExtractor, ExtractOptions, ExtractionRequest, OutputEncoding, Resolution, Sampling,
//!     SourceAsset, VideoSource, deliver, output::frame_archive_filename,
//! };
//!
//! let asset = SourceAsset::video("input.mp4")?;
//! let source = VideoSource::open(&asset)?;
//!
//! let request = ExtractionRequest::batch(Sampling::FixedRate(1.0))
//!     .with_resolution(Resolution::Width(1280))
//!     .with_encoding(OutputEncoding::jpeg(90));
//!
//! let mut extractor = BatchExtractor::new(source, request)?;
//! let batch = extractor.run(&ExtractOptions::new())?;
//!
//! let archive_name = frame_archive_filename(asset.display_name());
//! let delivery = deliver(batch.outputs(), &archive_name);
//! # Ok::<(), framextractor::ExtractError>(())
//! ```
//!
//! ### Convert an Image to WebP
//!
//! ```no_run
//! use framextractor::{ExtractionRequest, SourceAsset, convert_image};
//!
//! let asset = SourceAsset::image("photo.jpg")?;
//! let output = convert_image(&asset, &ExtractionRequest::image_conversion())?;
//! output.save_to(".")?;
//! println!("{:.1}% smaller", output.compression_ratio().unwrap_or(0.0));
//! # Ok::<(), framextractor::ExtractError>(())
//! ```
//!
//! ## Features
//!
//! - **Single or batch capture** at a fixed rate or a fixed frame count
//! - **Aspect-preserving rescale** to any width from 10 to 7680 pixels
//! - **PNG, JPEG, and WebP** output with a quality factor
//! - **ZIP packaging** with a per-file fallback when archiving fails
//! - **Progress & cancellation** through callbacks and a `CancellationToken`
//! - **Input validation** by MIME type and size before any work starts
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod archive;
pub mod configuration;
mod conversion;
pub mod converter;
pub mod encoding;
pub mod error;
pub mod extractor;
pub mod ffmpeg;
pub mod metadata;
pub mod output;
pub mod progress;
pub mod session;
pub mod source;
pub mod surface;
pub mod validation;
pub mod video;

pub use archive::{
    ArchiveBlob, Delivery, Package, deliver, deliver_with_options, package_archive,
    package_archive_with_options,
};
pub use configuration::{
    ExtractOptions, ExtractionMode, ExtractionRequest, MAX_TARGET_PIXELS, MAX_TARGET_WIDTH,
    MIN_TARGET_WIDTH, Resolution, Sampling,
};
pub use conversion::{compression_ratio, format_duration, format_file_size};
pub use converter::{StillImage, convert_batch, convert_image};
pub use encoding::{DEFAULT_QUALITY, OutputEncoding};
pub use error::{ExtractError, FailureKind};
pub use extractor::{BatchExtractor, FrameSource, MAX_BATCH_FRAMES, compute_timestamps};
pub use ffmpeg::set_ffmpeg_log_level;
pub use metadata::VideoMetadata;
pub use output::{BatchResult, ConversionSummary, ExtractedOutput};
pub use progress::{CancellationToken, OperationType, ProgressCallback, ProgressInfo};
pub use session::Session;
pub use source::{AssetKind, SourceAsset};
pub use surface::RasterSurface;
pub use validation::ValidationReport;
pub use video::VideoSource;
