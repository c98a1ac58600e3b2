//! Video metadata.
//!
//! Probed once when a [`VideoSource`](crate::VideoSource) is opened and
//! cached for its lifetime.

use std::time::Duration;

use crate::conversion::format_duration;

/// Properties of the selected video stream.
///
/// # Example
///
/// ```no_run
/// use framextractor::{SourceAsset, VideoSource};
///
/// let asset = SourceAsset::video("input.mp4")?;
/// let source = VideoSource::open(&asset)?;
/// let metadata = source.metadata();
/// println!("{}x{} for {:?}", metadata.width, metadata.height, metadata.duration);
/// # Ok::<(), framextractor::ExtractError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second (approximate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Estimated total number of frames, from duration and frame rate.
    pub frame_count: u64,
    /// Total duration. Zero when the container does not report one.
    pub duration: Duration,
    /// Codec name (e.g. `"h264"`, `"vp9"`).
    pub codec: String,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`).
    pub format: String,
}

impl VideoMetadata {
    /// Human-readable duration, e.g. `2:05`.
    pub fn duration_label(&self) -> String {
        format_duration(self.duration)
    }

    /// Width divided by height, or zero for a degenerate stream.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            0.0
        } else {
            self.width as f64 / self.height as f64
        }
    }
}
