//! Source validation reports.
//!
//! Hard failures (wrong type, oversized image) are rejected when a
//! [`SourceAsset`](crate::SourceAsset) is built. Everything softer ends up
//! in a [`ValidationReport`]: huge videos, zero durations, odd frame rates.
//!
//! # Example
//!
//! ```no_run
//! use framextractor::{SourceAsset, VideoSource};
//!
//! let asset = SourceAsset::video("input.mp4")?;
//! let source = VideoSource::open(&asset)?;
//! let report = source.validate();
//! for warning in &report.warnings {
//!     eprintln!("warning: {warning}");
//! }
//! # Ok::<(), framextractor::ExtractError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;

use crate::{
    conversion::format_file_size,
    metadata::VideoMetadata,
    source::{LARGE_VIDEO_BYTES, SourceAsset},
};

/// Informational notices, warnings, and errors about a source.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Informational notices (not problems).
    pub info: Vec<String>,
    /// Issues that may make extraction slow or lossy.
    pub warnings: Vec<String>,
    /// Issues that will make extraction fail.
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Returns `true` if no errors were found. Warnings do not count.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of entries (info + warnings + errors).
    pub fn issue_count(&self) -> usize {
        self.info.len() + self.warnings.len() + self.errors.len()
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for item in &self.info {
            writeln!(f, "[INFO] {item}")?;
        }
        for item in &self.warnings {
            writeln!(f, "[WARN] {item}")?;
        }
        for item in &self.errors {
            writeln!(f, "[ERROR] {item}")?;
        }
        if self.issue_count() == 0 {
            writeln!(f, "No issues found.")?;
        }
        Ok(())
    }
}

/// Check a video asset and its probed metadata.
pub(crate) fn validate_video(asset: &SourceAsset, video: &VideoMetadata) -> ValidationReport {
    let mut report = ValidationReport::default();

    report.info.push(format!(
        "{} ({}, {})",
        asset.display_name(),
        asset.mime_type(),
        format_file_size(asset.byte_size()),
    ));

    if asset.byte_size() > LARGE_VIDEO_BYTES {
        report.warnings.push(format!(
            "Large video ({}): batch extraction may take a long time and use a lot of memory",
            format_file_size(asset.byte_size()),
        ));
    }

    if video.width == 0 || video.height == 0 {
        report.errors.push(format!(
            "Invalid video dimensions: {}x{}",
            video.width, video.height,
        ));
    }

    if video.duration == Duration::ZERO {
        report
            .warnings
            .push("Video duration is unknown: only single-frame extraction will work".to_string());
    }

    if video.frames_per_second <= 0.0 {
        report
            .warnings
            .push("Video frame rate is unknown: seeks may land on neighbouring frames".to_string());
    } else if video.frames_per_second > 240.0 {
        report.warnings.push(format!(
            "Unusually high frame rate ({:.1} fps)",
            video.frames_per_second,
        ));
    }

    report.info.push(format!(
        "Video: {} {}x{} @ {:.2} fps, {:.2}s, ~{} frames",
        video.codec,
        video.width,
        video.height,
        video.frames_per_second,
        video.duration.as_secs_f64(),
        video.frame_count,
    ));

    report
}
