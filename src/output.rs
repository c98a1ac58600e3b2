//! Extracted outputs and batch results.
//!
//! An [`ExtractedOutput`] is one encoded image plus its generated filename.
//! Outputs are immutable once created. A [`BatchResult`] is the ordered set
//! produced by one run.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{conversion, encoding::OutputEncoding, error::ExtractError};

/// One encoded result plus metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedOutput {
    filename: String,
    encoding: OutputEncoding,
    bytes: Vec<u8>,
    timestamp: Option<Duration>,
    original_size: Option<u64>,
}

impl ExtractedOutput {
    /// A frame captured from a video at `timestamp`.
    pub(crate) fn frame(
        filename: String,
        encoding: OutputEncoding,
        bytes: Vec<u8>,
        timestamp: Duration,
    ) -> Self {
        Self {
            filename,
            encoding,
            bytes,
            timestamp: Some(timestamp),
            original_size: None,
        }
    }

    /// A converted still image whose source was `original_size` bytes.
    pub(crate) fn converted(
        filename: String,
        encoding: OutputEncoding,
        bytes: Vec<u8>,
        original_size: u64,
    ) -> Self {
        Self {
            filename,
            encoding,
            bytes,
            timestamp: None,
            original_size: Some(original_size),
        }
    }

    /// Generated filename, including the extension of [`encoding`](Self::encoding).
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Encoding the bytes were produced with.
    pub fn encoding(&self) -> OutputEncoding {
        self.encoding
    }

    /// MIME type of the bytes.
    pub fn mime_type(&self) -> &'static str {
        self.encoding.mime_type()
    }

    /// Encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size of the encoded bytes.
    pub fn encoded_size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Capture offset, for frames taken from a video.
    pub fn timestamp(&self) -> Option<Duration> {
        self.timestamp
    }

    /// Size of the source file, for converted images.
    pub fn original_size(&self) -> Option<u64> {
        self.original_size
    }

    /// Percentage saved relative to the source file, for converted images.
    pub fn compression_ratio(&self) -> Option<f64> {
        self.original_size
            .map(|original| conversion::compression_ratio(original, self.encoded_size()))
    }

    /// Write the bytes into `directory` under the generated filename.
    pub fn save_to<P: AsRef<Path>>(&self, directory: P) -> Result<PathBuf, ExtractError> {
        let path = directory.as_ref().join(&self.filename);
        fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// The ordered outputs of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    outputs: Vec<ExtractedOutput>,
    cancelled: bool,
}

impl BatchResult {
    pub(crate) fn new(outputs: Vec<ExtractedOutput>, cancelled: bool) -> Self {
        Self { outputs, cancelled }
    }

    /// Outputs in capture order.
    pub fn outputs(&self) -> &[ExtractedOutput] {
        &self.outputs
    }

    /// Take ownership of the outputs.
    pub fn into_outputs(self) -> Vec<ExtractedOutput> {
        self.outputs
    }

    /// Number of outputs.
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// `true` when nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// `true` when the run stopped early because its token was cancelled.
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Iterate over the outputs.
    pub fn iter(&self) -> std::slice::Iter<'_, ExtractedOutput> {
        self.outputs.iter()
    }

    /// Totals over converted images. Frames without an original size are
    /// ignored.
    pub fn summary(&self) -> ConversionSummary {
        let converted: Vec<&ExtractedOutput> = self
            .outputs
            .iter()
            .filter(|output| output.original_size.is_some())
            .collect();

        let original_bytes: u64 = converted.iter().filter_map(|o| o.original_size).sum();
        let encoded_bytes: u64 = converted.iter().map(|o| o.encoded_size()).sum();
        let average_compression_ratio = if converted.is_empty() {
            0.0
        } else {
            converted
                .iter()
                .filter_map(|o| o.compression_ratio())
                .sum::<f64>()
                / converted.len() as f64
        };

        ConversionSummary {
            files: converted.len(),
            original_bytes,
            encoded_bytes,
            average_compression_ratio,
        }
    }
}

impl<'a> IntoIterator for &'a BatchResult {
    type Item = &'a ExtractedOutput;
    type IntoIter = std::slice::Iter<'a, ExtractedOutput>;

    fn into_iter(self) -> Self::IntoIter {
        self.outputs.iter()
    }
}

/// Aggregate statistics of an image conversion batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionSummary {
    /// Number of converted files.
    pub files: usize,
    /// Total size of the sources.
    pub original_bytes: u64,
    /// Total size of the outputs.
    pub encoded_bytes: u64,
    /// Mean of the per-file compression ratios.
    pub average_compression_ratio: f64,
}

impl ConversionSummary {
    /// Bytes saved overall. Negative when the outputs grew.
    pub fn savings(&self) -> i64 {
        self.original_bytes as i64 - self.encoded_bytes as i64
    }
}

/// Filename of the `index`-th (0-based) frame of a run.
///
/// Frames are numbered from 1 and zero-padded to four digits. With
/// `timestamped`, the offset is appended with two decimals and the decimal
/// point replaced by an underscore.
///
/// ```
/// use std::time::Duration;
///
/// use framextractor::{OutputEncoding, output::frame_filename};
///
/// let plain = frame_filename(0, Duration::ZERO, OutputEncoding::Png, false);
/// assert_eq!(plain, "frame_0001.png");
///
/// let stamped = frame_filename(2, Duration::from_millis(2500), OutputEncoding::jpeg(90), true);
/// assert_eq!(stamped, "frame_0003_2_50s.jpg");
/// ```
pub fn frame_filename(
    index: usize,
    timestamp: Duration,
    encoding: OutputEncoding,
    timestamped: bool,
) -> String {
    let sequence = index + 1;
    if timestamped {
        let seconds = format!("{:.2}", timestamp.as_secs_f64()).replace('.', "_");
        format!("frame_{sequence:04}_{seconds}s.{}", encoding.extension())
    } else {
        format!("frame_{sequence:04}.{}", encoding.extension())
    }
}

/// Filename of a converted image: the source name with its extension
/// replaced by the target one.
///
/// ```
/// use framextractor::{OutputEncoding, output::converted_filename};
///
/// assert_eq!(converted_filename("holiday.photo.JPG", OutputEncoding::webp(85)), "holiday.photo.webp");
/// assert_eq!(converted_filename("scan", OutputEncoding::Png), "scan.png");
/// ```
pub fn converted_filename(source_name: &str, encoding: OutputEncoding) -> String {
    let stem = match source_name.rfind('.') {
        Some(position) if position > 0 => &source_name[..position],
        _ => source_name,
    };
    format!("{stem}.{}", encoding.extension())
}

/// `name`, or `name` with ` (N)` inserted before the extension if it is
/// already in `taken`. `N` counts up from 1 until the name is free.
///
/// ```
/// use std::collections::HashSet;
///
/// use framextractor::output::deduplicated_filename;
///
/// let taken: HashSet<String> = ["photo.webp".to_string(), "photo (1).webp".to_string()].into();
/// assert_eq!(deduplicated_filename("photo.webp", &taken), "photo (2).webp");
/// assert_eq!(deduplicated_filename("other.webp", &taken), "other.webp");
/// ```
pub fn deduplicated_filename(name: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(name) {
        return name.to_string();
    }
    let (stem, extension) = match name.rfind('.') {
        Some(position) if position > 0 => name.split_at(position),
        _ => (name, ""),
    };
    (1..)
        .map(|counter| format!("{stem} ({counter}){extension}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| name.to_string())
}

/// Archive name for frames taken from `source_name`.
///
/// The extension is dropped and every character outside `[a-z0-9]` becomes
/// an underscore, so the name is safe on every filesystem.
///
/// ```
/// use framextractor::output::frame_archive_filename;
///
/// assert_eq!(frame_archive_filename("My Clip (1).mp4"), "frames_my_clip__1_.zip");
/// ```
pub fn frame_archive_filename(source_name: &str) -> String {
    let stem = match source_name.rfind('.') {
        Some(position) if position > 0 => &source_name[..position],
        _ => source_name,
    };
    let sanitized: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("frames_{sanitized}.zip")
}

/// Archive name used for image conversion batches.
pub const CONVERTED_ARCHIVE_FILENAME: &str = "converted_images.zip";
