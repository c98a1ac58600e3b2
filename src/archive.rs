//! ZIP packaging of batch outputs.
//!
//! A single output is delivered as-is. Two or more are bundled into one
//! Deflate-compressed archive that keeps every generated filename. If the
//! archive cannot be built, [`deliver`] falls back to handing the outputs
//! over individually.
//!
//! # Example
//!
//! ```no_run
//! use framextractor::{Delivery, ExtractOptions, ExtractionRequest, SourceAsset, deliver};
//!
//! let assets = vec![SourceAsset::image("a.png")?, SourceAsset::image("b.png")?];
//! let request = ExtractionRequest::image_conversion();
//! let batch = framextractor::convert_batch(&assets, &request, &ExtractOptions::new())?;
//!
//! match deliver(batch.outputs(), "converted_images.zip") {
//!     Delivery::Archive(blob) => std::fs::write(blob.filename(), blob.bytes())?,
//!     Delivery::Single(output) => std::fs::write(output.filename(), output.bytes())?,
//!     Delivery::Individual { outputs, .. } => {
//!         for output in outputs {
//!             output.save_to(".")?;
//!         }
//!     }
//! }
//! # Ok::<(), framextractor::ExtractError>(())
//! ```

use std::{
    collections::HashSet,
    fs,
    io::{Cursor, Write},
    path::{Path, PathBuf},
};

use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::{
    configuration::ExtractOptions,
    error::ExtractError,
    output::ExtractedOutput,
    progress::{OperationType, ProgressTracker},
};

/// An in-memory ZIP archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveBlob {
    filename: String,
    bytes: Vec<u8>,
    entry_count: usize,
}

impl ArchiveBlob {
    /// Name to save the archive under.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Serialized archive.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of files inside.
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Write the archive into `directory`.
    pub fn save_to<P: AsRef<Path>>(&self, directory: P) -> Result<PathBuf, ExtractError> {
        let path = directory.as_ref().join(&self.filename);
        fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Result of [`package_archive`].
#[derive(Debug, Clone, PartialEq)]
pub enum Package<'a> {
    /// Exactly one output: no archive is built.
    Single(&'a ExtractedOutput),
    /// Two or more outputs in one archive.
    Archive(ArchiveBlob),
}

/// Package outputs for download.
///
/// # Errors
///
/// - [`ExtractError::InvalidRequest`] when `outputs` is empty.
/// - [`ExtractError::ArchiveError`] when the archive cannot be written,
///   including when two outputs share a filename.
pub fn package_archive<'a>(
    outputs: &'a [ExtractedOutput],
    archive_name: &str,
) -> Result<Package<'a>, ExtractError> {
    package_archive_with_options(outputs, archive_name, &ExtractOptions::new())
}

/// Like [`package_archive`], reporting [`OperationType::Archiving`]
/// progress after each entry.
pub fn package_archive_with_options<'a>(
    outputs: &'a [ExtractedOutput],
    archive_name: &str,
    options: &ExtractOptions,
) -> Result<Package<'a>, ExtractError> {
    match outputs {
        [] => Err(ExtractError::InvalidRequest("nothing to package".to_string())),
        [single] => Ok(Package::Single(single)),
        _ => {
            let bytes = write_zip(outputs, options)?;
            log::info!(
                "Packaged {} files into {archive_name} ({} bytes)",
                outputs.len(),
                bytes.len(),
            );
            Ok(Package::Archive(ArchiveBlob {
                filename: archive_name.to_string(),
                bytes,
                entry_count: outputs.len(),
            }))
        }
    }
}

fn write_zip(outputs: &[ExtractedOutput], options: &ExtractOptions) -> Result<Vec<u8>, ExtractError> {
    let mut tracker = ProgressTracker::new(
        options.progress.clone(),
        OperationType::Archiving,
        outputs.len() as u64,
        options.batch_size,
    );
    let file_options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut seen = HashSet::with_capacity(outputs.len());

    for output in outputs {
        if !seen.insert(output.filename()) {
            return Err(ExtractError::ArchiveError(format!(
                "duplicate entry {}",
                output.filename()
            )));
        }
        writer.start_file(output.filename(), file_options)?;
        writer.write_all(output.bytes())?;
        tracker.advance(output.timestamp());
    }

    Ok(writer.finish()?.into_inner())
}

/// How outputs end up in the user's hands.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery<'a> {
    /// The only output, as-is.
    Single(&'a ExtractedOutput),
    /// All outputs in one archive.
    Archive(ArchiveBlob),
    /// Archiving failed; every output is offered on its own.
    Individual {
        /// The outputs, in order.
        outputs: &'a [ExtractedOutput],
        /// Why the archive could not be built.
        reason: String,
    },
}

/// Package outputs, falling back to individual delivery if the archive
/// cannot be built. An empty slice yields an empty `Individual` delivery.
pub fn deliver<'a>(outputs: &'a [ExtractedOutput], archive_name: &str) -> Delivery<'a> {
    deliver_with_options(outputs, archive_name, &ExtractOptions::new())
}

/// Like [`deliver`], reporting archiving progress.
pub fn deliver_with_options<'a>(
    outputs: &'a [ExtractedOutput],
    archive_name: &str,
    options: &ExtractOptions,
) -> Delivery<'a> {
    match package_archive_with_options(outputs, archive_name, options) {
        Ok(Package::Single(output)) => Delivery::Single(output),
        Ok(Package::Archive(blob)) => Delivery::Archive(blob),
        Err(error) => {
            log::warn!("Could not build {archive_name}, offering files individually: {error}");
            Delivery::Individual {
                outputs,
                reason: error.to_string(),
            }
        }
    }
}
