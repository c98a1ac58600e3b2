//! FFmpeg initialisation and console verbosity.
//!
//! FFmpeg prints to stderr through its own logger, independent of the `log`
//! facade used by this crate. [`set_ffmpeg_log_level`] maps a
//! [`log::LevelFilter`] onto the closest FFmpeg level so one verbosity
//! setting drives both.

use std::path::Path;

use ffmpeg_next::util::log::Level;
use log::LevelFilter;

use crate::error::ExtractError;

/// Initialise FFmpeg. Safe to call more than once.
pub(crate) fn init(path: &Path) -> Result<(), ExtractError> {
    ffmpeg_next::init().map_err(|error| ExtractError::FileOpen {
        path: path.to_path_buf(),
        reason: format!("FFmpeg initialisation failed: {error}"),
    })
}

/// Set FFmpeg's own console verbosity.
///
/// ```no_run
/// // Only fatal FFmpeg messages.
/// framextractor::set_ffmpeg_log_level(log::LevelFilter::Off);
/// ```
pub fn set_ffmpeg_log_level(filter: LevelFilter) {
    ffmpeg_next::util::log::set_level(ffmpeg_level(filter));
}

fn ffmpeg_level(filter: LevelFilter) -> Level {
    match filter {
        LevelFilter::Off => Level::Fatal,
        LevelFilter::Error => Level::Error,
        LevelFilter::Warn => Level::Warning,
        LevelFilter::Info => Level::Info,
        LevelFilter::Debug => Level::Verbose,
        LevelFilter::Trace => Level::Debug,
    }
}
