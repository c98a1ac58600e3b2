//! Internal utility functions.
//!
//! Timestamp conversion between FFmpeg time bases and [`Duration`], plus
//! the human-readable formatting shared by the library and the CLI.

use std::time::Duration;

use ffmpeg_next::Rational;

/// Rescale a PTS value from a stream time base to seconds.
pub fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64
}

/// Offset of a stream's first timestamp, as a [`Duration`].
///
/// `AV_NOPTS_VALUE` (unknown) and negative start times count as zero.
pub fn stream_start_offset(start_time: i64, time_base: Rational) -> Duration {
    if start_time <= 0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(pts_to_seconds(start_time, time_base)).unwrap_or(Duration::ZERO)
}

/// Convert a [`Duration`] to a container seek target in `AV_TIME_BASE`
/// (microseconds), as expected by `Input::seek`.
pub fn duration_to_seek_timestamp(duration: Duration) -> i64 {
    i64::try_from(duration.as_micros()).unwrap_or(i64::MAX)
}

/// Format a byte count with binary units, e.g. `1.5 KB`.
///
/// Up to two decimals are kept and trailing zeros are dropped.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let exponent = ((bytes as f64).ln() / 1024_f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024_f64.powi(exponent as i32);
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[exponent])
}

/// Format a duration as `m:ss`, e.g. `2:05`.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{}:{:02}", total / 60, total % 60)
}

/// Percentage of bytes saved by an encoding: `(original - encoded) / original * 100`.
///
/// Negative when the encoded file is larger; zero for an empty original.
pub fn compression_ratio(original_size: u64, encoded_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    (original_size as f64 - encoded_size as f64) / original_size as f64 * 100.0
}
