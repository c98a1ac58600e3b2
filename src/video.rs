//! FFmpeg-backed frame source.
//!
//! [`VideoSource`] opens a video [`SourceAsset`], probes its best video
//! stream, and draws the frame shown at any offset into a
//! [`RasterSurface`]. Each capture seeks to the nearest keyframe at or
//! before the offset, then decodes forward until it reaches the offset.

use std::{path::PathBuf, time::Duration};

use ffmpeg_next::{
    codec::context::Context as CodecContext,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};

use crate::{
    conversion::{duration_to_seek_timestamp, pts_to_seconds, stream_start_offset},
    error::ExtractError,
    extractor::FrameSource,
    ffmpeg,
    metadata::VideoMetadata,
    source::{AssetKind, SourceAsset},
    surface::RasterSurface,
    validation::{self, ValidationReport},
};

/// An opened video, ready for seeking and decoding.
///
/// Dropping the source releases the container and every decoder opened
/// from it.
pub struct VideoSource {
    asset: SourceAsset,
    input_context: Input,
    stream_index: usize,
    metadata: VideoMetadata,
}

impl VideoSource {
    /// Open a video asset and probe its best video stream.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::UnsupportedInput`] if the asset is not a video.
    /// - [`ExtractError::FileOpen`] if FFmpeg cannot open the container.
    /// - [`ExtractError::NoVideoStream`] if it has no video stream.
    pub fn open(asset: &SourceAsset) -> Result<Self, ExtractError> {
        if asset.kind() != AssetKind::Video {
            return Err(ExtractError::UnsupportedInput {
                name: asset.display_name().to_string(),
                reason: "expected a video file".to_string(),
            });
        }

        let path = asset.path();
        ffmpeg::init(path)?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| open_error(path, error))?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(ExtractError::NoVideoStream)?;
        let stream_index = stream.index();

        let decoder = CodecContext::from_parameters(stream.parameters())
            .and_then(|context| context.decoder().video())
            .map_err(|error| open_error(path, error))?;

        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        let frame_rate = stream.avg_frame_rate();
        let frames_per_second = if frame_rate.denominator() != 0 {
            frame_rate.numerator() as f64 / frame_rate.denominator() as f64
        } else {
            let rate = stream.rate();
            if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            }
        };

        let frame_count = if frames_per_second > 0.0 {
            (duration.as_secs_f64() * frames_per_second) as u64
        } else {
            0
        };

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second,
            frame_count,
            duration,
            codec: decoder
                .codec()
                .map(|codec| codec.name().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            format: input_context.format().name().to_string(),
        };

        log::info!(
            "Opened {}: {}x{} {} @ {:.2} fps, {:?}",
            asset.display_name(),
            metadata.width,
            metadata.height,
            metadata.codec,
            metadata.frames_per_second,
            metadata.duration,
        );

        Ok(Self {
            asset: asset.clone(),
            input_context,
            stream_index,
            metadata,
        })
    }

    /// Probed stream properties.
    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// The asset this source was opened from.
    pub fn asset(&self) -> &SourceAsset {
        &self.asset
    }

    /// Check the source for conditions that would make extraction fail or
    /// behave poorly.
    pub fn validate(&self) -> ValidationReport {
        validation::validate_video(&self.asset, &self.metadata)
    }

    /// Seek to `offset` and decode forward to the frame shown there.
    fn decode_at(&mut self, offset: Duration) -> Result<VideoFrame, ExtractError> {
        let stream = self
            .input_context
            .stream(self.stream_index)
            .ok_or(ExtractError::NoVideoStream)?;
        let time_base = stream.time_base();
        // Offsets are relative to the first frame; PTS values are not.
        let target = offset + stream_start_offset(stream.start_time(), time_base);
        let mut decoder = CodecContext::from_parameters(stream.parameters())?
            .decoder()
            .video()?;

        let target_timestamp = duration_to_seek_timestamp(target);
        self.input_context
            .seek(target_timestamp, ..target_timestamp)
            .map_err(|error| ExtractError::SeekError {
                offset,
                reason: error.to_string(),
            })?;

        // A frame is accepted once it covers the target, i.e. its start is
        // within half a frame of the offset.
        let tolerance = if self.metadata.frames_per_second > 0.0 {
            0.5 / self.metadata.frames_per_second
        } else {
            0.0
        };
        let target_seconds = target.as_secs_f64() - tolerance;

        let mut decoded_frame = VideoFrame::empty();
        let mut last_frame = VideoFrame::empty();
        let mut have_last = false;

        for (stream, packet) in self.input_context.packets() {
            if stream.index() != self.stream_index {
                continue;
            }

            decoder.send_packet(&packet)?;

            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                let pts = decoded_frame.timestamp().or(decoded_frame.pts()).unwrap_or(0);
                if pts_to_seconds(pts, time_base) >= target_seconds {
                    return Ok(decoded_frame);
                }
                std::mem::swap(&mut decoded_frame, &mut last_frame);
                have_last = true;
            }
        }

        decoder.send_eof()?;
        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            let pts = decoded_frame.timestamp().or(decoded_frame.pts()).unwrap_or(0);
            if pts_to_seconds(pts, time_base) >= target_seconds {
                return Ok(decoded_frame);
            }
            std::mem::swap(&mut decoded_frame, &mut last_frame);
            have_last = true;
        }

        // Past the end of the stream: the last decoded frame is what a
        // player would keep showing.
        if have_last {
            log::debug!("Offset {offset:?} is past the last frame, using the final one");
            return Ok(last_frame);
        }

        Err(ExtractError::DecodeError(format!(
            "no decodable frame at or after {offset:?}"
        )))
    }
}

impl FrameSource for VideoSource {
    fn source_dimensions(&self) -> (u32, u32) {
        (self.metadata.width, self.metadata.height)
    }

    fn duration(&self) -> Duration {
        self.metadata.duration
    }

    fn draw_frame(
        &mut self,
        offset: Duration,
        surface: &mut RasterSurface,
    ) -> Result<(), ExtractError> {
        let frame = self.decode_at(offset)?;
        let (width, height) = surface.dimensions();

        let mut scaler = ScalingContext::get(
            frame.format(),
            frame.width(),
            frame.height(),
            Pixel::RGBA,
            width,
            height,
            ScalingFlags::BILINEAR,
        )?;
        let mut rgba_frame = VideoFrame::empty();
        scaler.run(&frame, &mut rgba_frame)?;

        surface.copy_rgba_rows(rgba_frame.data(0), rgba_frame.stride(0))
    }
}

fn open_error(path: &std::path::Path, error: ffmpeg_next::Error) -> ExtractError {
    ExtractError::FileOpen {
        path: PathBuf::from(path),
        reason: error.to_string(),
    }
}
