use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use framextractor::{
    BatchExtractor, CancellationToken, DEFAULT_QUALITY, Delivery, ExtractOptions,
    ExtractedOutput, ExtractionRequest, OperationType, OutputEncoding, ProgressCallback,
    ProgressInfo, Resolution, Sampling, Session, SourceAsset, VideoSource, convert_batch,
    deliver_with_options, format_duration, format_file_size,
    output::{CONVERTED_ARCHIVE_FILENAME, frame_archive_filename},
};
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framextractor probe input.mp4 --json\n  framextractor frames input.mp4 --out frames --mode batch --fps 2 --progress\n  framextractor frames input.mp4 --out frames --mode batch --count 12 --width 640 --format jpg\n  framextractor convert a.png b.jpg --out converted --archive\n  framextractor completions zsh > _framextractor";

#[derive(Debug, Parser)]
#[command(
    name = "framextractor",
    version,
    about = "Extract frames from videos and convert images to WebP, PNG, or JPEG",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// Show a progress bar.
    #[arg(long)]
    progress: bool,

    /// Allow overwriting existing output files.
    #[arg(long)]
    overwrite: bool,

    /// FFmpeg console verbosity (quiet, error, warning, info, debug, trace).
    #[arg(long)]
    ffmpeg_log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print video metadata.
    #[command(
        about = "Print video metadata",
        visible_alias = "info",
        after_help = "Examples:\n  framextractor probe input.mp4\n  framextractor probe input.mp4 --json"
    )]
    Probe {
        /// Input video path.
        input: PathBuf,

        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Extract frames into an output directory.
    #[command(
        about = "Extract video frames",
        after_help = "Examples:\n  framextractor frames input.mp4 --out frames\n  framextractor frames input.mp4 --out frames --mode batch --fps 0.5 --timestamps"
    )]
    Frames {
        /// Input video path.
        input: PathBuf,
        /// Output directory.
        #[arg(long)]
        out: PathBuf,
        /// Extraction mode: single | batch.
        #[arg(long, default_value = "single")]
        mode: String,
        /// Frames per second of video (batch mode).
        #[arg(long, conflicts_with = "count")]
        fps: Option<f64>,
        /// Total number of frames, evenly spaced (batch mode).
        #[arg(long)]
        count: Option<u32>,
        /// Rescale to this width, keeping the aspect ratio.
        #[arg(long)]
        width: Option<u32>,
        /// Output format: png | jpg | webp.
        #[arg(long, default_value = "png")]
        format: String,
        /// Quality factor for jpg and webp (1-100).
        #[arg(long, default_value_t = DEFAULT_QUALITY)]
        quality: u8,
        /// Use lossless WebP.
        #[arg(long)]
        lossless: bool,
        /// Append the capture offset to each filename.
        #[arg(long)]
        timestamps: bool,
        /// Write frames as separate files instead of one ZIP archive.
        #[arg(long)]
        no_archive: bool,
    },

    /// Convert images.
    #[command(
        about = "Convert images to WebP, PNG, or JPEG",
        after_help = "Examples:\n  framextractor convert photo.jpg --out converted\n  framextractor convert *.png --out converted --format jpg --quality 80 --archive"
    )]
    Convert {
        /// Input image paths.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output directory.
        #[arg(long)]
        out: PathBuf,
        /// Output format: webp | png | jpg.
        #[arg(long, default_value = "webp")]
        format: String,
        /// Quality factor for jpg and webp (1-100).
        #[arg(long, default_value_t = 85)]
        quality: u8,
        /// Rescale to this width, keeping the aspect ratio.
        #[arg(long)]
        width: Option<u32>,
        /// Bundle the converted images into one ZIP archive.
        #[arg(long)]
        archive: bool,
    },

    /// Validate a video and print a report.
    #[command(
        about = "Validate video file",
        after_help = "Examples:\n  framextractor validate input.mp4"
    )]
    Validate {
        /// Input video path.
        input: PathBuf,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_mode(value: &str, fps: Option<f64>, count: Option<u32>) -> Option<ExtractionRequest> {
    match value.to_ascii_lowercase().as_str() {
        "single" => Some(ExtractionRequest::single()),
        "batch" | "all" => {
            let sampling = match count {
                Some(count) => Sampling::FixedCount(count),
                None => Sampling::FixedRate(fps.unwrap_or(1.0)),
            };
            Some(ExtractionRequest::batch(sampling))
        }
        _ => None,
    }
}

fn parse_encoding(value: &str, quality: u8, lossless: bool) -> Option<OutputEncoding> {
    match value.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "png" => Some(OutputEncoding::Png),
        "jpg" | "jpeg" => Some(OutputEncoding::jpeg(quality)),
        "webp" if lossless => Some(OutputEncoding::WebPLossless),
        "webp" => Some(OutputEncoding::webp(quality)),
        _ => None,
    }
}

fn parse_log_level(value: &str) -> Option<LevelFilter> {
    match value.to_ascii_lowercase().as_str() {
        "quiet" | "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warning" | "warn" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "verbose" | "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

fn parse_resolution(width: Option<u32>) -> Resolution {
    width.map_or(Resolution::Original, Resolution::Width)
}

fn ensure_writable_path(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        if overwrite {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("overwriting {}", path.display()).yellow()
            );
        } else {
            return Err(format!(
                "output already exists: {} (use --overwrite to replace)",
                path.display()
            )
            .into());
        }
    }
    Ok(())
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    let default_filter = if global.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Some(level) = &global.ffmpeg_log_level {
        let parsed = parse_log_level(level)
            .ok_or(format!("unsupported --ffmpeg-log-level: {level}"))?;
        framextractor::set_ffmpeg_log_level(parsed);
    }

    Ok(())
}

/// Drives an indicatif bar from library progress reports.
struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let label = match info.operation {
            OperationType::FrameExtraction => "extracting",
            OperationType::ImageConversion => "converting",
            OperationType::Archiving => "archiving",
            _ => "working",
        };
        self.bar.set_length(info.total);
        self.bar.set_position(info.current);
        match info.current_timestamp {
            Some(offset) => self.bar.set_message(format!("{label} @ {offset:.2?}")),
            None => self.bar.set_message(label),
        }
        if info.current >= info.total {
            self.bar.finish_and_clear();
            self.bar.reset();
        }
    }
}

fn extract_options(
    global: &GlobalOptions,
    token: CancellationToken,
) -> Result<ExtractOptions, Box<dyn std::error::Error>> {
    let mut options = ExtractOptions::new().with_cancellation(token.clone());
    if global.progress {
        options = options.with_progress(Arc::new(TerminalProgress::new()?));
    }

    ctrlc::set_handler(move || {
        token.cancel();
        eprintln!("\n{}", "cancelling after the current item...".yellow());
    })?;

    Ok(options)
}

fn write_outputs(
    outputs: &[ExtractedOutput],
    out: &Path,
    overwrite: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    for output in outputs {
        ensure_writable_path(&out.join(output.filename()), overwrite)?;
    }
    for output in outputs {
        let path = output.save_to(out)?;
        log::debug!("saved {}", path.display());
    }
    Ok(())
}

fn write_delivery(
    delivery: Delivery<'_>,
    out: &Path,
    overwrite: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match delivery {
        Delivery::Single(output) => {
            ensure_writable_path(&out.join(output.filename()), overwrite)?;
            let path = output.save_to(out)?;
            println!("{} {}", "saved".green().bold(), path.display());
        }
        Delivery::Archive(blob) => {
            ensure_writable_path(&out.join(blob.filename()), overwrite)?;
            let path = blob.save_to(out)?;
            println!(
                "{} {} ({} files, {})",
                "saved".green().bold(),
                path.display(),
                blob.entry_count(),
                format_file_size(blob.bytes().len() as u64),
            );
        }
        Delivery::Individual { outputs, reason } => {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("archive failed ({reason}), saving files individually").yellow()
            );
            write_outputs(outputs, out, overwrite)?;
            println!(
                "{} {} file(s) to {}",
                "saved".green().bold(),
                outputs.len(),
                out.display()
            );
        }
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Probe { input, json } => {
            let asset = SourceAsset::video(&input)?;
            let source = VideoSource::open(&asset)?;
            let metadata = source.metadata();
            if json {
                let payload = json!({
                    "name": asset.display_name(),
                    "mime_type": asset.mime_type(),
                    "size_bytes": asset.byte_size(),
                    "format": metadata.format,
                    "duration_seconds": metadata.duration.as_secs_f64(),
                    "width": metadata.width,
                    "height": metadata.height,
                    "fps": metadata.frames_per_second,
                    "frame_count": metadata.frame_count,
                    "codec": metadata.codec,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("File: {} ({})", asset.display_name(), asset.mime_type());
                println!("Size: {}", format_file_size(asset.byte_size()));
                println!("Duration: {}", format_duration(metadata.duration));
                println!("Dimensions: {}x{}", metadata.width, metadata.height);
                println!("Frame rate: {:.2} fps", metadata.frames_per_second);
                println!("Frames: ~{}", metadata.frame_count);
                println!("Codec: {}", metadata.codec);
            }
        }
        Commands::Frames {
            input,
            out,
            mode,
            fps,
            count,
            width,
            format,
            quality,
            lossless,
            timestamps,
            no_archive,
        } => {
            let encoding = parse_encoding(&format, quality, lossless)
                .ok_or(format!("unsupported --format: {format}"))?;
            let request = parse_mode(&mode, fps, count)
                .ok_or(format!("unsupported --mode: {mode} (single|batch)"))?
                .with_resolution(parse_resolution(width))
                .with_encoding(encoding)
                .with_timestamped_names(timestamps);

            let asset = SourceAsset::video(&input)?;
            let source = VideoSource::open(&asset)?;
            for warning in &source.validate().warnings {
                eprintln!("{} {}", "warning:".yellow().bold(), warning.yellow());
            }

            let mut session = Session::new();
            session.select_source(asset.clone());
            let token = session.begin_run();
            let options = extract_options(&cli.global, token.clone())?;

            let mut extractor = BatchExtractor::new(source, request)?;
            let batch = extractor.run(&options)?;
            if batch.was_cancelled() {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    format!("cancelled, keeping {} frame(s)", batch.len()).yellow()
                );
            }
            session.finish_run(&token, batch);

            let Some(batch) = session.batch().filter(|batch| !batch.is_empty()) else {
                return Err("no frames were extracted".into());
            };

            fs::create_dir_all(&out)?;
            if no_archive {
                write_outputs(batch.outputs(), &out, cli.global.overwrite)?;
                println!(
                    "{} {}",
                    "success:".green().bold(),
                    format!("Extracted {} frame(s) to {}", batch.len(), out.display()).green()
                );
            } else {
                let archive_name = frame_archive_filename(asset.display_name());
                let delivery = deliver_with_options(batch.outputs(), &archive_name, &options);
                write_delivery(delivery, &out, cli.global.overwrite)?;
            }
        }
        Commands::Convert {
            inputs,
            out,
            format,
            quality,
            width,
            archive,
        } => {
            let encoding = parse_encoding(&format, quality, false)
                .ok_or(format!("unsupported --format: {format}"))?;
            let request = ExtractionRequest::image_conversion()
                .with_resolution(parse_resolution(width))
                .with_encoding(encoding);

            let assets = inputs
                .iter()
                .map(SourceAsset::image)
                .collect::<Result<Vec<_>, _>>()?;

            let options = extract_options(&cli.global, CancellationToken::new())?;
            let batch = convert_batch(&assets, &request, &options)?;

            for output in &batch {
                println!(
                    "{} {} -> {} ({:.1}% smaller)",
                    output.filename(),
                    format_file_size(output.original_size().unwrap_or(0)),
                    format_file_size(output.encoded_size()),
                    output.compression_ratio().unwrap_or(0.0),
                );
            }

            fs::create_dir_all(&out)?;
            if archive {
                let delivery =
                    deliver_with_options(batch.outputs(), CONVERTED_ARCHIVE_FILENAME, &options);
                write_delivery(delivery, &out, cli.global.overwrite)?;
            } else {
                write_outputs(batch.outputs(), &out, cli.global.overwrite)?;
            }

            let summary = batch.summary();
            println!(
                "{} {}",
                "success:".green().bold(),
                format!(
                    "Converted {} image(s): {} -> {}, {:.1}% smaller on average",
                    summary.files,
                    format_file_size(summary.original_bytes),
                    format_file_size(summary.encoded_bytes),
                    summary.average_compression_ratio,
                )
                .green()
            );
        }
        Commands::Validate { input } => {
            let asset = SourceAsset::video(&input)?;
            let source = VideoSource::open(&asset)?;
            let report = source.validate();
            print!("{report}");
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framextractor", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
