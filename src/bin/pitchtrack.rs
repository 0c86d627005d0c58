use anyhow::{bail, Context};
use clap::Parser;
use log::{info, warn};
use opencv::{
    core::{Mat, Size},
    prelude::*,
    videoio::{self, VideoCapture, VideoWriter},
};
use std::{fs::File, io::BufWriter, path::PathBuf};

use pitchtrack::{Config, DetectionSource, FrameSummary, JsonTrackSource, MatchTracker};

#[derive(Parser)]
#[command(
    name = "pitchtrack",
    about = "Annotate football video with team-colored tracks and a live pitch map",
    version = "0.1.0"
)]
struct Args {
    /// Input video file
    #[arg(short, long)]
    input: PathBuf,

    /// Per-frame tracked detections (JSON)
    #[arg(short, long)]
    detections: PathBuf,

    /// Annotated output video
    #[arg(short, long)]
    output: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write per-frame summaries to this JSON file
    #[arg(long)]
    log: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            Config::from_file(path).with_context(|| format!("failed to load config {}", path.display()))?
        }
        None => Config::default(),
    };

    let mut source = JsonTrackSource::from_file(&args.detections)
        .with_context(|| format!("failed to load detections {}", args.detections.display()))?;
    info!("loaded detections for {} frames", source.frame_count());

    let mut cap = VideoCapture::from_file(&args.input.to_string_lossy(), videoio::CAP_ANY)?;
    if !cap.is_opened()? {
        bail!("failed to open video file {}", args.input.display());
    }

    let width = cap.get(videoio::CAP_PROP_FRAME_WIDTH)? as i32;
    let height = cap.get(videoio::CAP_PROP_FRAME_HEIGHT)? as i32;
    let total_frames = cap.get(videoio::CAP_PROP_FRAME_COUNT)? as i64;
    let fps = cap.get(videoio::CAP_PROP_FPS)?;
    info!("video {}x{} @ {:.2} fps, {} frames", width, height, fps, total_frames);

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let fourcc = VideoWriter::fourcc('X', 'V', 'I', 'D')?;
    let mut writer = VideoWriter::new(&args.output.to_string_lossy(), fourcc, fps, Size::new(width, height), true)?;
    if !writer.is_opened()? {
        bail!("failed to open video writer {}", args.output.display());
    }

    let mut tracker = MatchTracker::new(&config)?;
    let mut summaries: Vec<FrameSummary> = Vec::new();
    let mut frame = Mat::default();
    let mut frame_id = 0usize;

    while cap.read(&mut frame)? {
        if frame.empty() {
            break;
        }
        let detections = source.detections_for(frame_id)?;
        let summary = tracker
            .process_frame(&mut frame, &detections, frame_id)
            .with_context(|| format!("failed on frame {}", frame_id))?;
        writer.write(&frame)?;
        if args.log.is_some() {
            summaries.push(summary);
        }

        frame_id += 1;
        if frame_id % 100 == 0 {
            info!("processed {}/{} frames", frame_id, total_frames);
        }
    }
    writer.release()?;

    if source.frame_count() > 0 {
        warn!("{} frames of detections had no matching video frame", source.frame_count());
    }
    info!("processed {} frames, {} tracks seen", frame_id, tracker.track_store().len());

    if let Some(path) = &args.log {
        let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &summaries)?;
        info!("frame summaries saved to {}", path.display());
    }

    Ok(())
}
