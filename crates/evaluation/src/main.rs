mod utils;
use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{debug, info};
use rayon::prelude::*;
use sort_rs::{EstimatorKind, Frame, Tracker};
use std::path::{Path, PathBuf};
use utils::{
    file_archiver::{FileArchiver, Observation},
    frame_image, mot,
};

/// Run the SORT tracker over MOT challenge detection files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Glob of detection files, e.g. `MOT17/train/*/det/det.txt`
    #[arg(short, long)]
    input: String,

    /// The directory of the `<sequence>.txt` tracking results
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// The directory of archived tracks
    #[arg(short, long)]
    archive: Option<PathBuf>,

    /// The score threshold for detections
    #[arg(short, long, default_value_t = 0.0)]
    score_threshold: f32,

    /// Maximum number of frames a track survives without a match
    #[arg(long, default_value_t = 1)]
    max_age: usize,

    /// Number of consecutive matches before a track is reported
    #[arg(long, default_value_t = 3)]
    min_hits: usize,

    /// The minimum intersection over union of a match
    #[arg(long, default_value_t = 0.3)]
    iou_threshold: f32,

    /// Frame width when images are not read
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Frame height when images are not read
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Read frames from `<sequence>/img1/<frame>.jpg`
    #[arg(long, default_value_t = false)]
    images: bool,

    /// Track with the correlation estimator
    #[arg(long, default_value_t = false, requires = "images")]
    correlation: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let files = glob::glob(&args.input)?
        .filter_map(|path| path.ok())
        .collect::<Vec<_>>();
    if files.is_empty() {
        bail!("no detection files match {}", args.input);
    }
    std::fs::create_dir_all(&args.output)?;

    let frames = files
        .par_iter()
        .map(|path| track_sequence(&args, path))
        .collect::<Result<Vec<_>>>()?;

    info!(
        "tracked {} frames in {} sequences",
        frames.iter().sum::<usize>(),
        files.len()
    );
    Ok(())
}

/// Track a single sequence and return the number of processed frames.
fn track_sequence(args: &Args, path: &Path) -> Result<usize> {
    // <sequence>/det/det.txt
    let sequence_dir = path
        .parent()
        .and_then(Path::parent)
        .with_context(|| format!("no sequence directory for {}", path.display()))?;
    let sequence = sequence_dir
        .file_name()
        .with_context(|| format!("no sequence name for {}", path.display()))?
        .to_string_lossy()
        .to_string();

    let frames = mot::read_detections(path, args.score_threshold)?;
    let last_frame = frames.keys().max().copied().unwrap_or(0);

    let estimator = if args.correlation {
        EstimatorKind::Correlation
    } else {
        EstimatorKind::Kalman
    };
    let mut tracker: Tracker<Observation> =
        Tracker::new(Some(args.max_age), Some(args.min_hits), Some(estimator));
    tracker.with_iou_threshold(args.iou_threshold);
    if let Some(archive) = &args.archive {
        tracker.with_archiver(FileArchiver::new(archive.join(&sequence))?);
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(args.output.join(format!("{sequence}.txt")))?;

    // every frame is submitted, with or without detections
    for frame_index in 1..=last_frame {
        let detections = frames
            .get(&frame_index)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let attributes = detections
            .iter()
            .map(|detection| Observation {
                frame: frame_index,
                bbox: detection.bbox().clone(),
                confidence: detection.confidence(),
            })
            .collect();

        let image = if args.images {
            Some(frame_image::load_grayscale(&frame_image::frame_path(
                sequence_dir,
                frame_index,
            ))?)
        } else {
            None
        };
        let frame = match &image {
            Some(image) => Frame::from_image(image.view()),
            None => Frame::new(args.height, args.width),
        };

        let tracked = tracker
            .update(detections, attributes, &frame)
            .with_context(|| format!("{sequence}: frame {frame_index}"))?;
        debug!(
            "{sequence}: frame {frame_index}, {} detections, {} tracked",
            detections.len(),
            tracked.nrows()
        );
        mot::write_results(&mut writer, frame_index, &tracked)?;
    }
    writer.flush()?;

    info!("{sequence}: {last_frame} frames");
    Ok(last_frame)
}
