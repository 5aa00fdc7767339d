use anyhow::{Context, Result};
use log::debug;
use sort_rs::{Archiver, BoundingBox, Track};
use std::{
    fs::OpenOptions,
    io::Write,
    path::PathBuf,
};

/// A detection as observed by a track.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Frame index of the detection.
    pub frame: usize,
    /// Detection position.
    pub bbox: BoundingBox,
    /// Detection confidence.
    pub confidence: f32,
}

/// Writes archived tracks to `<directory>/<id>.csv` and logs them in `<directory>/saved.txt`.
#[derive(Debug)]
pub struct FileArchiver {
    directory: PathBuf,
}

impl FileArchiver {
    /// Returns a new FileArchiver, creating `directory` if needed.
    pub fn new(directory: impl Into<PathBuf>) -> Result<FileArchiver> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory)
            .with_context(|| format!("failed to create {}", directory.display()))?;
        Ok(FileArchiver { directory })
    }
}

impl Archiver<Observation> for FileArchiver {
    fn archive(&mut self, track: &Track<Observation>, frame_count: usize) -> Result<()> {
        let id = track.track_id() + 1;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(self.directory.join(format!("{id}.csv")))?;
        track.attributes().iter().try_for_each(|observation| {
            writer.write_record([
                observation.frame.to_string(),
                format!("{:.2}", observation.bbox.x()),
                format!("{:.2}", observation.bbox.y()),
                format!("{:.2}", observation.bbox.width()),
                format!("{:.2}", observation.bbox.height()),
                format!("{:.4}", observation.confidence),
            ])
        })?;
        writer.flush()?;

        let mut saved = OpenOptions::new()
            .append(true)
            .create(true)
            .open(self.directory.join("saved.txt"))?;
        saved.write_all(format!("{id}.{frame_count}\n").as_bytes())?;

        debug!(
            "archived track {} with {} observations",
            id,
            track.attributes().len()
        );
        Ok(())
    }
}
