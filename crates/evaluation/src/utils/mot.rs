use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use ndarray::*;
use sort_rs::{BoundingBox, Detection};
use std::{fs::File, io, path::Path};

/// Read a MOT challenge detection file.
///
/// See `parse_detections`.
pub fn read_detections(
    path: &Path,
    score_threshold: f32,
) -> Result<IndexMap<usize, Vec<Detection>>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    parse_detections(file, score_threshold)
}

/// Parse MOT challenge detections grouped by frame index, in file order.
///
/// Rows are `<frame>, <id>, <bb_left>, <bb_top>, <bb_width>, <bb_height>, <conf>, <x>, <y>, <z>`.
/// Detections scoring below `score_threshold` are dropped but their frame is kept.
pub fn parse_detections<R: io::Read>(
    reader: R,
    score_threshold: f32,
) -> Result<IndexMap<usize, Vec<Detection>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut frames = IndexMap::<usize, Vec<Detection>>::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let field = |idx: usize| -> Result<f32> {
            let value = record
                .get(idx)
                .ok_or_else(|| anyhow!("line {}: missing column {}", line + 1, idx))?;
            value
                .parse::<f32>()
                .with_context(|| format!("line {}: invalid value {:?}", line + 1, value))
        };

        let detection = Detection::new(
            BoundingBox::new(field(2)?, field(3)?, field(4)?, field(5)?),
            field(6)?,
        );
        let detections = frames.entry(field(0)? as usize).or_default();
        if detection.confidence() >= score_threshold {
            detections.push(detection);
        }
    }

    Ok(frames)
}

/// Append the reported tracks of a frame.
///
/// Rows are `<frame>, <id>, <bb_left>, <bb_top>, <bb_width>, <bb_height>, 1, -1, -1, -1`.
/// Tracks with a non-finite box are skipped.
pub fn write_results<W: io::Write>(
    writer: &mut csv::Writer<W>,
    frame: usize,
    tracked: &Array2<f32>,
) -> Result<()> {
    tracked
        .outer_iter()
        .filter(|row| row.iter().all(|v| v.is_finite()))
        .try_for_each(|row| {
            writer.write_record([
                frame.to_string(),
                (row[4] as usize).to_string(),
                format!("{:.2}", row[0]),
                format!("{:.2}", row[1]),
                format!("{:.2}", row[2]),
                format!("{:.2}", row[3]),
                "1".to_string(),
                "-1".to_string(),
                "-1".to_string(),
                "-1".to_string(),
            ])
        })?;
    Ok(())
}
