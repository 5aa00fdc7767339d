use anyhow::{Context, Result};
use image::GrayImage;
use ndarray::*;
use std::path::{Path, PathBuf};

/// Path of a frame image of a MOT challenge sequence.
pub fn frame_path(sequence: &Path, frame: usize) -> PathBuf {
    sequence.join("img1").join(format!("{frame:06}.jpg"))
}

/// Decode an image as grayscale intensities in [0.0, 1.0].
pub fn load_grayscale(path: &Path) -> Result<Array2<f32>> {
    let image = image::io::Reader::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?
        .decode()?
        .to_luma8();
    Ok(to_array(&image))
}

/// Convert to an array indexed `[y, x]`.
pub fn to_array(image: &GrayImage) -> Array2<f32> {
    Array2::from_shape_fn(
        (image.height() as usize, image.width() as usize),
        |(y, x)| image[(x as u32, y as u32)][0] as f32 / 255.0,
    )
}
