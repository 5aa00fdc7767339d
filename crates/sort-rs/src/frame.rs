use ndarray::*;

/// The per-frame context handed to the tracker alongside the detections.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Frame height in pixels.
    height: u32,
    /// Frame width in pixels.
    width: u32,
    /// Optional grayscale image indexed `[y, x]`.
    image: Option<ArrayView2<'a, f32>>,
}

impl<'a> Frame<'a> {
    /// Returns a new Frame of the given size without an image.
    pub fn new(height: u32, width: u32) -> Frame<'a> {
        Frame {
            height,
            width,
            image: None,
        }
    }

    /// Returns a new Frame sized after `image`.
    pub fn from_image(image: ArrayView2<'a, f32>) -> Frame<'a> {
        let (height, width) = image.dim();
        Frame {
            height: height as u32,
            width: width as u32,
            image: Some(image),
        }
    }

    /// Return the frame height
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Return the frame width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Return the frame image
    pub fn image(&self) -> Option<ArrayView2<'a, f32>> {
        self.image
    }
}
