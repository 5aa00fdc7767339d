use ndarray::*;

/// BoundingBox represents the bounding box of the detection.
#[derive(Debug, Clone)]
pub struct BoundingBox {
    /// Left of the bounding box (i.e. min-x)
    x: f32,
    /// Top of the bounding box (i.e. min-y)
    y: f32,
    /// Width of the bounding box
    width: f32,
    /// Height of the bounding box
    height: f32,
}

impl PartialEq for BoundingBox {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x
            && self.y == other.y
            && self.width == other.width
            && self.height == other.height
    }
}

impl BoundingBox {
    /// Returns a new BoundingBox
    ///
    /// # Parameters
    ///
    /// * `x`: Bounding box left.
    /// * `y`: Bounding box top.
    /// * `width`: Bounding box width.
    /// * `height`: Bounding box height.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> BoundingBox {
        BoundingBox {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns a BoundingBox from a Kalman state in `(center x, center y, area, aspect ratio)` format.
    ///
    /// A negative area or aspect ratio yields a non-finite width and height.
    pub fn from_z(z: ArrayView1<f32>) -> BoundingBox {
        let width = (z[2] * z[3]).sqrt();
        let height = z[2] / width;
        BoundingBox::new(
            z[0] - (width / 2.0),
            z[1] - (height / 2.0),
            width,
            height,
        )
    }

    /// Returns the x of the bounding box
    pub fn x(&self) -> f32 {
        self.x
    }

    /// Returns the y of the bounding box
    pub fn y(&self) -> f32 {
        self.y
    }

    /// Returns the width of the bounding box
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Returns the height of the bounding box
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Returns true if every co-ordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Returns the bounding box moved by `(dx, dy)`.
    pub fn translate(&self, dx: f32, dy: f32) -> BoundingBox {
        BoundingBox::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Returns the bounding box in left, top, width, height format, i.e., `(min x, min y, width, height)`.
    pub fn to_tlwh(&self) -> Array1<f32> {
        arr1::<f32>(&[self.x, self.y, self.width, self.height])
    }

    /// Returns the bounding box in center x, center y, area, aspect ratio format, where the aspect ratio is `width / height`.
    /// This is the measurement space of the SORT Kalman filter.
    pub fn to_z(&self) -> Array1<f32> {
        arr1::<f32>(&[
            self.x + (self.width / 2.0),
            self.y + (self.height / 2.0),
            self.width * self.height,
            self.width / self.height,
        ])
    }
}
