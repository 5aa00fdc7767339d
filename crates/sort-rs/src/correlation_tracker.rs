use crate::BoundingBox;
use ndarray::*;

/// Search window around the current box, as a fraction of the larger box side.
const SEARCH_PADDING: f32 = 0.5;
/// Weight of the newest patch when the template is refreshed after a predict.
const LEARNING_RATE: f32 = 0.125;
/// Upper bound of template samples per axis used when scoring an offset.
const MAX_TEMPLATE_SAMPLES: usize = 32;

/// A visual tracker which follows an image patch by normalized cross-correlation.
///
/// Images are grayscale `ArrayView2<f32>` indexed `[row, column]`, i.e. `[y, x]`. The box size is
/// fixed at `start`, only its position is tracked.
#[derive(Debug, Clone)]
pub struct CorrelationTracker {
    /// Current position of the tracked object.
    bbox: BoundingBox,
    /// Appearance template, empty when the box does not overlap the image.
    template: Array2<f32>,
    /// Image `(row, column)` of the template top-left corner.
    origin: (usize, usize),
    /// Correlation score of the latest predict.
    confidence: f32,
}

impl CorrelationTracker {
    /// Returns a new CorrelationTracker following the patch under `bbox`.
    pub fn new(image: ArrayView2<f32>, bbox: &BoundingBox) -> CorrelationTracker {
        let mut tracker = CorrelationTracker {
            bbox: bbox.clone(),
            template: Array2::zeros((0, 0)),
            origin: (0, 0),
            confidence: 0.0,
        };
        tracker.start(image, bbox);
        tracker
    }

    /// (Re)starts tracking the patch under `bbox`.
    pub fn start(&mut self, image: ArrayView2<f32>, bbox: &BoundingBox) {
        self.bbox = bbox.clone();
        match patch_region(image.dim(), bbox) {
            Some((row, col, height, width)) => {
                self.template = image
                    .slice(s![row..row + height, col..col + width])
                    .to_owned();
                self.origin = (row, col);
                self.confidence = 1.0;
            }
            None => {
                self.template = Array2::zeros((0, 0));
                self.confidence = 0.0;
            }
        }
    }

    /// Returns the current position of the tracked object.
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Returns the correlation score of the latest predict in [-1.0, 1.0].
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Locate the template in `image` and move the box to the best matching position.
    pub fn predict(&mut self, image: ArrayView2<f32>) -> BoundingBox {
        let (template_height, template_width) = self.template.dim();
        if template_height == 0 || template_width == 0 {
            return self.bbox.clone();
        }

        let side = template_height.max(template_width);
        let radius = (SEARCH_PADDING * side as f32).ceil() as isize;
        let sample_step = (side / MAX_TEMPLATE_SAMPLES).max(1);
        let coarse_step = sample_step as isize;

        // staying put wins ties
        let mut best = self
            .score(image, 0, 0, sample_step)
            .map(|score| (score, 0, 0));

        let levels = radius / coarse_step;
        for i in -levels..=levels {
            for j in -levels..=levels {
                best = self.better(image, best, i * coarse_step, j * coarse_step, sample_step);
            }
        }

        if coarse_step > 1 {
            if let Some((_, dy, dx)) = best {
                for i in -coarse_step + 1..coarse_step {
                    for j in -coarse_step + 1..coarse_step {
                        best = self.better(image, best, dy + i, dx + j, sample_step);
                    }
                }
            }
        }

        match best {
            Some((score, dy, dx)) => {
                let row = (self.origin.0 as isize + dy) as usize;
                let col = (self.origin.1 as isize + dx) as usize;
                let patch = image.slice(s![row..row + template_height, col..col + template_width]);
                self.template = &self.template * (1.0 - LEARNING_RATE) + &patch * LEARNING_RATE;
                self.origin = (row, col);
                self.bbox = self.bbox.translate(dx as f32, dy as f32);
                self.confidence = score;
            }
            None => self.confidence = 0.0,
        }

        self.bbox.clone()
    }

    /// Restart on a matched detection. `None` leaves the tracker unchanged.
    pub fn update(&mut self, image: ArrayView2<f32>, bbox: Option<&BoundingBox>) {
        if let Some(bbox) = bbox {
            self.start(image, bbox);
        }
    }

    fn better(
        &self,
        image: ArrayView2<f32>,
        best: Option<(f32, isize, isize)>,
        dy: isize,
        dx: isize,
        sample_step: usize,
    ) -> Option<(f32, isize, isize)> {
        match (self.score(image, dy, dx, sample_step), best) {
            (Some(score), Some((best_score, ..))) if score > best_score => Some((score, dy, dx)),
            (Some(score), None) => Some((score, dy, dx)),
            _ => best,
        }
    }

    /// Correlation of the template with the image patch displaced by `(dy, dx)`, or `None` when
    /// the displaced patch is not fully inside the image.
    fn score(&self, image: ArrayView2<f32>, dy: isize, dx: isize, sample_step: usize) -> Option<f32> {
        let (rows, cols) = image.dim();
        let (height, width) = self.template.dim();
        let row = self.origin.0 as isize + dy;
        let col = self.origin.1 as isize + dx;
        if row < 0 || col < 0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        if row + height > rows || col + width > cols {
            return None;
        }

        let patch = image.slice(s![row..row + height;sample_step, col..col + width;sample_step]);
        let template = self.template.slice(s![..;sample_step, ..;sample_step]);

        Some(normalized_cross_correlation(template, patch))
    }
}

/// Returns the `(row, column, height, width)` of the part of `bbox` inside an image of `dim`.
fn patch_region(dim: (usize, usize), bbox: &BoundingBox) -> Option<(usize, usize, usize, usize)> {
    if !bbox.is_finite() {
        return None;
    }

    let (rows, cols) = dim;
    let col0 = bbox.x().round().max(0.0) as usize;
    let row0 = bbox.y().round().max(0.0) as usize;
    let col1 = ((bbox.x() + bbox.width()).round().max(0.0) as usize).min(cols);
    let row1 = ((bbox.y() + bbox.height()).round().max(0.0) as usize).min(rows);

    if col1 <= col0 || row1 <= row0 {
        None
    } else {
        Some((row0, col0, row1 - row0, col1 - col0))
    }
}

/// Zero-mean normalized cross-correlation of two equally shaped patches.
///
/// A flat patch carries no structure to correlate against and scores 0.0.
fn normalized_cross_correlation(a: ArrayView2<f32>, b: ArrayView2<f32>) -> f32 {
    let (mean_a, mean_b) = match (a.mean(), b.mean()) {
        (Some(mean_a), Some(mean_b)) => (mean_a, mean_b),
        _ => return 0.0,
    };

    let mut numerator = 0.0;
    let mut energy_a = 0.0;
    let mut energy_b = 0.0;
    Zip::from(&a).and(&b).for_each(|&va, &vb| {
        let da = va - mean_a;
        let db = vb - mean_b;
        numerator += da * db;
        energy_a += da * da;
        energy_b += db * db;
    });

    let denominator = (energy_a * energy_b).sqrt();
    if denominator <= f32::EPSILON {
        0.0
    } else {
        numerator / denominator
    }
}
