//! Detections and the boxes they carry.
//!
//! Every `BoundingBox` knows which coordinate space it lives in. Rescaling is
//! a projection between spaces, so projecting a pixel-space box into the same
//! pixel space again leaves it untouched.

/// Coordinate space of a bounding box.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum CoordSpace {
    /// Fractions of the model input, nominally in `[0, 1]`.
    #[default]
    Normalized,
    /// Pixels of a target image of the given size.
    Pixel { width: u32, height: u32 },
}

impl CoordSpace {
    /// Scale factors `(sx, sy)` from normalized into this space.
    fn scale(self) -> (f32, f32) {
        match self {
            CoordSpace::Normalized => (1.0, 1.0),
            CoordSpace::Pixel { width, height } => (width as f32, height as f32),
        }
    }
}

/// Axis-aligned box `(x1, y1, x2, y2)` with `x1 <= x2` and `y1 <= y2`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    space: CoordSpace,
}

impl BoundingBox {
    /// Creates a box from corners; swapped corners are reordered.
    pub fn from_corners(x1: f32, y1: f32, x2: f32, y2: f32, space: CoordSpace) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
            space,
        }
    }

    /// Creates a box from center format; negative extents collapse to zero.
    pub fn from_center(cx: f32, cy: f32, w: f32, h: f32, space: CoordSpace) -> Self {
        let half_w = w.max(0.0) / 2.0;
        let half_h = h.max(0.0) / 2.0;
        Self {
            x1: cx - half_w,
            y1: cy - half_h,
            x2: cx + half_w,
            y2: cy + half_h,
            space,
        }
    }

    pub fn x1(&self) -> f32 {
        self.x1
    }

    pub fn y1(&self) -> f32 {
        self.y1
    }

    pub fn x2(&self) -> f32 {
        self.x2
    }

    pub fn y2(&self) -> f32 {
        self.y2
    }

    /// Returns `(x1, y1, x2, y2)`.
    pub fn corners(&self) -> (f32, f32, f32, f32) {
        (self.x1, self.y1, self.x2, self.y2)
    }

    /// The coordinate space of the corners.
    pub fn space(&self) -> CoordSpace {
        self.space
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Area of the overlap with `other`, zero when disjoint.
    pub fn intersection(&self, other: &BoundingBox) -> f32 {
        let w = (self.x2.min(other.x2) - self.x1.max(other.x1)).max(0.0);
        let h = (self.y2.min(other.y2) - self.y1.max(other.y1)).max(0.0);
        w * h
    }

    /// Intersection-over-union with `other`.
    ///
    /// `other` is projected into this box's space first. Two zero-area boxes
    /// have an IoU of 0.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let other = other.to_space(self.space);
        let inter = self.intersection(&other);
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            return 0.0;
        }
        inter / union
    }

    /// Projects the box into `target`.
    ///
    /// Projecting into the current space returns the box unchanged. A pixel
    /// space with a zero dimension yields non-finite corners.
    pub fn to_space(&self, target: CoordSpace) -> BoundingBox {
        if self.space == target {
            return *self;
        }
        let (from_x, from_y) = self.space.scale();
        let (to_x, to_y) = target.scale();
        BoundingBox {
            x1: self.x1 * to_x / from_x,
            y1: self.y1 * to_y / from_y,
            x2: self.x2 * to_x / from_x,
            y2: self.y2 * to_y / from_y,
            space: target,
        }
    }

    /// Clamps the corners to the extent of the box's space.
    pub fn clamped(&self) -> BoundingBox {
        let (max_x, max_y) = self.space.scale();
        BoundingBox {
            x1: self.x1.clamp(0.0, max_x),
            y1: self.y1.clamp(0.0, max_y),
            x2: self.x2.clamp(0.0, max_x),
            y2: self.y2.clamp(0.0, max_y),
            space: self.space,
        }
    }
}

/// A single decoded detection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    bbox: BoundingBox,
    class_id: usize,
    confidence: f32,
}

impl Detection {
    /// Creates a detection; `confidence` is clamped into `[0, 1]`.
    pub fn new(bbox: BoundingBox, class_id: usize, confidence: f32) -> Self {
        Self {
            bbox,
            class_id,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn class_id(&self) -> usize {
        self.class_id
    }

    /// Combined score used for thresholding and ranking.
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Returns the same detection with its box projected into `target`.
    pub fn to_space(&self, target: CoordSpace) -> Detection {
        Detection {
            bbox: self.bbox.to_space(target),
            ..*self
        }
    }

    /// IoU between the boxes of two detections.
    pub fn iou(&self, other: &Detection) -> f32 {
        self.bbox.iou(&other.bbox)
    }
}
