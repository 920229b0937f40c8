/// An axis-aligned face rectangle in frame pixel coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub confidence: f64,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32, confidence: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence,
        }
    }

    /// Builds a region from corner coordinates, clamped to a `fw × fh` frame.
    ///
    /// Returns `None` when nothing of the box remains inside the frame.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64, fw: u32, fh: u32, confidence: f64) -> Option<Self> {
        let left = x1.max(0.0).round() as i32;
        let top = y1.max(0.0).round() as i32;
        let right = x2.min(fw as f64).round() as i32;
        let bottom = y2.min(fh as f64).round() as i32;
        if right <= left || bottom <= top {
            return None;
        }
        Some(Self::new(left, top, right - left, bottom - top, confidence))
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0) as f64 * self.height.max(0) as f64
    }

    pub fn iou(&self, other: &Region) -> f64 {
        let ix1 = self.x.max(other.x);
        let iy1 = self.y.max(other.y);
        let ix2 = self.right().min(other.right());
        let iy2 = self.bottom().min(other.bottom());

        let inter = (ix2 - ix1).max(0) as f64 * (iy2 - iy1).max(0) as f64;
        if inter == 0.0 {
            return 0.0;
        }
        inter / (self.area() + other.area() - inter)
    }

    /// Greedy non-maximum suppression: highest confidence first, dropping any
    /// region whose IoU with an already-kept region exceeds `iou_threshold`.
    pub fn suppress_overlaps(mut regions: Vec<Region>, iou_threshold: f64) -> Vec<Region> {
        regions.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let mut kept: Vec<Region> = Vec::with_capacity(regions.len());
        for r in regions {
            if kept.iter().all(|k| r.iou(k) <= iou_threshold) {
                kept.push(r);
            }
        }
        kept
    }
}
