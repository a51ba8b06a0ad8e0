use std::cmp::Ordering;

/// A 2D point in top-left-origin page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Current Transformation Matrix (CTM) — affine transform.
///
/// Represented as six values `[a, b, c, d, e, f]` corresponding to:
/// ```text
/// | a  b  0 |
/// | c  d  0 |
/// | e  f  1 |
/// ```
/// Point transformation: `(x', y') = (a*x + c*y + e, b*x + d*y + f)`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ctm {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Ctm {
    fn default() -> Self {
        Self::identity()
    }
}

impl Ctm {
    /// Create a new CTM with the given values.
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Identity matrix (no transformation).
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Transform a point through this CTM.
    pub fn transform_point(&self, p: Point) -> Point {
        Point {
            x: self.a * p.x + self.c * p.y + self.e,
            y: self.b * p.x + self.d * p.y + self.f,
        }
    }

    /// Concatenate this CTM with another: apply `self` first, then `other`.
    pub fn concat(&self, other: &Ctm) -> Ctm {
        Ctm {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }
}

/// Axis-aligned rectangle with top-left origin, stored as
/// `(top, left, width, height)`.
///
/// `bottom` and `right` are derived. Equality is exact on the four
/// stored fields.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// Build a rectangle from its four edges.
    pub fn from_edges(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            width: right - left,
            height: bottom - top,
        }
    }

    /// Bottom edge (`top + height`).
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Right edge (`left + width`).
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Horizontal midpoint.
    pub fn horizontal_center(&self) -> f64 {
        self.left + self.width / 2.0
    }

    /// Vertical midpoint.
    pub fn vertical_center(&self) -> f64 {
        self.top + self.height / 2.0
    }

    /// Smallest rectangle covering both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let top = self.top.min(other.top);
        let left = self.left.min(other.left);
        let bottom = self.bottom().max(other.bottom());
        let right = self.right().max(other.right());
        Rect::from_edges(top, left, bottom, right)
    }

    /// Whether the two rectangles share any area (touching edges count).
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left <= other.right()
            && other.left <= self.right()
            && self.top <= other.bottom()
            && other.top <= self.bottom()
    }

    /// The overlapping region, if any.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        Some(Rect::from_edges(
            self.top.max(other.top),
            self.left.max(other.left),
            self.bottom().min(other.bottom()),
            self.right().min(other.right()),
        ))
    }

    /// Whether `other` lies entirely inside `self`.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.left <= other.left
            && self.top <= other.top
            && self.right() >= other.right()
            && self.bottom() >= other.bottom()
    }

    /// Whether the point lies inside `self` (edges inclusive).
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right() && p.y >= self.top && p.y <= self.bottom()
    }

    /// Grow the rectangle by `amount` on every side.
    pub fn expand(&self, amount: f64) -> Rect {
        Rect::new(
            self.top - amount,
            self.left - amount,
            self.width + 2.0 * amount,
            self.height + 2.0 * amount,
        )
    }

    /// Shift the rectangle by the given deltas.
    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.top + dy, self.left + dx, self.width, self.height)
    }

    /// Length of the vertical overlap between the two y-intervals.
    pub fn vertical_overlap(&self, other: &Rect) -> f64 {
        (self.bottom().min(other.bottom()) - self.top.max(other.top)).max(0.0)
    }

    /// Vertical-overlap predicate: overlap relative to the shorter height
    /// must reach `threshold`.
    pub fn vertically_overlaps(&self, other: &Rect, threshold: f64) -> bool {
        let min_height = self.height.min(other.height);
        if min_height <= 0.0 {
            return self.vertical_overlap(other) > 0.0;
        }
        self.vertical_overlap(other) / min_height >= threshold
    }

    /// Length of the horizontal overlap between the two x-intervals.
    pub fn horizontal_overlap(&self, other: &Rect) -> f64 {
        (self.right().min(other.right()) - self.left.max(other.left)).max(0.0)
    }

    /// Horizontal-overlap predicate against the narrower width.
    pub fn horizontally_overlaps(&self, other: &Rect, threshold: f64) -> bool {
        let min_width = self.width.min(other.width);
        if min_width <= 0.0 {
            return self.horizontal_overlap(other) > 0.0;
        }
        self.horizontal_overlap(other) / min_width >= threshold
    }

    /// Overlap area relative to the smaller of the two rectangles.
    pub fn overlap_ratio(&self, other: &Rect) -> f64 {
        let min_area = self.area().min(other.area());
        if min_area <= 0.0 {
            return 0.0;
        }
        let overlap = self
            .intersection(other)
            .map(|r| r.area())
            .unwrap_or(0.0);
        overlap / min_area
    }

    /// Reading order: by `top` ascending, then `left` ascending.
    pub fn reading_order(&self, other: &Rect) -> Ordering {
        self.top
            .total_cmp(&other.top)
            .then(self.left.total_cmp(&other.left))
    }
}
