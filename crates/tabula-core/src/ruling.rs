//! Ruling lines — axis-aligned segments derived from the graphics stream.
//!
//! Rulings are snapped to an axis at construction: a segment whose slope
//! falls within the orientation tolerance becomes exactly horizontal or
//! vertical, anything steeper in both directions stays oblique and is
//! discarded before extraction ever sees it.

use crate::geometry::Point;

/// Slope tolerance, in points, for a segment to count as axis-aligned.
pub const ORIENTATION_TOLERANCE: f64 = 1.0;

/// Perpendicular distance within which two same-orientation rulings are
/// considered colinear.
pub const COLINEARITY_TOLERANCE: f64 = 1.0;

/// A line segment, horizontal or vertical after normalization.
///
/// Horizontal rulings have `y1 == y2` and `x1 <= x2`; vertical rulings
/// have `x1 == x2` and `y1 <= y2`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ruling {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Ruling {
    /// Construct a ruling, snapping near-axis-aligned segments.
    ///
    /// If `|y2 - y1|` is within the orientation tolerance the segment is
    /// horizontal: both y-coordinates are replaced by their mean and the
    /// endpoints ordered `x1 <= x2`. The vertical case is symmetric. A
    /// segment that satisfies neither test is kept as-is and reports
    /// [`oblique`](Ruling::oblique).
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::with_tolerance(x1, y1, x2, y2, ORIENTATION_TOLERANCE)
    }

    /// [`Ruling::new`] with an explicit orientation tolerance.
    pub fn with_tolerance(x1: f64, y1: f64, x2: f64, y2: f64, tolerance: f64) -> Self {
        if (y2 - y1).abs() <= tolerance {
            let y = (y1 + y2) / 2.0;
            let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
            Self { x1, y1: y, x2, y2: y }
        } else if (x2 - x1).abs() <= tolerance {
            let x = (x1 + x2) / 2.0;
            let (y1, y2) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
            Self { x1: x, y1, x2: x, y2 }
        } else {
            Self { x1, y1, x2, y2 }
        }
    }

    pub fn horizontal(&self) -> bool {
        self.y1 == self.y2
    }

    pub fn vertical(&self) -> bool {
        self.x1 == self.x2 && self.y1 != self.y2
    }

    pub fn oblique(&self) -> bool {
        !self.horizontal() && !self.vertical()
    }

    /// Perpendicular coordinate: y for horizontal rulings, x for vertical.
    pub fn position(&self) -> f64 {
        if self.horizontal() { self.y1 } else { self.x1 }
    }

    /// Start of the extent along the ruling's axis.
    pub fn start(&self) -> f64 {
        if self.horizontal() { self.x1 } else { self.y1 }
    }

    /// End of the extent along the ruling's axis.
    pub fn end(&self) -> f64 {
        if self.horizontal() { self.x2 } else { self.y2 }
    }

    pub fn length(&self) -> f64 {
        (self.x2 - self.x1).hypot(self.y2 - self.y1)
    }

    /// Same orientation and perpendicular positions within the
    /// colinearity tolerance.
    pub fn colinear_with(&self, other: &Ruling) -> bool {
        if self.horizontal() && other.horizontal() || self.vertical() && other.vertical() {
            (self.position() - other.position()).abs() < COLINEARITY_TOLERANCE
        } else {
            false
        }
    }

    /// Segment-contains-point test with the given tolerance on both axes.
    pub fn contains_point(&self, p: Point, tolerance: f64) -> bool {
        if self.horizontal() {
            (p.y - self.y1).abs() <= tolerance
                && p.x >= self.x1 - tolerance
                && p.x <= self.x2 + tolerance
        } else {
            (p.x - self.x1).abs() <= tolerance
                && p.y >= self.y1 - tolerance
                && p.y <= self.y2 + tolerance
        }
    }

    /// Crossing point of a horizontal and a vertical ruling, if the
    /// segments meet within `tolerance`.
    pub fn intersection(&self, other: &Ruling, tolerance: f64) -> Option<Point> {
        let (h, v) = if self.horizontal() && other.vertical() {
            (self, other)
        } else if self.vertical() && other.horizontal() {
            (other, self)
        } else {
            return None;
        };
        let p = Point::new(v.x1, h.y1);
        if h.contains_point(p, tolerance) && v.contains_point(p, tolerance) {
            Some(p)
        } else {
            None
        }
    }

    /// Shift the ruling by the given deltas.
    pub fn translate(&self, dx: f64, dy: f64) -> Ruling {
        Ruling {
            x1: self.x1 + dx,
            y1: self.y1 + dy,
            x2: self.x2 + dx,
            y2: self.y2 + dy,
        }
    }
}

/// Collapse colinear fragments into single rulings.
///
/// Oblique input is discarded. Horizontal and vertical rulings are
/// handled separately: each is sorted by perpendicular position (then by
/// extent start), consecutively-colinear runs are grouped, and every run
/// is replaced by one ruling at the mean perpendicular position spanning
/// the union of extents. Idempotent.
pub fn collapse_oriented_rulings(rulings: &[Ruling]) -> Vec<Ruling> {
    let horizontal: Vec<Ruling> = rulings.iter().copied().filter(Ruling::horizontal).collect();
    let vertical: Vec<Ruling> = rulings.iter().copied().filter(Ruling::vertical).collect();

    let mut out = collapse_one_orientation(horizontal, true);
    out.extend(collapse_one_orientation(vertical, false));
    out
}

fn collapse_one_orientation(mut rulings: Vec<Ruling>, horizontal: bool) -> Vec<Ruling> {
    rulings.sort_by(|a, b| {
        a.position()
            .total_cmp(&b.position())
            .then(a.start().total_cmp(&b.start()))
    });

    let mut out = Vec::new();
    let mut run: Vec<Ruling> = Vec::new();
    for r in rulings {
        if let Some(last) = run.last() {
            if !last.colinear_with(&r) {
                out.push(merge_run(&run, horizontal));
                run.clear();
            }
        }
        run.push(r);
    }
    if !run.is_empty() {
        out.push(merge_run(&run, horizontal));
    }
    out
}

fn merge_run(run: &[Ruling], horizontal: bool) -> Ruling {
    let position = run.iter().map(Ruling::position).sum::<f64>() / run.len() as f64;
    let start = run
        .iter()
        .map(Ruling::start)
        .fold(f64::INFINITY, f64::min);
    let end = run
        .iter()
        .map(Ruling::end)
        .fold(f64::NEG_INFINITY, f64::max);
    if horizontal {
        Ruling::new(start, position, end, position)
    } else {
        Ruling::new(position, start, position, end)
    }
}

/// All points where a horizontal ruling crosses a vertical one.
///
/// Coordinates are rounded to 0.01 to fuse floating-point duplicates;
/// membership uses the segment-contains-point test with `tolerance`.
/// Results are in reading order.
pub fn find_intersections(
    horizontal: &[Ruling],
    vertical: &[Ruling],
    tolerance: f64,
) -> Vec<Point> {
    let mut seen = std::collections::BTreeSet::new();
    for h in horizontal {
        for v in vertical {
            if let Some(p) = h.intersection(v, tolerance) {
                seen.insert(((p.y * 100.0).round() as i64, (p.x * 100.0).round() as i64));
            }
        }
    }
    seen.into_iter()
        .map(|(y, x)| Point::new(x as f64 / 100.0, y as f64 / 100.0))
        .collect()
}
