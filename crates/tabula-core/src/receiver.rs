//! Graphics-stream receiver: path-painting events in, rulings out.
//!
//! The PDF collaborator forwards raw path-painting operators through the
//! [`PathPaintDevice`] trait. [`RulingExtractor`] implements it,
//! maintaining the current-transform-matrix stack, projecting device
//! coordinates into top-left page space, and deriving rulings from both
//! stroked segments and thin filled rectangles.

use crate::config::ExtractionConfig;
use crate::geometry::{Ctm, Point};
use crate::ruling::Ruling;

/// Receiver interface for path-painting events.
///
/// One method per operation of the graphics stream; implementors keep
/// all path accumulation per instance.
pub trait PathPaintDevice {
    /// Start a new subpath at `(x, y)` (user space).
    fn begin_subpath(&mut self, x: f64, y: f64);
    /// Straight segment from the current point to `(x, y)`.
    fn append_line(&mut self, x: f64, y: f64);
    /// Append a rectangle as its own closed subpath.
    fn append_rectangle(&mut self, x: f64, y: f64, width: f64, height: f64);
    /// Close the current subpath back to its starting point.
    fn close_path(&mut self);
    /// Stroke the current path.
    fn stroke(&mut self);
    /// Close, then stroke.
    fn close_and_stroke(&mut self);
    /// Fill with the nonzero winding rule.
    fn fill_nonzero(&mut self);
    /// Fill with the even-odd rule.
    fn fill_even_odd(&mut self);
    /// Drop the current path without painting.
    fn end_path(&mut self);
    /// Concatenate a matrix onto the CTM.
    fn concat_ctm(&mut self, ctm: Ctm);
    /// Push the graphics state.
    fn save_state(&mut self);
    /// Pop the graphics state.
    fn restore_state(&mut self);
}

/// Derives axis-aligned rulings from path-painting events.
///
/// Stroked paths emit one ruling per consecutive point pair; oblique
/// results are dropped immediately. Filled paths whose bounding box is
/// thin in exactly one dimension emit a centerline ruling along the long
/// axis. Emitted coordinates are relative to the media box, in top-left
/// page space.
pub struct RulingExtractor {
    ctm: Ctm,
    ctm_stack: Vec<Ctm>,
    origin_x: f64,
    origin_y: f64,
    page_height: f64,
    y_inverted: bool,
    current: Vec<Point>,
    pooled: Vec<Vec<Point>>,
    rulings: Vec<Ruling>,
    orientation_tolerance: f64,
    thickness_threshold: f64,
}

impl RulingExtractor {
    /// Create a receiver for a page.
    ///
    /// `origin_x`/`origin_y` are the media-box lower-left corner;
    /// `y_inverted` reverses the device-to-page sign convention for
    /// media boxes whose y-axis already points down.
    pub fn new(
        origin_x: f64,
        origin_y: f64,
        page_height: f64,
        y_inverted: bool,
        config: &ExtractionConfig,
    ) -> Self {
        Self {
            ctm: Ctm::identity(),
            ctm_stack: Vec::new(),
            origin_x,
            origin_y,
            page_height,
            y_inverted,
            current: Vec::new(),
            pooled: Vec::new(),
            rulings: Vec::new(),
            orientation_tolerance: config.orientation_tolerance,
            thickness_threshold: config.ruling_thickness_threshold,
        }
    }

    /// Rulings collected so far.
    pub fn rulings(&self) -> &[Ruling] {
        &self.rulings
    }

    /// Consume the receiver, returning the collected rulings.
    pub fn into_rulings(self) -> Vec<Ruling> {
        self.rulings
    }

    fn project(&self, x: f64, y: f64) -> Point {
        let device = self.ctm.transform_point(Point::new(x, y));
        let px = device.x - self.origin_x;
        let py = device.y - self.origin_y;
        let page_y = if self.y_inverted {
            py
        } else {
            self.page_height - py
        };
        Point::new(px, page_y)
    }

    fn emit_stroked(&mut self, points: &[Point]) {
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a == b {
                continue;
            }
            let ruling = Ruling::with_tolerance(a.x, a.y, b.x, b.y, self.orientation_tolerance);
            if !ruling.oblique() {
                self.rulings.push(ruling);
            }
        }
    }

    fn emit_filled(&mut self, points: &[Point]) {
        if points.is_empty() {
            return;
        }
        let left = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let right = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let top = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let bottom = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        let width = right - left;
        let height = bottom - top;

        let ruling = if height <= self.thickness_threshold && width > self.thickness_threshold {
            let y = (top + bottom) / 2.0;
            Ruling::with_tolerance(left, y, right, y, self.orientation_tolerance)
        } else if width <= self.thickness_threshold && height > self.thickness_threshold {
            let x = (left + right) / 2.0;
            Ruling::with_tolerance(x, top, x, bottom, self.orientation_tolerance)
        } else {
            // A fill, not a line
            return;
        };
        self.rulings.push(ruling);
    }

    fn clear_paths(&mut self) {
        self.current.clear();
        self.pooled.clear();
    }
}

impl PathPaintDevice for RulingExtractor {
    fn begin_subpath(&mut self, x: f64, y: f64) {
        if !self.current.is_empty() {
            let finished = std::mem::take(&mut self.current);
            self.pooled.push(finished);
        }
        let p = self.project(x, y);
        self.current.push(p);
    }

    fn append_line(&mut self, x: f64, y: f64) {
        if self.current.is_empty() {
            return;
        }
        let p = self.project(x, y);
        self.current.push(p);
    }

    fn append_rectangle(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.begin_subpath(x, y);
        self.append_line(x + width, y);
        self.append_line(x + width, y + height);
        self.append_line(x, y + height);
        self.close_path();
    }

    fn close_path(&mut self) {
        if self.current.len() > 1 {
            let first = self.current[0];
            if *self.current.last().unwrap_or(&first) != first {
                self.current.push(first);
            }
        }
    }

    fn stroke(&mut self) {
        let points = std::mem::take(&mut self.current);
        self.emit_stroked(&points);
        self.pooled.clear();
    }

    fn close_and_stroke(&mut self) {
        self.close_path();
        self.stroke();
    }

    fn fill_nonzero(&mut self) {
        let pooled = std::mem::take(&mut self.pooled);
        let current = std::mem::take(&mut self.current);
        for subpath in pooled.iter().chain(std::iter::once(&current)) {
            self.emit_filled(subpath);
        }
    }

    fn fill_even_odd(&mut self) {
        // The winding rule does not change a bounding box
        self.fill_nonzero();
    }

    fn end_path(&mut self) {
        self.clear_paths();
    }

    fn concat_ctm(&mut self, ctm: Ctm) {
        self.ctm = ctm.concat(&self.ctm);
    }

    fn save_state(&mut self) {
        self.ctm_stack.push(self.ctm);
    }

    fn restore_state(&mut self) {
        if let Some(ctm) = self.ctm_stack.pop() {
            self.ctm = ctm;
        }
    }
}

/// Translate rulings so a crop box's top-left corner becomes the origin.
///
/// `x_shift` is the crop's left offset from the media box; `y_shift` is
/// `media_height - crop_top`.
pub fn translate_rulings(rulings: &mut [Ruling], x_shift: f64, y_shift: f64) {
    for r in rulings.iter_mut() {
        *r = r.translate(-x_shift, -y_shift);
    }
}
