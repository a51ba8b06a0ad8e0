//! Cohen-Sutherland clipping of rulings against a rectangle.

use crate::geometry::Rect;
use crate::ruling::Ruling;

const INSIDE: u8 = 0;
const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const BOTTOM: u8 = 4;
const TOP: u8 = 8;

fn region_code(x: f64, y: f64, area: &Rect) -> u8 {
    let mut code = INSIDE;
    if x < area.left {
        code |= LEFT;
    } else if x > area.right() {
        code |= RIGHT;
    }
    if y < area.top {
        code |= TOP;
    } else if y > area.bottom() {
        code |= BOTTOM;
    }
    code
}

/// Clip a ruling to `area`, returning the surviving segment if any.
///
/// Endpoints are iteratively replaced with intersections against the
/// violated edges (bottom, top, right, left in that order) until both
/// lie inside (accept) or share an outside region (reject). Only
/// axis-aligned rulings are expected here; oblique segments are filtered
/// before clipping.
pub fn clip_ruling(ruling: &Ruling, area: &Rect) -> Option<Ruling> {
    let (mut x1, mut y1, mut x2, mut y2) = (ruling.x1, ruling.y1, ruling.x2, ruling.y2);
    let mut code1 = region_code(x1, y1, area);
    let mut code2 = region_code(x2, y2, area);

    loop {
        if code1 == INSIDE && code2 == INSIDE {
            return Some(Ruling::new(x1, y1, x2, y2));
        }
        if code1 & code2 != 0 {
            return None;
        }

        let outside = if code1 != INSIDE { code1 } else { code2 };
        let (x, y) = if outside & BOTTOM != 0 {
            (
                x1 + (x2 - x1) * (area.bottom() - y1) / (y2 - y1),
                area.bottom(),
            )
        } else if outside & TOP != 0 {
            (x1 + (x2 - x1) * (area.top - y1) / (y2 - y1), area.top)
        } else if outside & RIGHT != 0 {
            (
                area.right(),
                y1 + (y2 - y1) * (area.right() - x1) / (x2 - x1),
            )
        } else {
            (area.left, y1 + (y2 - y1) * (area.left - x1) / (x2 - x1))
        };

        if outside == code1 {
            x1 = x;
            y1 = y;
            code1 = region_code(x1, y1, area);
        } else {
            x2 = x;
            y2 = y;
            code2 = region_code(x2, y2, area);
        }
    }
}
