//! Page model: glyphs, rulings, and derived lookup structures.

use std::cell::OnceCell;

use crate::clip::clip_ruling;
use crate::geometry::Rect;
use crate::index::SpatialIndex;
use crate::ruling::{Ruling, collapse_oriented_rulings};
use crate::text::TextElement;

/// A rendered page: glyphs plus raw rulings, with cached processed
/// rulings and a glyph spatial index.
///
/// Logically immutable after construction except for
/// [`add_ruling`](Page::add_ruling), which appends and invalidates the
/// processed-ruling cache.
#[derive(Debug)]
pub struct Page {
    bounds: Rect,
    number: usize,
    rotation: i32,
    rulings: Vec<Ruling>,
    glyphs: Vec<TextElement>,
    min_char_width: f64,
    min_char_height: f64,
    index: SpatialIndex,
    processed: OnceCell<Vec<Ruling>>,
}

/// Configuration record consumed by [`build`](PageBuilder::build).
#[derive(Debug, Default)]
pub struct PageBuilder {
    pub bounds: Rect,
    pub number: usize,
    pub rotation: i32,
    pub rulings: Vec<Ruling>,
    pub glyphs: Vec<TextElement>,
}

impl PageBuilder {
    pub fn build(self) -> Page {
        Page::new(
            self.bounds,
            self.number,
            self.rotation,
            self.rulings,
            self.glyphs,
        )
    }
}

impl Page {
    pub fn new(
        bounds: Rect,
        number: usize,
        rotation: i32,
        rulings: Vec<Ruling>,
        glyphs: Vec<TextElement>,
    ) -> Self {
        let mut index = SpatialIndex::new();
        let mut min_char_width = f64::INFINITY;
        let mut min_char_height = f64::INFINITY;
        for glyph in &glyphs {
            index.insert(glyph.rect);
            min_char_width = min_char_width.min(glyph.rect.width);
            min_char_height = min_char_height.min(glyph.rect.height);
        }
        if glyphs.is_empty() {
            min_char_width = 0.0;
            min_char_height = 0.0;
        }
        Self {
            bounds,
            number,
            rotation,
            rulings,
            glyphs,
            min_char_width,
            min_char_height,
            index,
            processed: OnceCell::new(),
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// 1-based page number.
    pub fn number(&self) -> usize {
        self.number
    }

    /// Page rotation in degrees (0, 90, 180, or 270).
    pub fn rotation(&self) -> i32 {
        self.rotation
    }

    pub fn glyphs(&self) -> &[TextElement] {
        &self.glyphs
    }

    /// Raw rulings as received from the graphics stream.
    pub fn rulings(&self) -> &[Ruling] {
        &self.rulings
    }

    pub fn min_char_width(&self) -> f64 {
        self.min_char_width
    }

    pub fn min_char_height(&self) -> f64 {
        self.min_char_height
    }

    /// Append a ruling, invalidating the processed-ruling cache.
    pub fn add_ruling(&mut self, ruling: Ruling) {
        self.rulings.push(ruling);
        self.processed.take();
    }

    /// Memoized processed rulings: oblique removed, colinear collapsed.
    pub fn processed_rulings(&self) -> &[Ruling] {
        self.processed
            .get_or_init(|| collapse_oriented_rulings(&self.rulings))
    }

    /// Processed horizontal rulings.
    pub fn horizontal_rulings(&self) -> Vec<Ruling> {
        self.processed_rulings()
            .iter()
            .copied()
            .filter(Ruling::horizontal)
            .collect()
    }

    /// Processed vertical rulings.
    pub fn vertical_rulings(&self) -> Vec<Ruling> {
        self.processed_rulings()
            .iter()
            .copied()
            .filter(Ruling::vertical)
            .collect()
    }

    /// A new page restricted to `area`: glyphs with origin inside the
    /// area, rulings clipped against it. The source page is unaffected.
    pub fn get_area(&self, area: Rect) -> Page {
        let glyphs: Vec<TextElement> = self
            .glyphs
            .iter()
            .filter(|g| {
                let (top, left) = g.origin();
                top >= area.top && top < area.bottom() && left >= area.left && left < area.right()
            })
            .cloned()
            .collect();
        let rulings: Vec<Ruling> = self
            .rulings
            .iter()
            .filter(|r| !r.oblique())
            .filter_map(|r| clip_ruling(r, &area))
            .collect();
        Page::new(area, self.number, self.rotation, rulings, glyphs)
    }

    /// Glyphs whose origin lies in `[top, bottom) × [left, right)` of
    /// the rectangle, found through the spatial index.
    pub fn glyphs_in(&self, rect: &Rect) -> Vec<&TextElement> {
        let mut ids = self.index.intersects(rect);
        ids.sort_unstable();
        ids.into_iter()
            .map(|id| &self.glyphs[id])
            .filter(|g| {
                let (top, left) = g.origin();
                top >= rect.top && top < rect.bottom() && left >= rect.left && left < rect.right()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(text: &str, top: f64, left: f64) -> TextElement {
        TextElement::new(Rect::new(top, left, 5.0, 10.0), text, "Helvetica", 10.0, 2.5)
    }

    fn page() -> Page {
        Page::new(
            Rect::new(0.0, 0.0, 200.0, 200.0),
            1,
            0,
            vec![
                Ruling::new(0.0, 10.0, 100.0, 10.0),
                Ruling::new(0.0, 10.5, 100.0, 10.5),
                Ruling::new(0.0, 0.0, 90.0, 90.0), // oblique
            ],
            vec![glyph("a", 20.0, 20.0), glyph("b", 20.0, 120.0)],
        )
    }

    #[test]
    fn processed_rulings_drop_oblique_and_collapse() {
        let page = page();
        let processed = page.processed_rulings();
        assert_eq!(processed.len(), 1);
        assert_eq!(processed[0], Ruling::new(0.0, 10.25, 100.0, 10.25));
    }

    #[test]
    fn add_ruling_invalidates_the_cache() {
        let mut page = page();
        assert_eq!(page.processed_rulings().len(), 1);
        page.add_ruling(Ruling::new(50.0, 0.0, 50.0, 100.0));
        assert_eq!(page.processed_rulings().len(), 2);
        assert_eq!(page.vertical_rulings().len(), 1);
    }

    #[test]
    fn min_char_dimensions() {
        let page = page();
        assert_eq!(page.min_char_width(), 5.0);
        assert_eq!(page.min_char_height(), 10.0);

        let empty = Page::new(Rect::new(0.0, 0.0, 10.0, 10.0), 1, 0, vec![], vec![]);
        assert_eq!(empty.min_char_width(), 0.0);
    }

    #[test]
    fn get_area_filters_glyphs_by_origin() {
        let page = page();
        let sub = page.get_area(Rect::from_edges(0.0, 0.0, 100.0, 100.0));
        assert_eq!(sub.glyphs().len(), 1);
        assert_eq!(sub.glyphs()[0].text, "a");
        // Source page untouched
        assert_eq!(page.glyphs().len(), 2);
    }

    #[test]
    fn get_area_clips_rulings() {
        let page = Page::new(
            Rect::new(0.0, 0.0, 200.0, 200.0),
            1,
            0,
            vec![Ruling::new(-10.0, 5.0, 50.0, 5.0)],
            vec![],
        );
        let sub = page.get_area(Rect::from_edges(0.0, 0.0, 20.0, 40.0));
        assert_eq!(sub.rulings(), &[Ruling::new(0.0, 5.0, 40.0, 5.0)]);
    }

    #[test]
    fn get_area_drops_outside_rulings() {
        let page = Page::new(
            Rect::new(0.0, 0.0, 200.0, 200.0),
            1,
            0,
            vec![Ruling::new(150.0, 150.0, 180.0, 150.0)],
            vec![],
        );
        let sub = page.get_area(Rect::from_edges(0.0, 0.0, 20.0, 40.0));
        assert!(sub.rulings().is_empty());
    }

    #[test]
    fn glyphs_in_uses_half_open_bounds() {
        let page = page();
        // Glyph "a" has origin (20, 20)
        let hits = page.glyphs_in(&Rect::from_edges(20.0, 20.0, 30.0, 30.0));
        assert_eq!(hits.len(), 1);
        // Origin on the bottom/right boundary is excluded
        let misses = page.glyphs_in(&Rect::from_edges(10.0, 10.0, 20.0, 20.0));
        assert!(misses.is_empty());
    }

    #[test]
    fn builder_produces_an_identical_page() {
        let built = PageBuilder {
            bounds: Rect::new(0.0, 0.0, 100.0, 100.0),
            number: 3,
            rotation: 90,
            rulings: vec![Ruling::new(0.0, 10.0, 50.0, 10.0)],
            glyphs: vec![glyph("x", 5.0, 5.0)],
        }
        .build();
        assert_eq!(built.number(), 3);
        assert_eq!(built.rotation(), 90);
        assert_eq!(built.rulings().len(), 1);
        assert_eq!(built.glyphs().len(), 1);
    }
}
