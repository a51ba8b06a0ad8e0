//! Grid-bucketed spatial lookup over rectangles.
//!
//! An acceleration structure only: every query returns exactly the set a
//! linear scan with the same predicate would, deduplicated across
//! buckets.

use std::collections::{BTreeSet, HashMap};

use crate::geometry::{Point, Rect};

/// Default bucket edge length in points.
pub const DEFAULT_CELL_SIZE: f64 = 50.0;

/// Uniform-grid spatial index. Items are kept by insertion id; an item
/// is listed in every grid bucket its rectangle overlaps.
#[derive(Debug)]
pub struct SpatialIndex {
    cell_size: f64,
    buckets: HashMap<(i64, i64), Vec<usize>>,
    items: Vec<Rect>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::with_cell_size(DEFAULT_CELL_SIZE)
    }

    pub fn with_cell_size(cell_size: f64) -> Self {
        Self {
            cell_size,
            buckets: HashMap::new(),
            items: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Rectangle stored under the given insertion id.
    pub fn get(&self, id: usize) -> &Rect {
        &self.items[id]
    }

    /// Insert a rectangle, returning its id (ids count up from zero).
    pub fn insert(&mut self, rect: Rect) -> usize {
        let id = self.items.len();
        let (c0, c1, r0, r1) = self.bucket_span(&rect);
        for cx in c0..=c1 {
            for cy in r0..=r1 {
                self.buckets.entry((cx, cy)).or_default().push(id);
            }
        }
        self.items.push(rect);
        id
    }

    fn bucket_span(&self, rect: &Rect) -> (i64, i64, i64, i64) {
        (
            (rect.left / self.cell_size).floor() as i64,
            (rect.right() / self.cell_size).floor() as i64,
            (rect.top / self.cell_size).floor() as i64,
            (rect.bottom() / self.cell_size).floor() as i64,
        )
    }

    fn candidates(&self, rect: &Rect) -> BTreeSet<usize> {
        let (c0, c1, r0, r1) = self.bucket_span(rect);
        let mut out = BTreeSet::new();
        for cx in c0..=c1 {
            for cy in r0..=r1 {
                if let Some(ids) = self.buckets.get(&(cx, cy)) {
                    out.extend(ids.iter().copied());
                }
            }
        }
        out
    }

    /// Ids of rectangles with a non-empty intersection with `query`.
    pub fn intersects(&self, query: &Rect) -> Vec<usize> {
        self.candidates(query)
            .into_iter()
            .filter(|&id| self.items[id].intersects(query))
            .collect()
    }

    /// Ids of rectangles fully inside `query`.
    pub fn contains(&self, query: &Rect) -> Vec<usize> {
        self.candidates(query)
            .into_iter()
            .filter(|&id| query.contains_rect(&self.items[id]))
            .collect()
    }

    /// Ids of rectangles containing the point.
    pub fn at_point(&self, p: Point) -> Vec<usize> {
        self.candidates(&Rect::new(p.y, p.x, 0.0, 0.0))
            .into_iter()
            .filter(|&id| self.items[id].contains_point(p))
            .collect()
    }

    /// Ids of rectangles within `distance` of `query`.
    pub fn nearby(&self, query: &Rect, distance: f64) -> Vec<usize> {
        self.intersects(&query.expand(distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(rects: &[Rect]) -> SpatialIndex {
        let mut index = SpatialIndex::new();
        for &r in rects {
            index.insert(r);
        }
        index
    }

    #[test]
    fn empty_index_answers_empty() {
        let index = SpatialIndex::new();
        assert!(index.is_empty());
        assert!(index.intersects(&Rect::new(0.0, 0.0, 100.0, 100.0)).is_empty());
    }

    #[test]
    fn intersects_matches_linear_scan() {
        let rects = vec![
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(5.0, 5.0, 10.0, 10.0),
            Rect::new(200.0, 200.0, 10.0, 10.0),
            Rect::new(45.0, 45.0, 10.0, 10.0), // straddles bucket boundaries
        ];
        let index = index_of(&rects);
        let query = Rect::new(0.0, 0.0, 60.0, 60.0);

        let expected: Vec<usize> = rects
            .iter()
            .enumerate()
            .filter(|(_, r)| r.intersects(&query))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(index.intersects(&query), expected);
    }

    #[test]
    fn straddling_item_reported_once() {
        // Spans four buckets at the default cell size
        let index = index_of(&[Rect::new(40.0, 40.0, 20.0, 20.0)]);
        let hits = index.intersects(&Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(hits, vec![0]);
    }

    #[test]
    fn contains_requires_full_containment() {
        let rects = vec![
            Rect::new(10.0, 10.0, 5.0, 5.0),
            Rect::new(10.0, 10.0, 200.0, 5.0),
        ];
        let index = index_of(&rects);
        let query = Rect::new(0.0, 0.0, 50.0, 50.0);
        assert_eq!(index.contains(&query), vec![0]);
    }

    #[test]
    fn at_point_finds_covering_rects() {
        let rects = vec![
            Rect::new(0.0, 0.0, 20.0, 20.0),
            Rect::new(10.0, 10.0, 20.0, 20.0),
            Rect::new(100.0, 100.0, 20.0, 20.0),
        ];
        let index = index_of(&rects);
        assert_eq!(index.at_point(Point::new(15.0, 15.0)), vec![0, 1]);
        assert_eq!(index.at_point(Point::new(500.0, 500.0)), Vec::<usize>::new());
    }

    #[test]
    fn nearby_expands_the_query() {
        let index = index_of(&[Rect::new(0.0, 0.0, 10.0, 10.0)]);
        let query = Rect::new(0.0, 15.0, 10.0, 10.0);
        assert!(index.intersects(&query).is_empty());
        assert_eq!(index.nearby(&query, 5.0), vec![0]);
    }

    #[test]
    fn negative_coordinates_are_bucketed() {
        let index = index_of(&[Rect::new(-30.0, -30.0, 10.0, 10.0)]);
        assert_eq!(
            index.intersects(&Rect::new(-100.0, -100.0, 200.0, 200.0)),
            vec![0]
        );
    }
}
