//! Lattice extraction: table reconstruction from the ruling network.
//!
//! Cell discovery runs per row of the ruling grid. For each pair of
//! consecutive horizontal positions, only the vertical rulings spanning
//! that row participate, which decouples column boundaries across rows —
//! header spans and footnote spans extract correctly even though the
//! grid is not globally rectangular.

use crate::chunks::merge_words;
use crate::config::ExtractionConfig;
use crate::geometry::{Point, Rect};
use crate::page::Page;
use crate::ruling::Ruling;
use crate::table::{Cell, ExtractionMethod, Table};

/// Extract one table per connected ruling region on the page.
pub fn extract_tables(page: &Page, config: &ExtractionConfig) -> Vec<Table> {
    let horizontal = page.horizontal_rulings();
    let vertical = page.vertical_rulings();
    if horizontal.is_empty() || vertical.is_empty() {
        return Vec::new();
    }

    let cells = find_cells(&horizontal, &vertical, config);
    let regions = group_cells(&cells, config);

    regions
        .into_iter()
        .map(|region| build_table(page, &region, config))
        .collect()
}

/// Discover cell rectangles from the ruling network, row by row.
pub(crate) fn find_cells(
    horizontal: &[Ruling],
    vertical: &[Ruling],
    config: &ExtractionConfig,
) -> Vec<Rect> {
    let intersections = intersection_points(horizontal, vertical, config.intersection_tolerance);
    let row_lines = unique_positions(horizontal);
    let tolerance = config.cell_tolerance;

    let mut cells = Vec::new();
    for pair in row_lines.windows(2) {
        let (top, bottom) = (pair[0], pair[1]);

        // Only verticals spanning this row participate; partial rulings
        // that create spanning-cell geometry drop out here.
        let spanning: Vec<&Ruling> = vertical
            .iter()
            .filter(|v| v.y1 <= top + tolerance && v.y2 >= bottom - tolerance)
            .collect();
        let columns = unique_positions_of(spanning.iter().map(|v| v.x1));

        for xs in columns.windows(2) {
            let (left, right) = (xs[0], xs[1]);
            let edge_ok = has_edges(horizontal, vertical, top, left, bottom, right, tolerance);
            let corner_ok =
                has_corners(&intersections, top, left, bottom, right, tolerance);
            if edge_ok || corner_ok {
                cells.push(Rect::from_edges(top, left, bottom, right));
            }
        }
    }
    cells
}

/// Crossing points of the ruling network, rounded to 0.1 to fuse
/// duplicates.
fn intersection_points(
    horizontal: &[Ruling],
    vertical: &[Ruling],
    tolerance: f64,
) -> Vec<Point> {
    let mut seen = std::collections::BTreeSet::new();
    for h in horizontal {
        for v in vertical {
            if let Some(p) = h.intersection(v, tolerance) {
                seen.insert(((p.y * 10.0).round() as i64, (p.x * 10.0).round() as i64));
            }
        }
    }
    seen.into_iter()
        .map(|(y, x)| Point::new(x as f64 / 10.0, y as f64 / 10.0))
        .collect()
}

fn unique_positions(rulings: &[Ruling]) -> Vec<f64> {
    unique_positions_of(rulings.iter().map(Ruling::position))
}

fn unique_positions_of(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.collect();
    out.sort_by(f64::total_cmp);
    out.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
    out
}

/// Edge test: all four cell edges are present as rulings within the
/// tolerance.
#[allow(clippy::too_many_arguments)]
fn has_edges(
    horizontal: &[Ruling],
    vertical: &[Ruling],
    top: f64,
    left: f64,
    bottom: f64,
    right: f64,
    tolerance: f64,
) -> bool {
    let h_edge = |y: f64| {
        horizontal.iter().any(|h| {
            (h.y1 - y).abs() <= tolerance
                && h.x1 <= left + tolerance
                && h.x2 >= right - tolerance
        })
    };
    let v_edge = |x: f64| {
        vertical.iter().any(|v| {
            (v.x1 - x).abs() <= tolerance
                && v.y1 <= top + tolerance
                && v.y2 >= bottom - tolerance
        })
    };
    h_edge(top) && h_edge(bottom) && v_edge(left) && v_edge(right)
}

/// Corner test: all four cell corners appear in the intersection map.
fn has_corners(
    intersections: &[Point],
    top: f64,
    left: f64,
    bottom: f64,
    right: f64,
    tolerance: f64,
) -> bool {
    let near = |x: f64, y: f64| {
        intersections
            .iter()
            .any(|p| (p.x - x).abs() <= tolerance && (p.y - y).abs() <= tolerance)
    };
    near(left, top) && near(right, top) && near(left, bottom) && near(right, bottom)
}

/// Merge cells into connected regions by edge adjacency.
///
/// Two cells are adjacent when their facing edges meet within the cell
/// tolerance and their lateral intervals overlap by at least half.
/// Regions with fewer than the minimum cell count, or zero bounding
/// area, are dropped. Regions come back in reading order.
pub(crate) fn group_cells(cells: &[Rect], config: &ExtractionConfig) -> Vec<Vec<Rect>> {
    let tolerance = config.cell_tolerance;
    let mut parent: Vec<usize> = (0..cells.len()).collect();

    fn find(parent: &mut Vec<usize>, i: usize) -> usize {
        if parent[i] != i {
            let root = find(parent, parent[i]);
            parent[i] = root;
        }
        parent[i]
    }

    for i in 0..cells.len() {
        for j in (i + 1)..cells.len() {
            if cells_adjacent(&cells[i], &cells[j], tolerance) {
                let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                if ri != rj {
                    parent[ri] = rj;
                }
            }
        }
    }

    let mut by_root: std::collections::BTreeMap<usize, Vec<Rect>> = Default::default();
    for i in 0..cells.len() {
        let root = find(&mut parent, i);
        by_root.entry(root).or_default().push(cells[i]);
    }

    let mut regions: Vec<Vec<Rect>> = by_root
        .into_values()
        .filter(|region| {
            region.len() >= config.min_cells && region_bbox(region).area() > 0.0
        })
        .collect();
    regions.sort_by(|a, b| region_bbox(a).reading_order(&region_bbox(b)));
    regions
}

fn cells_adjacent(a: &Rect, b: &Rect, tolerance: f64) -> bool {
    let horizontally = ((a.right() - b.left).abs() <= tolerance
        || (b.right() - a.left).abs() <= tolerance)
        && a.vertically_overlaps(b, 0.5);
    let vertically = ((a.bottom() - b.top).abs() <= tolerance
        || (b.bottom() - a.top).abs() <= tolerance)
        && a.horizontally_overlaps(b, 0.5);
    horizontally || vertically
}

pub(crate) fn region_bbox(cells: &[Rect]) -> Rect {
    let mut iter = cells.iter();
    let Some(&first) = iter.next() else {
        return Rect::new(0.0, 0.0, 0.0, 0.0);
    };
    iter.fold(first, |acc, r| acc.union(r))
}

/// Assemble a table from a region's cells: rows from sorted unique top
/// coordinates, columns by sorting same-row cells by left, glyphs
/// assigned by origin containment.
fn build_table(page: &Page, region: &[Rect], config: &ExtractionConfig) -> Table {
    let tops = unique_positions_of(region.iter().map(|c| c.top));

    let mut table = Table::new(ExtractionMethod::Lattice, page.number());
    for (row_index, &top) in tops.iter().enumerate() {
        let mut row: Vec<&Rect> = region
            .iter()
            .filter(|c| (c.top - top).abs() < 1e-9)
            .collect();
        row.sort_by(|a, b| a.left.total_cmp(&b.left));

        for (col_index, &rect) in row.iter().enumerate() {
            let glyphs: Vec<_> = page.glyphs_in(rect).into_iter().cloned().collect();
            let mut cell = Cell::new(*rect);
            cell.chunks = merge_words(&glyphs, &[], config);
            table.insert(row_index, col_index, cell);
        }
    }
    table
}
