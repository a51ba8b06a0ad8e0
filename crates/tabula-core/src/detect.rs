//! Table-region detectors.
//!
//! The lattice detector finds regions the ruling network supports. The
//! text-edge detector (after Nurminen) finds borderless tables from
//! repeated chunk-edge alignment across consecutive lines, then merges
//! its regions with the lattice detector's, dropping near-duplicates.

use crate::chunks::{Line, group_lines, merge_words};
use crate::config::ExtractionConfig;
use crate::geometry::Rect;
use crate::lattice::{find_cells, group_cells, region_bbox};
use crate::page::Page;
use crate::projection::{cluster_mean, cluster_positions};

/// Distance within which a chunk edge counts as aligned with a relevant
/// edge position.
const EDGE_ALIGNMENT_DISTANCE: f64 = 10.0;

/// Fraction of a line's chunk edges that must align for the line to
/// read as tabular.
const LINE_ALIGNMENT_RATIO: f64 = 0.3;

/// Fraction of all chunk edges a cluster must reach to be relevant.
const RELEVANT_EDGE_RATIO: f64 = 0.1;

/// Regions whose ruling network forms cell grids.
///
/// Rejects regions smaller than the minimum table dimension on either
/// side or with fewer than the minimum cell count.
pub fn detect_lattice_regions(page: &Page, config: &ExtractionConfig) -> Vec<Rect> {
    let horizontal = page.horizontal_rulings();
    let vertical = page.vertical_rulings();
    if horizontal.is_empty() || vertical.is_empty() {
        return Vec::new();
    }

    let cells = find_cells(&horizontal, &vertical, config);
    group_cells(&cells, config)
        .iter()
        .map(|region| region_bbox(region))
        .filter(|bbox| {
            bbox.width >= config.min_table_dimension && bbox.height >= config.min_table_dimension
        })
        .collect()
}

/// Text-edge-driven detection, appended to the lattice regions.
///
/// Chunk edges (left, center, right) are clustered across the page;
/// clusters with enough occurrences become relevant positions. A run of
/// consecutive lines whose edges keep aligning with relevant positions
/// becomes a table region, padded and clipped to the page, unless it
/// nearly coincides with a region already found.
pub fn detect_table_regions(page: &Page, config: &ExtractionConfig) -> Vec<Rect> {
    let mut regions = detect_lattice_regions(page, config);

    let chunks = merge_words(page.glyphs(), &page.vertical_rulings(), config);
    let lines = group_lines(chunks, config);
    if lines.is_empty() {
        return regions;
    }

    let edges: Vec<f64> = lines.iter().flat_map(line_edges).collect();
    let min_occurrences =
        ((RELEVANT_EDGE_RATIO * edges.len() as f64).ceil() as usize).max(2);
    let relevant: Vec<f64> = cluster_positions(&edges, config.edge_clustering_tolerance)
        .iter()
        .filter(|cluster| cluster.len() >= min_occurrences)
        .map(|cluster| cluster_mean(cluster))
        .collect();

    let qualifying: Vec<bool> = lines
        .iter()
        .map(|line| line_is_aligned(line, &relevant))
        .collect();

    for (start, end) in qualifying_runs(&qualifying, config.min_rows) {
        let run = &lines[start..end];
        if !is_tabular(run, config) {
            continue;
        }
        let bbox = run
            .iter()
            .skip(1)
            .fold(run[0].rect, |acc, line| acc.union(&line.rect))
            .expand(config.detection_padding);
        let Some(clipped) = bbox.intersection(&page.bounds()) else {
            continue;
        };
        let duplicate = regions
            .iter()
            .any(|r| r.overlap_ratio(&clipped) >= config.overlap_threshold);
        if !duplicate {
            regions.push(clipped);
        }
    }

    regions.sort_by(|a, b| a.reading_order(b));
    regions
}

/// Left, center, and right x-positions of every chunk on the line.
fn line_edges(line: &Line) -> Vec<f64> {
    line.chunks
        .iter()
        .flat_map(|c| [c.rect.left, c.rect.horizontal_center(), c.rect.right()])
        .collect()
}

fn line_is_aligned(line: &Line, relevant: &[f64]) -> bool {
    let edges = line_edges(line);
    if edges.is_empty() {
        return false;
    }
    let aligned = edges
        .iter()
        .filter(|&&e| {
            relevant
                .iter()
                .any(|&r| (e - r).abs() <= EDGE_ALIGNMENT_DISTANCE)
        })
        .count();
    aligned as f64 / edges.len() as f64 >= LINE_ALIGNMENT_RATIO
}

/// Maximal runs of consecutive `true` entries of at least `min_rows`.
fn qualifying_runs(qualifying: &[bool], min_rows: usize) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start: Option<usize> = None;
    for (i, &q) in qualifying.iter().enumerate() {
        match (q, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                if i - s >= min_rows {
                    runs.push((s, i));
                }
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        if qualifying.len() - s >= min_rows {
            runs.push((s, qualifying.len()));
        }
    }
    runs
}

/// Row/column fill predicate: treating each line's chunks as cells, the
/// filled fraction of the implied grid must reach the tabular ratio.
/// Single-column runs never qualify.
fn is_tabular(lines: &[Line], config: &ExtractionConfig) -> bool {
    let cols = lines.iter().map(|l| l.chunks.len()).max().unwrap_or(0);
    if cols < 2 {
        return false;
    }
    let filled: usize = lines.iter().map(|l| l.chunks.len()).sum();
    filled as f64 / (cols * lines.len()) as f64 >= config.tabular_ratio_threshold
}
