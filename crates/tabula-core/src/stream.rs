//! Stream extraction: table reconstruction for pages without rulings.
//!
//! Column positions come from the first satisfied source: explicit
//! caller-provided x-positions, vertical rulings on the page, or
//! clustering of the wide inter-chunk gaps repeated across lines. With
//! no source at all, the page is a single column.

use crate::chunks::{Line, TextChunk, group_lines, merge_words};
use crate::config::ExtractionConfig;
use crate::page::Page;
use crate::projection::{cluster_mean, cluster_positions};
use crate::table::{Cell, ExtractionMethod, Table};

/// Proximity, in points, at which gap midpoints from different lines
/// fuse into one column candidate.
const COLUMN_CLUSTER_TOLERANCE: f64 = 5.0;

/// Fraction of lines that must contribute to a cluster for it to become
/// a column separator.
const COLUMN_SUPPORT_RATIO: f64 = 0.3;

/// Extract a single table from the page's text layout.
///
/// Returns `None` when the page has no lines or produces no cells.
pub fn extract_table(
    page: &Page,
    columns: Option<&[f64]>,
    config: &ExtractionConfig,
) -> Option<Table> {
    let vertical_rulings = page.vertical_rulings();
    let chunks = merge_words(page.glyphs(), &vertical_rulings, config);
    let lines = group_lines(chunks, config);
    if lines.is_empty() {
        return None;
    }

    let separators: Vec<f64> = if let Some(explicit) = columns {
        let mut sorted = explicit.to_vec();
        sorted.sort_by(f64::total_cmp);
        sorted
    } else if !vertical_rulings.is_empty() {
        let mut xs: Vec<f64> = vertical_rulings.iter().map(|r| r.x1).collect();
        xs.sort_by(f64::total_cmp);
        xs.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
        xs
    } else {
        guess_columns(&lines, config)
    };

    let mut table = Table::new(ExtractionMethod::Stream, page.number());
    for (row_index, line) in lines.iter().enumerate() {
        for (col_index, cell) in line_to_cells(line, &separators).into_iter().enumerate() {
            if let Some(cell) = cell {
                table.insert(row_index, col_index, cell);
            }
        }
    }

    if table.is_empty() { None } else { Some(table) }
}

/// Pool every line's gap midpoints, cluster them, and keep the cluster
/// means backed by enough lines.
fn guess_columns(lines: &[Line], config: &ExtractionConfig) -> Vec<f64> {
    let positions: Vec<f64> = lines
        .iter()
        .flat_map(|line| line.gap_positions(config))
        .collect();
    let min_support = ((COLUMN_SUPPORT_RATIO * lines.len() as f64).ceil() as usize).max(1);

    cluster_positions(&positions, COLUMN_CLUSTER_TOLERANCE)
        .iter()
        .filter(|cluster| cluster.len() >= min_support)
        .map(|cluster| cluster_mean(cluster))
        .collect()
}

/// Route each chunk by its horizontal center into the first interval of
/// `[line.left, s₁, s₂, …, +∞)` that contains it; each non-empty column
/// becomes a cell whose box is the union of its chunks'.
fn line_to_cells(line: &Line, separators: &[f64]) -> Vec<Option<Cell>> {
    let mut buckets: Vec<Vec<&TextChunk>> = vec![Vec::new(); separators.len() + 1];
    for chunk in &line.chunks {
        let center = chunk.rect.horizontal_center();
        let index = separators
            .iter()
            .position(|&s| center < s)
            .unwrap_or(separators.len());
        buckets[index].push(chunk);
    }

    buckets
        .into_iter()
        .map(|bucket| {
            if bucket.is_empty() {
                return None;
            }
            let rect = bucket
                .iter()
                .skip(1)
                .fold(bucket[0].rect, |acc, c| acc.union(&c.rect));
            let mut cell = Cell::new(rect);
            cell.chunks = bucket.into_iter().cloned().collect();
            Some(cell)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::ruling::Ruling;
    use crate::text::TextElement;

    fn glyph(text: &str, top: f64, left: f64, width: f64) -> TextElement {
        TextElement::new(
            Rect::new(top, left, width, 10.0),
            text,
            "Helvetica",
            10.0,
            5.0,
        )
    }

    /// Three lines with chunks at left 10/80/150, width 20.
    fn three_column_glyphs() -> Vec<TextElement> {
        let mut glyphs = Vec::new();
        for (row, top) in [0.0, 20.0, 40.0].iter().enumerate() {
            for (col, left) in [10.0, 80.0, 150.0].iter().enumerate() {
                glyphs.push(glyph(&format!("r{row}c{col}"), *top, *left, 20.0));
            }
        }
        glyphs
    }

    fn page_of(glyphs: Vec<TextElement>, rulings: Vec<Ruling>) -> Page {
        Page::new(Rect::new(0.0, 0.0, 300.0, 300.0), 1, 0, rulings, glyphs)
    }

    #[test]
    fn empty_page_yields_no_table() {
        let page = page_of(vec![], vec![]);
        assert!(extract_table(&page, None, &ExtractionConfig::default()).is_none());
    }

    #[test]
    fn guessed_columns_build_a_three_by_three_table() {
        let page = page_of(three_column_glyphs(), vec![]);
        let table = extract_table(&page, None, &ExtractionConfig::default()).unwrap();
        assert_eq!(table.method, ExtractionMethod::Stream);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.col_count(), 3);
        assert_eq!(table.cell(1, 1).text(), "r1c1");
        assert_eq!(table.cell(2, 0).text(), "r2c0");
    }

    #[test]
    fn explicit_columns_take_precedence() {
        // One separator → two columns, the last two chunks merge right
        let page = page_of(three_column_glyphs(), vec![]);
        let table =
            extract_table(&page, Some(&[50.0]), &ExtractionConfig::default()).unwrap();
        assert_eq!(table.col_count(), 2);
        assert_eq!(table.cell(0, 1).text(), "r0c1 r0c2");
    }

    #[test]
    fn vertical_rulings_supply_columns() {
        // Rulings at x 60/130 split the three chunk groups
        let rulings = vec![
            Ruling::new(60.0, 0.0, 60.0, 60.0),
            Ruling::new(130.0, 0.0, 130.0, 60.0),
        ];
        let page = page_of(three_column_glyphs(), rulings);
        let table = extract_table(&page, None, &ExtractionConfig::default()).unwrap();
        assert_eq!(table.col_count(), 3);
        assert_eq!(table.cell(0, 2).text(), "r0c2");
    }

    #[test]
    fn no_separators_make_one_column() {
        // A single narrow line: no qualifying gaps anywhere
        let glyphs = vec![glyph("only", 0.0, 10.0, 20.0)];
        let page = page_of(glyphs, vec![]);
        let table = extract_table(&page, None, &ExtractionConfig::default()).unwrap();
        assert_eq!(table.col_count(), 1);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn rare_gaps_do_not_become_columns() {
        // Ten lines, only one of which has a wide gap: 1/10 < 30%
        let mut glyphs = Vec::new();
        for i in 0..9 {
            glyphs.push(glyph("a", i as f64 * 20.0, 10.0, 20.0));
        }
        glyphs.push(glyph("b", 180.0, 10.0, 20.0));
        glyphs.push(glyph("c", 180.0, 150.0, 20.0));
        let page = page_of(glyphs, vec![]);
        let table = extract_table(&page, None, &ExtractionConfig::default()).unwrap();
        assert_eq!(table.col_count(), 1);
    }

    #[test]
    fn sparse_rows_leave_placeholders() {
        // Five rows; the second is missing its middle cell. The stray
        // gap midpoint of that row lacks cluster support, so the column
        // set stays at three and the hole reads back as a placeholder.
        let mut glyphs = Vec::new();
        for (row, top) in [0.0, 20.0, 40.0, 60.0, 80.0].iter().enumerate() {
            for (col, left) in [10.0, 80.0, 150.0].iter().enumerate() {
                if row == 1 && col == 1 {
                    continue;
                }
                glyphs.push(glyph(&format!("r{row}c{col}"), *top, *left, 20.0));
            }
        }
        let page = page_of(glyphs, vec![]);
        let table = extract_table(&page, None, &ExtractionConfig::default()).unwrap();
        assert_eq!(table.col_count(), 3);
        assert!(table.cell(1, 1).placeholder);
        assert_eq!(table.cell(1, 2).text(), "r1c2");
    }
}
