//! Table and cell data model.
//!
//! A table is a sparse row-major grid: cells live in a map keyed by
//! `(row, col)`, and coordinates that were never filled read back as
//! empty placeholder cells. The bounding box grows by union as cells are
//! inserted.

use std::collections::BTreeMap;

use crate::chunks::TextChunk;
use crate::geometry::Rect;

/// Which algorithm produced a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExtractionMethod {
    /// Ruling-driven reconstruction.
    Lattice,
    /// Text-gap-driven reconstruction.
    Stream,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::Lattice => "lattice",
            ExtractionMethod::Stream => "stream",
        }
    }
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rectangular cell carrying text chunks.
///
/// The `placeholder` flag distinguishes "no cell here" (a coordinate the
/// extractor never produced) from a genuinely empty cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub rect: Rect,
    pub chunks: Vec<TextChunk>,
    pub placeholder: bool,
}

impl Cell {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            chunks: Vec::new(),
            placeholder: false,
        }
    }

    /// An empty placeholder cell.
    pub fn placeholder() -> Self {
        Self {
            rect: Rect::new(0.0, 0.0, 0.0, 0.0),
            chunks: Vec::new(),
            placeholder: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Cell text: member chunk texts in reading order, joined by single
    /// spaces.
    pub fn text(&self) -> String {
        let mut ordered: Vec<&TextChunk> = self.chunks.iter().collect();
        ordered.sort_by(|a, b| a.rect.reading_order(&b.rect));
        ordered
            .iter()
            .map(|c| c.text())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A sparse row-major grid of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    cells: BTreeMap<(usize, usize), Cell>,
    row_count: usize,
    col_count: usize,
    bbox: Option<Rect>,
    /// Which algorithm produced this table.
    pub method: ExtractionMethod,
    /// 1-based page number the table came from.
    pub page_number: usize,
}

impl Table {
    pub fn new(method: ExtractionMethod, page_number: usize) -> Self {
        Self {
            cells: BTreeMap::new(),
            row_count: 0,
            col_count: 0,
            bbox: None,
            method,
            page_number,
        }
    }

    /// Insert a cell, growing the grid and the bounding box.
    pub fn insert(&mut self, row: usize, col: usize, cell: Cell) {
        self.row_count = self.row_count.max(row + 1);
        self.col_count = self.col_count.max(col + 1);
        self.bbox = Some(match self.bbox {
            Some(b) => b.union(&cell.rect),
            None => cell.rect,
        });
        self.cells.insert((row, col), cell);
    }

    /// Cell at the coordinate; unfilled coordinates yield an empty
    /// placeholder.
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.cells
            .get(&(row, col))
            .cloned()
            .unwrap_or_else(Cell::placeholder)
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn col_count(&self) -> usize {
        self.col_count
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Bounding box over inserted cells.
    pub fn bbox(&self) -> Rect {
        self.bbox.unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0))
    }

    /// Rows of cells, placeholders filling unoccupied coordinates.
    pub fn rows(&self) -> Vec<Vec<Cell>> {
        (0..self.row_count)
            .map(|r| (0..self.col_count).map(|c| self.cell(r, c)).collect())
            .collect()
    }

    /// The 2-D array of cell texts consumed by formatters.
    pub fn text_grid(&self) -> Vec<Vec<String>> {
        (0..self.row_count)
            .map(|r| (0..self.col_count).map(|c| self.cell(r, c).text()).collect())
            .collect()
    }
}
