//! Tuning thresholds for extraction and detection.

/// Configuration record carrying every tuning threshold.
///
/// Callers clone-and-override individual fields; the record is read,
/// never mutated, during extraction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtractionConfig {
    /// Max slope, in points, for a ruling to be axis-aligned.
    pub orientation_tolerance: f64,
    /// Point-in-segment tolerance for intersection tests.
    pub intersection_tolerance: f64,
    /// Max thin-dimension of a filled rectangle to be treated as a ruling.
    pub ruling_thickness_threshold: f64,
    /// Fraction of space-width permitted as inter-glyph gap when merging words.
    pub word_gap_multiplier: f64,
    /// Fraction of average char width permitted as an in-line gap.
    pub line_gap_multiplier: f64,
    /// Minimum cells in a lattice table.
    pub min_cells: usize,
    /// Minimum width and height of a detected region.
    pub min_table_dimension: f64,
    /// Corner/edge match tolerance in lattice cell discovery.
    pub cell_tolerance: f64,
    /// Minimum rows for a text-edge-detected table.
    pub min_rows: usize,
    /// Dedup threshold when merging detectors' regions.
    pub overlap_threshold: f64,
    /// Minimum cell fill ratio for a candidate text run to count as tabular.
    pub tabular_ratio_threshold: f64,
    /// Edge cluster radius in text-edge detection.
    pub edge_clustering_tolerance: f64,
    /// Padding around detected regions.
    pub detection_padding: f64,
    /// Minimum fractional overlap for vertical grouping.
    pub vertical_comparison_threshold: f64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            orientation_tolerance: 1.0,
            intersection_tolerance: 1.0,
            ruling_thickness_threshold: 8.0,
            word_gap_multiplier: 0.5,
            line_gap_multiplier: 0.5,
            min_cells: 4,
            min_table_dimension: 10.0,
            cell_tolerance: 2.0,
            min_rows: 2,
            overlap_threshold: 0.9,
            tabular_ratio_threshold: 0.65,
            edge_clustering_tolerance: 8.0,
            detection_padding: 2.0,
            vertical_comparison_threshold: 0.4,
        }
    }
}
